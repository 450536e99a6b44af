mod bnb;
mod dp;
mod error;
mod problem;
mod solution;
mod solver;

pub use error::KnapsackError;
pub use problem::{Item, ItemId, KnapsackProblem, ProblemData};
pub use solution::{Analysis, Method, Selection, Solution, SolutionStatus};
pub use solver::{Solver, Strategy};
