use knapsack_solver::KnapsackError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {name} range {start}..{end}: must be non-empty and start at 1 or more")]
    InvalidRange {
        name: &'static str,
        start: u32,
        end: u32,
    },
    #[error(transparent)]
    Problem(#[from] KnapsackError),
}
