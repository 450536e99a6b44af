use std::time::Duration;

use tracing::{debug, warn};

use crate::bnb::{self, Limits};
use crate::dp;
use crate::problem::KnapsackProblem;
use crate::solution::{Method, Solution, SolutionStatus};

/// Which algorithm the solver runs
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Dynamic programming when the table fits `max_table_cells`, branch and bound otherwise
    #[default]
    Auto,
    /// Build the full table regardless of `max_table_cells`. Falls back to
    /// branch and bound only when the table cannot be allocated at all.
    DynamicProgramming,
    /// Always search
    BranchAndBound,
}

/// Exact solver for 0/1 knapsack problems
#[derive(Debug, Clone)]
pub struct Solver {
    strategy: Strategy,
    /// Largest DP table (in cells) `Strategy::Auto` is willing to allocate
    max_table_cells: usize,
    /// Node and time limits for branch and bound
    limits: Limits,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            max_table_cells: 4_000_000,
            limits: Limits::default(),
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_table_cells(mut self, cells: usize) -> Self {
        self.max_table_cells = cells;
        self
    }

    /// Stop branch and bound after `nodes` nodes, reporting the best selection found.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.limits.node_limit = Some(nodes);
        self
    }

    /// Stop branch and bound once `limit` has elapsed, reporting the best selection found.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.limits.time_limit = Some(limit);
        self
    }

    /// The algorithm [`Solver::solve`] will run on `problem`
    pub fn method_for(&self, problem: &KnapsackProblem) -> Method {
        match self.strategy {
            Strategy::DynamicProgramming => Method::DynamicProgramming,
            Strategy::BranchAndBound => Method::BranchAndBound,
            Strategy::Auto => match dp::table_cells(problem) {
                Some(cells) if cells <= self.max_table_cells => Method::DynamicProgramming,
                _ => Method::BranchAndBound,
            },
        }
    }

    /// Solve `problem` to optimality.
    ///
    /// The dynamic program always proves optimality. Branch and bound reports
    /// [`SolutionStatus::Aborted`] when a node or time limit stops it; the
    /// selection is then the best feasible one found.
    pub fn solve(&self, problem: &KnapsackProblem) -> Solution {
        let method = self.method_for(problem);
        debug!(
            items = problem.num_items(),
            capacity = problem.capacity(),
            ?method,
            "solving knapsack"
        );

        let solution = match method {
            Method::DynamicProgramming => match dp::solve(problem) {
                Some(solution) => solution,
                None => {
                    warn!(
                        capacity = problem.capacity(),
                        total_weight = problem.total_weight(),
                        "dynamic programming table cannot be allocated, searching instead"
                    );
                    bnb::solve(problem, self.limits)
                }
            },
            Method::BranchAndBound => bnb::solve(problem, self.limits),
        };

        if solution.status == SolutionStatus::Aborted {
            warn!(
                objective = solution.objective_value,
                nodes = solution.analysis.work,
                "branch and bound stopped by limit"
            );
        } else {
            debug!(
                objective = solution.objective_value,
                weight = solution.total_weight,
                work = solution.analysis.work,
                "solved knapsack"
            );
        }

        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KnapsackError;
    use crate::problem::Item;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_problem(rng: &mut StdRng, max_items: u32) -> KnapsackProblem {
        let n = rng.gen_range(0..=max_items);
        let items: Vec<Item> = (1..=n)
            .map(|id| Item::new(id, rng.gen_range(1..20), rng.gen_range(1..60)))
            .collect();
        let capacity = rng.gen_range(0..80);
        KnapsackProblem::new(items, capacity).unwrap()
    }

    fn brute_force(problem: &KnapsackProblem) -> u64 {
        let items = problem.items();
        let mut best = 0;
        for mask in 0u32..(1 << items.len()) {
            let (weight, profit) = items
                .iter()
                .enumerate()
                .filter(|(i, _)| mask >> i & 1 == 1)
                .fold((0u64, 0u64), |(w, p), (_, item)| {
                    (w + u64::from(item.weight), p + u64::from(item.profit))
                });
            if weight <= problem.capacity() {
                best = best.max(profit);
            }
        }
        best
    }

    #[test]
    fn test_optimal_against_brute_force() {
        let mut rng = StdRng::seed_from_u64(17);
        let dp = Solver::new().with_strategy(Strategy::DynamicProgramming);
        let bnb = Solver::new().with_strategy(Strategy::BranchAndBound);

        for _ in 0..200 {
            let problem = random_problem(&mut rng, 12);
            let expected = brute_force(&problem);

            for solver in [&dp, &bnb] {
                let solution = solver.solve(&problem);
                assert_eq!(solution.status, SolutionStatus::Optimal);
                assert!(solution.verify(&problem), "infeasible: {:?}", problem);
                assert_eq!(solution.objective_value, expected, "problem: {:?}", problem);
            }
        }
    }

    #[test]
    fn test_monotone_in_capacity() {
        let mut rng = StdRng::seed_from_u64(3);
        let solver = Solver::new();

        for _ in 0..20 {
            let base = random_problem(&mut rng, 25);
            let mut last = 0;
            for capacity in 0..=120 {
                let problem = base.with_capacity(capacity).unwrap();
                let objective = solver.solve(&problem).objective_value;
                assert!(objective >= last, "capacity {} dropped to {}", capacity, objective);
                last = objective;
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let mut rng = StdRng::seed_from_u64(99);
        for strategy in [Strategy::DynamicProgramming, Strategy::BranchAndBound] {
            let solver = Solver::new().with_strategy(strategy);
            for _ in 0..20 {
                let problem = random_problem(&mut rng, 20);
                assert_eq!(solver.solve(&problem), solver.solve(&problem));
            }
        }
    }

    #[test]
    fn test_capacity_zero_selects_nothing() {
        let problem =
            KnapsackProblem::new(vec![Item::new(1, 1, 5), Item::new(2, 3, 8)], 0).unwrap();
        for strategy in [Strategy::DynamicProgramming, Strategy::BranchAndBound] {
            let solution = Solver::new().with_strategy(strategy).solve(&problem);
            assert_eq!(solution.objective_value, 0);
            assert_eq!(solution.selection.num_selected(), 0);
            assert!(solution.is_optimal());
        }
    }

    #[test]
    fn test_auto_falls_back_to_search() {
        let problem = KnapsackProblem::new(
            vec![Item::new(1, 400, 10), Item::new(2, 600, 30), Item::new(3, 500, 20)],
            1000,
        )
        .unwrap();

        let roomy = Solver::new();
        assert_eq!(roomy.method_for(&problem), Method::DynamicProgramming);

        let tight = Solver::new().with_max_table_cells(100);
        assert_eq!(tight.method_for(&problem), Method::BranchAndBound);

        let a = roomy.solve(&problem);
        let b = tight.solve(&problem);
        assert_eq!(a.objective_value, 40);
        assert_eq!(b.objective_value, 40);
        assert_eq!(b.analysis.method, Method::BranchAndBound);
    }

    #[test]
    fn test_node_limit_reports_aborted() {
        let items = (1..=40)
            .map(|id| Item::new(id, 10 + id % 9, 15 + (id * 7) % 23))
            .collect();
        let problem = KnapsackProblem::new(items, 150).unwrap();

        let solution = Solver::new()
            .with_strategy(Strategy::BranchAndBound)
            .with_node_limit(1)
            .solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Aborted);
        assert!(solution.verify(&problem));
        assert!(solution.clone().into_optimal().is_err());

        // Limits only bind the search
        let solution = Solver::new()
            .with_strategy(Strategy::DynamicProgramming)
            .with_node_limit(1)
            .solve(&problem);
        assert!(solution.is_optimal());
    }

    #[test]
    fn test_time_limit_reports_aborted() {
        let items = (1..=40)
            .map(|id| Item::new(id, 10 + id % 9, 15 + (id * 7) % 23))
            .collect();
        let problem = KnapsackProblem::new(items, 150).unwrap();

        let solution = Solver::new()
            .with_strategy(Strategy::BranchAndBound)
            .with_time_limit(Duration::ZERO)
            .solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Aborted);
        assert!(solution.verify(&problem));
        assert!(matches!(
            solution.into_optimal(),
            Err(KnapsackError::Aborted { nodes: 0, .. })
        ));
    }

    #[test]
    fn test_forced_dp_too_large_falls_back_to_search() {
        let problem = KnapsackProblem::new(
            vec![
                Item::new(1, u32::MAX, 3),
                Item::new(2, u32::MAX, 5),
                Item::new(3, u32::MAX, 7),
            ],
            i64::MAX,
        )
        .unwrap();

        let solution = Solver::new()
            .with_strategy(Strategy::DynamicProgramming)
            .solve(&problem);
        assert!(solution.is_optimal());
        assert_eq!(solution.analysis.method, Method::BranchAndBound);
        assert_eq!(solution.objective_value, 15);
        assert_eq!(solution.selection.num_selected(), 3);
        assert!(solution.verify(&problem));
    }
}
