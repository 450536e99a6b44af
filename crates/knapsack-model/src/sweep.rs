//! Parametric capacity sweeps.
//!
//! A sweep re-solves one item set under a list of capacities. Each point builds
//! its own instance through [`KnapsackProblem::with_capacity`] and is solved in
//! isolation; a point that fails (negative capacity, search stopped by a limit)
//! is recorded as an error and the remaining points still run.

use knapsack_solver::{ItemId, KnapsackError, KnapsackProblem, Solver};
use tracing::{debug, warn};

/// Optimal result at one capacity
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepValue {
    /// Optimal objective value
    pub objective: u64,
    /// Weight of the optimal selection
    pub total_weight: u64,
    /// Ids of the packed items, ascending
    pub selected: Vec<ItemId>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPoint {
    pub capacity: i64,
    pub outcome: Result<SweepValue, KnapsackError>,
}

/// Points of a sweep, in the order the capacities were given
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    pub points: Vec<SweepPoint>,
}

impl Sweep {
    /// `(capacity, objective)` for every point that solved
    pub fn objectives(&self) -> Vec<(i64, u64)> {
        self.points
            .iter()
            .filter_map(|p| p.outcome.as_ref().ok().map(|v| (p.capacity, v.objective)))
            .collect()
    }

    /// Points that failed, with their error
    pub fn failures(&self) -> impl Iterator<Item = (i64, &KnapsackError)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.outcome.as_ref().err().map(|e| (p.capacity, e)))
    }

    /// Whether the objective never decreases as capacity grows among solved points.
    pub fn is_monotone(&self) -> bool {
        let mut solved = self.objectives();
        solved.sort_by_key(|(capacity, _)| *capacity);
        solved.windows(2).all(|pair| pair[0].1 <= pair[1].1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn solve_point(solver: &Solver, base: &KnapsackProblem, capacity: i64) -> SweepPoint {
    let outcome = base
        .with_capacity(capacity)
        .and_then(|problem| solver.solve(&problem).into_optimal())
        .map(|solution| SweepValue {
            objective: solution.objective_value,
            total_weight: solution.total_weight,
            selected: solution.selection.selected_ids().collect(),
        });

    match &outcome {
        Ok(value) => debug!(capacity, objective = value.objective, "sweep point solved"),
        Err(e) => warn!(capacity, error = %e, "sweep point failed"),
    }

    SweepPoint { capacity, outcome }
}

/// Solve `base` once per entry of `capacities`, in order.
pub fn sweep(solver: &Solver, base: &KnapsackProblem, capacities: &[i64]) -> Sweep {
    debug!(points = capacities.len(), items = base.num_items(), "starting capacity sweep");
    let points = capacities
        .iter()
        .map(|&capacity| solve_point(solver, base, capacity))
        .collect();
    Sweep { points }
}

/// Same as [`sweep`], with points solved on the rayon thread pool. Output order
/// still follows `capacities`.
#[cfg(feature = "rayon")]
pub fn sweep_par(solver: &Solver, base: &KnapsackProblem, capacities: &[i64]) -> Sweep {
    use rayon::prelude::*;

    debug!(points = capacities.len(), items = base.num_items(), "starting parallel capacity sweep");
    let points = capacities
        .par_iter()
        .map(|&capacity| solve_point(solver, base, capacity))
        .collect();
    Sweep { points }
}
