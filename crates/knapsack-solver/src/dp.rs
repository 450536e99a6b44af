//! Exact 0/1 knapsack by dynamic programming over (item prefix, residual capacity).
//!
//! `best(i, c)` is the highest profit reachable with the first `i` items
//! (in id order) under capacity `c`:
//!
//! ```text
//! best(0, c) = 0
//! best(i, c) = max(best(i-1, c), profit[i] + best(i-1, c - weight[i]))   if weight[i] <= c
//!            = best(i-1, c)                                               otherwise
//! ```
//!
//! The selection is rebuilt by walking back from `(n, C)`. Item `i` is taken
//! only when `best(i, c) != best(i-1, c)`, so when several subsets are optimal
//! the walk leaves out higher ids first.

use crate::problem::KnapsackProblem;
use crate::solution::{Method, Solution, SolutionStatus};

/// Number of cells the table needs for `problem`, or `None` on overflow.
pub(crate) fn table_cells(problem: &KnapsackProblem) -> Option<usize> {
    let rows = problem.num_items().checked_add(1)?;
    let width = usize::try_from(problem.effective_capacity()).ok()?.checked_add(1)?;
    rows.checked_mul(width)
}

/// Solve `problem` exactly, or return `None` when the table cannot be
/// addressed or allocated on this machine.
pub(crate) fn solve(problem: &KnapsackProblem) -> Option<Solution> {
    let items = problem.items();
    let n = items.len();
    let cells = table_cells(problem)?;
    // Weights beyond the total never change the answer, so the table stops there
    let capacity = usize::try_from(problem.effective_capacity()).ok()?;
    let width = capacity + 1;

    let mut table: Vec<u64> = Vec::new();
    table.try_reserve_exact(cells).ok()?;
    table.resize(cells, 0);
    for (i, item) in items.iter().enumerate() {
        let weight = item.weight as usize;
        let profit = u64::from(item.profit);

        let (done, rest) = table.split_at_mut((i + 1) * width);
        let prev = &done[i * width..];
        let row = &mut rest[..width];

        for c in 0..width {
            row[c] = if weight <= c {
                prev[c].max(prev[c - weight] + profit)
            } else {
                prev[c]
            };
        }
    }

    let mut taken = vec![false; n];
    let mut c = capacity;
    for i in (1..=n).rev() {
        if table[i * width + c] != table[(i - 1) * width + c] {
            taken[i - 1] = true;
            c -= items[i - 1].weight as usize;
        }
    }

    let work = (n * width) as u64;
    Some(Solution::from_flags(
        problem,
        &taken,
        SolutionStatus::Optimal,
        Method::DynamicProgramming,
        work,
    ))
}
