use std::collections::BTreeMap;

use crate::error::KnapsackError;
use crate::problem::{ItemId, KnapsackProblem};

/// The result of solving a knapsack problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Inclusion flag for every item of the problem
    pub selection: Selection,
    /// Sum of profits of the selected items
    pub objective_value: u64,
    /// Sum of weights of the selected items
    pub total_weight: u64,
    /// How the solution was obtained
    pub analysis: Analysis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// The selection is proven optimal
    Optimal,
    /// A search limit was hit; the selection is the best feasible one found
    Aborted,
}

/// Algorithm that produced a solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    DynamicProgramming,
    BranchAndBound,
}

/// Details about the solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Algorithm used
    pub method: Method,
    /// Table cells filled (dynamic programming) or nodes explored (branch and bound)
    pub work: u64,
    /// Capacity left unused by the selection
    pub residual_capacity: u64,
    /// Whether the selection fills the knapsack exactly
    pub capacity_binding: bool,
}

/// Which items are packed. Holds one flag per item of the solved problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    flags: BTreeMap<ItemId, bool>,
}

impl Selection {
    /// Build a selection from per-item flags in the problem's item order.
    pub(crate) fn from_flags(problem: &KnapsackProblem, taken: &[bool]) -> Self {
        let flags = problem
            .items()
            .iter()
            .zip(taken)
            .map(|(item, &flag)| (item.id, flag))
            .collect();
        Self { flags }
    }

    /// Whether `id` is packed. Unknown ids are reported as not packed.
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.flags.get(&id).copied().unwrap_or(false)
    }

    /// Ids of the packed items, ascending
    pub fn selected_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.flags
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| *id)
    }

    pub fn num_selected(&self) -> usize {
        self.flags.values().filter(|selected| **selected).count()
    }

    /// All `(id, flag)` pairs, ascending by id
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, bool)> + '_ {
        self.flags.iter().map(|(id, flag)| (*id, *flag))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl Solution {
    pub(crate) fn from_flags(
        problem: &KnapsackProblem,
        taken: &[bool],
        status: SolutionStatus,
        method: Method,
        work: u64,
    ) -> Self {
        let (objective_value, total_weight) = problem
            .items()
            .iter()
            .zip(taken)
            .filter(|(_, flag)| **flag)
            .fold((0u64, 0u64), |(profit, weight), (item, _)| {
                (profit + u64::from(item.profit), weight + u64::from(item.weight))
            });
        let residual_capacity = problem.capacity().saturating_sub(total_weight);

        Self {
            status,
            selection: Selection::from_flags(problem, taken),
            objective_value,
            total_weight,
            analysis: Analysis {
                method,
                work,
                residual_capacity,
                capacity_binding: residual_capacity == 0,
            },
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Turn a non-optimal solution into [`KnapsackError::Aborted`].
    pub fn into_optimal(self) -> Result<Self, KnapsackError> {
        match self.status {
            SolutionStatus::Optimal => Ok(self),
            SolutionStatus::Aborted => Err(KnapsackError::Aborted {
                objective: self.objective_value,
                nodes: self.analysis.work,
            }),
        }
    }

    /// Check the selection against `problem`: every item flagged, weight
    /// within capacity, and the reported totals match the packed items.
    pub fn verify(&self, problem: &KnapsackProblem) -> bool {
        if self.selection.len() != problem.num_items() {
            return false;
        }

        let mut weight = 0u64;
        let mut profit = 0u64;
        for item in problem.items() {
            match self.selection.flags.get(&item.id) {
                Some(true) => {
                    weight += u64::from(item.weight);
                    profit += u64::from(item.profit);
                }
                Some(false) => {}
                None => return false,
            }
        }

        weight <= problem.capacity() && weight == self.total_weight && profit == self.objective_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Item;

    fn problem() -> KnapsackProblem {
        KnapsackProblem::new(
            vec![Item::new(1, 3, 4), Item::new(2, 5, 7), Item::new(3, 2, 1)],
            8,
        )
        .unwrap()
    }

    #[test]
    fn test_totals_and_analysis() {
        let problem = problem();
        let solution = Solution::from_flags(
            &problem,
            &[true, true, false],
            SolutionStatus::Optimal,
            Method::DynamicProgramming,
            12,
        );

        assert_eq!(solution.objective_value, 11);
        assert_eq!(solution.total_weight, 8);
        assert!(solution.analysis.capacity_binding);
        assert_eq!(solution.selection.selected_ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(solution.selection.num_selected(), 2);
        assert!(!solution.selection.is_selected(3));
        assert!(solution.verify(&problem));
    }

    #[test]
    fn test_verify_rejects_overweight() {
        let problem = problem();
        let mut solution = Solution::from_flags(
            &problem,
            &[true, true, false],
            SolutionStatus::Optimal,
            Method::DynamicProgramming,
            0,
        );
        let tighter = problem.with_capacity(7).unwrap();
        assert!(!solution.verify(&tighter));

        solution.objective_value += 1;
        assert!(!solution.verify(&problem));
    }

    #[test]
    fn test_into_optimal() {
        let problem = problem();
        let aborted = Solution::from_flags(
            &problem,
            &[false, true, false],
            SolutionStatus::Aborted,
            Method::BranchAndBound,
            40,
        );
        assert_eq!(
            aborted.into_optimal().unwrap_err(),
            KnapsackError::Aborted { objective: 7, nodes: 40 }
        );
    }
}
