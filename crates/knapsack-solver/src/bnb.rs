//! Depth-first branch and bound for instances whose DP table is too large.
//!
//! Items are visited by decreasing profit density (ties by ascending id). Each
//! node first tries to pack the next item, then to skip it. A node is pruned
//! when the Dantzig bound (greedy fill plus the floored fractional part of the
//! first item that does not fit) cannot beat the incumbent. The incumbent
//! starts from the greedy fill and is only replaced on strict improvement, so
//! among equal optima the first one reached in this order wins.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::problem::KnapsackProblem;
use crate::solution::{Method, Solution, SolutionStatus};

/// Search limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Limits {
    pub node_limit: Option<u64>,
    pub time_limit: Option<Duration>,
}

/// Nodes between two clock reads
const TIME_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Number of items already decided
    depth: usize,
    weight: u64,
    profit: u64,
    /// Decision taken for item `depth - 1` (unused at the root)
    packed: bool,
}

struct Search {
    /// Problem item indices in density order
    order: Vec<usize>,
    weights: Vec<u64>,
    profits: Vec<u64>,
    capacity: u64,
    limits: Limits,
    started: Instant,
    nodes: u64,
    best_profit: u64,
    /// Decisions of the incumbent, in density order
    best_path: Vec<bool>,
}

impl Search {
    fn new(problem: &KnapsackProblem, limits: Limits) -> Self {
        let items = problem.items();
        let mut order: Vec<usize> = (0..items.len()).collect();
        // p_a / w_a > p_b / w_b  <=>  p_a * w_b > p_b * w_a
        order.sort_by(|&a, &b| {
            let lhs = u64::from(items[a].profit) * u64::from(items[b].weight);
            let rhs = u64::from(items[b].profit) * u64::from(items[a].weight);
            match rhs.cmp(&lhs) {
                Ordering::Equal => items[a].id.cmp(&items[b].id),
                other => other,
            }
        });

        let weights = order.iter().map(|&i| u64::from(items[i].weight)).collect();
        let profits = order.iter().map(|&i| u64::from(items[i].profit)).collect();

        Self {
            order,
            weights,
            profits,
            capacity: problem.capacity(),
            limits,
            started: Instant::now(),
            nodes: 0,
            best_profit: 0,
            best_path: Vec::new(),
        }
    }

    /// Greedy fill in density order, skipping items that no longer fit.
    fn seed_incumbent(&mut self) {
        let mut remaining = self.capacity;
        let mut path = vec![false; self.order.len()];
        let mut profit = 0;

        for (k, flag) in path.iter_mut().enumerate() {
            if self.weights[k] <= remaining {
                remaining -= self.weights[k];
                profit += self.profits[k];
                *flag = true;
            }
        }

        self.best_profit = profit;
        self.best_path = path;
    }

    fn upper_bound(&self, depth: usize, weight: u64, profit: u64) -> u64 {
        let mut remaining = self.capacity - weight;
        let mut bound = profit;

        for k in depth..self.order.len() {
            if self.weights[k] <= remaining {
                remaining -= self.weights[k];
                bound += self.profits[k];
            } else {
                bound += self.profits[k] * remaining / self.weights[k];
                break;
            }
        }

        bound
    }

    fn limit_reached(&self) -> bool {
        if let Some(limit) = self.limits.node_limit {
            if self.nodes >= limit {
                return true;
            }
        }
        if let Some(limit) = self.limits.time_limit {
            if self.nodes % TIME_CHECK_INTERVAL == 0 && self.started.elapsed() >= limit {
                return true;
            }
        }
        false
    }

    /// Run the search. Returns `false` when a limit stopped it early.
    fn run(&mut self) -> bool {
        let n = self.order.len();
        // Decisions along the current branch; entries past a node's depth are stale
        let mut path: Vec<bool> = Vec::with_capacity(n);
        let mut stack = vec![Node {
            depth: 0,
            weight: 0,
            profit: 0,
            packed: false,
        }];

        while let Some(node) = stack.pop() {
            if self.limit_reached() {
                return false;
            }
            self.nodes += 1;

            if node.depth > 0 {
                path.truncate(node.depth - 1);
                path.push(node.packed);
            }

            if node.profit > self.best_profit {
                self.best_profit = node.profit;
                self.best_path.clear();
                self.best_path.extend_from_slice(&path);
                self.best_path.resize(n, false);
            }

            if node.depth == n || self.upper_bound(node.depth, node.weight, node.profit) <= self.best_profit {
                continue;
            }

            let k = node.depth;
            stack.push(Node {
                depth: k + 1,
                weight: node.weight,
                profit: node.profit,
                packed: false,
            });
            if node.weight + self.weights[k] <= self.capacity {
                stack.push(Node {
                    depth: k + 1,
                    weight: node.weight + self.weights[k],
                    profit: node.profit + self.profits[k],
                    packed: true,
                });
            }
        }

        true
    }

    fn into_solution(self, problem: &KnapsackProblem, status: SolutionStatus) -> Solution {
        let mut taken = vec![false; problem.num_items()];
        for (k, &packed) in self.best_path.iter().enumerate() {
            if packed {
                taken[self.order[k]] = true;
            }
        }
        Solution::from_flags(problem, &taken, status, Method::BranchAndBound, self.nodes)
    }
}

pub(crate) fn solve(problem: &KnapsackProblem, limits: Limits) -> Solution {
    let mut search = Search::new(problem, limits);
    search.seed_incumbent();

    let status = if search.run() {
        SolutionStatus::Optimal
    } else {
        SolutionStatus::Aborted
    };
    search.into_solution(problem, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Item;

    fn unlimited() -> Limits {
        Limits::default()
    }

    #[test]
    fn test_small_instance() {
        let problem = KnapsackProblem::new(
            vec![
                Item::new(1, 5, 10),
                Item::new(2, 4, 40),
                Item::new(3, 6, 30),
                Item::new(4, 4, 50),
            ],
            10,
        )
        .unwrap();

        let solution = solve(&problem, unlimited());
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.objective_value, 90);
        assert_eq!(solution.selection.selected_ids().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(solution.analysis.method, Method::BranchAndBound);
        assert!(solution.verify(&problem));
    }

    #[test]
    fn test_greedy_is_not_optimal() {
        // Density favours item 1, but items 2 and 3 together fill the knapsack better
        let problem = KnapsackProblem::new(
            vec![Item::new(1, 6, 13), Item::new(2, 5, 10), Item::new(3, 5, 10)],
            10,
        )
        .unwrap();

        let solution = solve(&problem, unlimited());
        assert_eq!(solution.objective_value, 20);
        assert_eq!(solution.selection.selected_ids().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_huge_capacity() {
        let problem = KnapsackProblem::new(
            vec![Item::new(1, u32::MAX, 3), Item::new(2, u32::MAX, 5)],
            i64::MAX,
        )
        .unwrap();

        let solution = solve(&problem, unlimited());
        assert_eq!(solution.objective_value, 8);
        assert_eq!(solution.selection.num_selected(), 2);
    }

    #[test]
    fn test_node_limit_keeps_feasible_incumbent() {
        let items = (1..=30)
            .map(|id| Item::new(id, 10 + id % 7, 20 + (id * 13) % 17))
            .collect();
        let problem = KnapsackProblem::new(items, 97).unwrap();

        let solution = solve(
            &problem,
            Limits {
                node_limit: Some(3),
                time_limit: None,
            },
        );
        assert_eq!(solution.status, SolutionStatus::Aborted);
        assert_eq!(solution.analysis.work, 3);
        assert!(solution.objective_value > 0);
        assert!(solution.verify(&problem));
    }

    #[test]
    fn test_empty_and_zero_capacity() {
        let empty = KnapsackProblem::new(Vec::new(), 5).unwrap();
        let solution = solve(&empty, unlimited());
        assert_eq!(solution.objective_value, 0);
        assert!(solution.selection.is_empty());

        let zero = KnapsackProblem::new(vec![Item::new(1, 1, 1)], 0).unwrap();
        let solution = solve(&zero, unlimited());
        assert_eq!(solution.objective_value, 0);
        assert_eq!(solution.selection.num_selected(), 0);
    }
}
