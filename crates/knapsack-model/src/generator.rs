use std::ops::Range;

use knapsack_solver::{Item, KnapsackProblem};
use rand::RngCore;
use tracing::{debug, trace};

use crate::error::ModelError;

/// Shape of the instances a [`Generator`] produces
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Number of items; ids run from 1 to `num_items`
    pub num_items: u32,
    /// Half-open range profits are drawn from
    pub profit_range: Range<u32>,
    /// Half-open range weights are drawn from
    pub weight_range: Range<u32>,
    /// Initial capacity of the generated instance
    pub capacity: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_items: 10,
            profit_range: 10..50,
            weight_range: 1..10,
            capacity: 20,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_items(mut self, num_items: u32) -> Self {
        self.num_items = num_items;
        self
    }

    pub fn with_profit_range(mut self, range: Range<u32>) -> Self {
        self.profit_range = range;
        self
    }

    pub fn with_weight_range(mut self, range: Range<u32>) -> Self {
        self.weight_range = range;
        self
    }

    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = capacity;
        self
    }
}

/// Builds random knapsack instances from an explicit random number generator.
///
/// For a given generator state the output is fully determined: all profits are
/// drawn first in id order, then all weights. Each draw takes the bit length
/// `k` of the range width, reads `next_u32() >> (32 - k)` and rejects values
/// outside the range. Changing that order changes every instance, so it is
/// part of the contract.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate<R: RngCore + ?Sized>(&self, rng: &mut R) -> Result<KnapsackProblem, ModelError> {
        let profit_range = check_range("profit", &self.config.profit_range)?;
        let weight_range = check_range("weight", &self.config.weight_range)?;
        let n = self.config.num_items;

        let profits: Vec<u32> = (0..n).map(|_| sample(rng, &profit_range)).collect();
        let weights: Vec<u32> = (0..n).map(|_| sample(rng, &weight_range)).collect();

        let items: Vec<Item> = (1..=n)
            .zip(weights.into_iter().zip(profits))
            .map(|(id, (weight, profit))| Item::new(id, weight, profit))
            .inspect(|item| trace!(id = item.id, weight = item.weight, profit = item.profit, "generated item"))
            .collect();

        let problem = KnapsackProblem::new(items, self.config.capacity)?;
        debug!(
            items = problem.num_items(),
            capacity = problem.capacity(),
            total_weight = problem.total_weight(),
            "generated knapsack instance"
        );
        Ok(problem)
    }
}

fn check_range(name: &'static str, range: &Range<u32>) -> Result<Range<u32>, ModelError> {
    if range.start == 0 || range.is_empty() {
        return Err(ModelError::InvalidRange {
            name,
            start: range.start,
            end: range.end,
        });
    }
    Ok(range.clone())
}

/// Uniform draw from a non-empty `range`
fn sample<R: RngCore + ?Sized>(rng: &mut R, range: &Range<u32>) -> u32 {
    range.start + below(rng, range.end - range.start)
}

/// Uniform draw from `0..n` by rejection on the top `bit_length(n)` bits. `n` must be non-zero.
fn below<R: RngCore + ?Sized>(rng: &mut R, n: u32) -> u32 {
    let bits = u32::BITS - n.leading_zeros();
    loop {
        let candidate = rng.next_u32() >> (u32::BITS - bits);
        if candidate < n {
            return candidate;
        }
    }
}
