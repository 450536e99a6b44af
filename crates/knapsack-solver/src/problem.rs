use std::collections::HashSet;

use crate::error::KnapsackError;

/// Identifier of an item, unique within a problem
pub type ItemId = u32;

/// A single item that may be packed
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
    /// Identifier of the item
    pub id: ItemId,
    /// Weight consumed when the item is packed (strictly positive)
    pub weight: u32,
    /// Profit gained when the item is packed (strictly positive)
    pub profit: u32,
}

impl Item {
    pub fn new(id: ItemId, weight: u32, profit: u32) -> Self {
        Self { id, weight, profit }
    }
}

/// Unvalidated problem description, as read from or written to the outside world
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemData {
    /// Items available for packing
    pub items: Vec<Item>,
    /// Knapsack capacity (negative values are rejected on validation)
    pub capacity: i64,
}

/// A validated 0/1 knapsack instance.
///
/// Items are kept sorted by ascending id, which fixes the order the solvers
/// walk them in. The instance is immutable: re-solving under another capacity
/// goes through [`KnapsackProblem::with_capacity`], which returns a new value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ProblemData", into = "ProblemData"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnapsackProblem {
    items: Vec<Item>,
    capacity: u64,
    total_weight: u64,
}

impl KnapsackProblem {
    /// Validate `items` and `capacity` and build an instance.
    ///
    /// Fails on a negative capacity, duplicate item ids, or items with zero
    /// weight or zero profit.
    pub fn new(items: Vec<Item>, capacity: i64) -> Result<Self, KnapsackError> {
        let capacity = check_capacity(capacity)?;

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(KnapsackError::DuplicateItem(item.id));
            }
            if item.weight == 0 {
                return Err(KnapsackError::ZeroWeight(item.id));
            }
            if item.profit == 0 {
                return Err(KnapsackError::ZeroProfit(item.id));
            }
        }

        let mut items = items;
        items.sort_by_key(|item| item.id);
        let total_weight = items.iter().map(|item| u64::from(item.weight)).sum();

        Ok(Self {
            items,
            capacity,
            total_weight,
        })
    }

    /// Copy of this instance with the capacity replaced. Items are shared as-is.
    pub fn with_capacity(&self, capacity: i64) -> Result<Self, KnapsackError> {
        Ok(Self {
            items: self.items.clone(),
            capacity: check_capacity(capacity)?,
            total_weight: self.total_weight,
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items
            .binary_search_by_key(&id, |item| item.id)
            .ok()
            .map(|idx| &self.items[idx])
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Sum of all item weights
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Largest capacity that can matter: beyond the total weight every item fits.
    pub(crate) fn effective_capacity(&self) -> u64 {
        self.capacity.min(self.total_weight)
    }
}

impl TryFrom<ProblemData> for KnapsackProblem {
    type Error = KnapsackError;

    fn try_from(data: ProblemData) -> Result<Self, Self::Error> {
        Self::new(data.items, data.capacity)
    }
}

impl From<KnapsackProblem> for ProblemData {
    fn from(problem: KnapsackProblem) -> Self {
        Self {
            items: problem.items,
            // Capacities only enter through `check_capacity`, so they fit in i64
            capacity: problem.capacity as i64,
        }
    }
}

fn check_capacity(capacity: i64) -> Result<u64, KnapsackError> {
    u64::try_from(capacity).map_err(|_| KnapsackError::NegativeCapacity(capacity))
}
