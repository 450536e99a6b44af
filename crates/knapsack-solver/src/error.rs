use thiserror::Error;

use crate::problem::ItemId;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KnapsackError {
    #[error("Capacity must be non-negative, got {0}")]
    NegativeCapacity(i64),
    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),
    #[error("Item {0} has zero weight")]
    ZeroWeight(ItemId),
    #[error("Item {0} has zero profit")]
    ZeroProfit(ItemId),
    #[error("Search aborted after {nodes} nodes (best objective found: {objective})")]
    Aborted { objective: u64, nodes: u64 },
}
