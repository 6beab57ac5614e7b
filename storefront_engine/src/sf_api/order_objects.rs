use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderBatch, Points};

/// The result of a successful order request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBatchResult {
    pub batch: OrderBatch,
    pub orders: Vec<Order>,
    /// `sum(floor(total / rate))` over all orders in the batch. Credited once the batch settles.
    pub total_points: Points,
}

impl OrderBatchResult {
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

/// Tally of one pass over the due settlement batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub settled: usize,
    pub voided: usize,
    pub skipped: usize,
    pub failed: usize,
    pub credited: Points,
}

impl SettlementSummary {
    pub fn is_empty(&self) -> bool {
        self.settled + self.voided + self.skipped + self.failed == 0
    }
}
