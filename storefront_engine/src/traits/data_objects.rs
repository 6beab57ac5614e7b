use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderBatch, Points, UserAccount};

/// The outcome of a single settlement attempt on a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettlementResult {
    /// The listed orders moved from `pending` to `success`, and `credited` points were added to the account.
    Settled { batch: OrderBatch, orders: Vec<Order>, credited: Points },
    /// Every order in the batch had already been cancelled. Nothing was credited.
    Void(OrderBatch),
    /// The batch was no longer `scheduled` when the attempt started. Another attempt already handled it.
    AlreadyProcessed(OrderBatch),
}

impl SettlementResult {
    pub fn batch(&self) -> &OrderBatch {
        match self {
            SettlementResult::Settled { batch, .. } => batch,
            SettlementResult::Void(batch) => batch,
            SettlementResult::AlreadyProcessed(batch) => batch,
        }
    }

    pub fn credited(&self) -> Points {
        match self {
            SettlementResult::Settled { credited, .. } => *credited,
            _ => Points::default(),
        }
    }
}

/// Both sides of a completed point transfer, as they stand after the transaction committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub sender: UserAccount,
    pub target: UserAccount,
    pub amount: Points,
}
