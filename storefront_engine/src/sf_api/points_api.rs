//! Peer-to-peer point transfers.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::Points,
    traits::{StorefrontDatabase, StorefrontError, TransferResult},
};

pub struct PointsApi<B> {
    db: B,
}

impl<B: Debug> Debug for PointsApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PointsApi ({:?})", self.db)
    }
}

impl<B> PointsApi<B>
where B: StorefrontDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Moves `amount` points from `sender_id` to `target_id`.
    ///
    /// Requests that can be rejected without touching the store (a non-positive amount, or sending to yourself) are
    /// rejected here. The debit and credit then happen in one transaction, so both balances change or neither does.
    pub async fn transfer(&self, sender_id: i64, target_id: i64, amount: i64) -> Result<TransferResult, StorefrontError> {
        if amount < 1 {
            return Err(StorefrontError::ValidationError("Transfer amount must be at least 1 point".into()));
        }
        if sender_id == target_id {
            return Err(StorefrontError::SelfTransfer);
        }
        let amount = Points::from(amount);
        let result = self.db.transfer_points(sender_id, target_id, amount).await.map_err(|e| {
            debug!("💸️ Transfer of {amount} from #{sender_id} to #{target_id} rejected. {e}");
            e
        })?;
        info!("💸️ {amount} transferred from account #{sender_id} to account #{target_id}");
        Ok(result)
    }
}
