use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    db_types::{LineItem, NewOrder, NewOrderBatch, Order, PointRate, SettlementStatus},
    order_objects::{OrderBatchResult, SettlementSummary},
    traits::{SettlementResult, StorefrontDatabase, StorefrontError},
};

/// Immutable settings for the order flow. Built once at start-up and handed to [`OrderFlowApi::new`].
#[derive(Debug, Clone)]
pub struct OrderFlowConfig {
    /// Currency units per reward point.
    pub point_rate: PointRate,
    /// How long a new batch waits before it is due for settlement.
    pub settlement_delay: Duration,
    /// How long a batch waits after a failed settlement attempt.
    pub retry_delay: Duration,
    /// Settlement attempts before a batch is marked `failed`.
    pub max_attempts: i64,
    /// Maximum number of due batches handled per pass.
    pub batch_size: i64,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        Self {
            point_rate: PointRate::default(),
            settlement_delay: Duration::seconds(60),
            retry_delay: Duration::seconds(30),
            max_attempts: 5,
            batch_size: 50,
        }
    }
}

/// `OrderFlowApi` is the primary API for the order lifecycle: creating orders, cancelling them, and settling them
/// once their batch falls due.
pub struct OrderFlowApi<B> {
    db: B,
    config: OrderFlowConfig,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", self.config.point_rate)
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, config: OrderFlowConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &OrderFlowConfig {
        &self.config
    }
}

impl<B> OrderFlowApi<B>
where B: StorefrontDatabase
{
    pub fn db(&self) -> &B {
        &self.db
    }

    /// Places an order for one or more line items on behalf of `account_id`.
    ///
    /// Every item is validated and priced before anything is written, so a bad item fails the whole request and no
    /// orders are created. The orders are then stored as one `pending` batch, due for settlement after the configured
    /// delay. This call does not wait for settlement.
    ///
    /// ## Failure modes:
    /// - No items, or a quantity below 1: [`StorefrontError::ValidationError`]
    /// - A line total or the batch's points overflow: [`StorefrontError::ValidationError`]
    /// - A product is missing or soft-deleted: [`StorefrontError::ProductNotFound`]
    /// - The account does not exist: [`StorefrontError::AccountNotFound`]
    /// - The batch could not be stored: [`StorefrontError::TransactionError`]
    pub async fn create_order(&self, account_id: i64, items: Vec<LineItem>) -> Result<OrderBatchResult, StorefrontError> {
        if items.is_empty() {
            return Err(StorefrontError::ValidationError("An order must contain at least one item".into()));
        }
        if let Some(item) = items.iter().find(|i| i.quantity < 1) {
            return Err(StorefrontError::ValidationError(format!(
                "Quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        if self.db.fetch_user_account(account_id).await?.is_none() {
            return Err(StorefrontError::AccountNotFound(account_id));
        }
        let mut new_orders = Vec::with_capacity(items.len());
        for item in &items {
            let product = self
                .db
                .fetch_product(item.product_id)
                .await?
                .filter(|p| p.is_available())
                .ok_or(StorefrontError::ProductNotFound(item.product_id))?;
            let total =
                product.price.checked_mul(item.quantity).map_err(|e| StorefrontError::ValidationError(e.to_string()))?;
            let points = self.config.point_rate.points_for(total);
            trace!("🔄️📦️ Product {} x{} = {total} earns {points}", product.id, item.quantity);
            new_orders.push(NewOrder { product_id: product.id, quantity: item.quantity, total, points });
        }
        let batch = NewOrderBatch { account_id, due_at: Utc::now() + self.config.settlement_delay, orders: new_orders };
        let total_points = batch.total_points().map_err(|e| StorefrontError::ValidationError(e.to_string()))?;
        let (batch, orders) = self.db.insert_order_batch(batch).await?;
        info!(
            "🔄️📦️ {} orders placed for account #{account_id} in batch {}. {total_points} pending settlement.",
            orders.len(),
            batch.id
        );
        Ok(OrderBatchResult { batch, orders, total_points })
    }

    /// Cancels a `pending` order owned by `account_id`. Settled and already-cancelled orders are rejected with distinct
    /// errors, and orders belonging to other accounts look exactly like missing ones.
    pub async fn cancel_order(&self, account_id: i64, order_id: i64) -> Result<Order, StorefrontError> {
        let order = self.db.cancel_order(account_id, order_id).await?;
        info!("🔄️📦️ Order #{order_id} cancelled by account #{account_id}");
        Ok(order)
    }

    /// Makes one settlement attempt on the batch.
    ///
    /// If the attempt fails, the failure is recorded against the batch so that it is retried after the configured
    /// delay (or marked `failed` once the attempts run out), and the original error is returned.
    pub async fn settle_batch(&self, batch_id: i64) -> Result<SettlementResult, StorefrontError> {
        match self.db.settle_batch(batch_id).await {
            Ok(result) => {
                if let SettlementResult::Settled { orders, credited, batch } = &result {
                    info!(
                        "🔄️💰️ Batch {batch_id} settled. {} orders completed, {credited} credited to account #{}",
                        orders.len(),
                        batch.account_id
                    );
                }
                Ok(result)
            },
            Err(StorefrontError::BatchNotFound(id)) => Err(StorefrontError::BatchNotFound(id)),
            Err(e) => {
                warn!("🔄️💰️ Settlement of batch {batch_id} failed. {e}");
                let retry_at = Utc::now() + self.config.retry_delay;
                match self.db.record_settlement_failure(batch_id, &e.to_string(), self.config.max_attempts, retry_at).await
                {
                    Ok(batch) if batch.status == SettlementStatus::Failed => {
                        error!(
                            "🔄️💰️ Batch {batch_id} has failed {} times and will not be retried. Its orders stay pending.",
                            batch.attempts
                        );
                    },
                    Ok(batch) => debug!("🔄️💰️ Batch {batch_id} will be retried at {}", batch.due_at),
                    Err(e2) => error!("🔄️💰️ Could not record settlement failure for batch {batch_id}. {e2}"),
                }
                Err(e)
            },
        }
    }

    /// Settles every batch that is due at `now`, up to the configured page size. Individual failures are logged and
    /// counted; they do not stop the pass.
    pub async fn process_due_settlements(&self, now: DateTime<Utc>) -> Result<SettlementSummary, StorefrontError> {
        let due = self.db.fetch_due_batches(now, self.config.batch_size).await?;
        let mut summary = SettlementSummary::default();
        for batch in due {
            match self.settle_batch(batch.id).await {
                Ok(SettlementResult::Settled { credited, .. }) => {
                    summary.settled += 1;
                    summary.credited = summary.credited.saturating_add(credited);
                },
                Ok(SettlementResult::Void(_)) => summary.voided += 1,
                Ok(SettlementResult::AlreadyProcessed(_)) => summary.skipped += 1,
                Err(_) => summary.failed += 1,
            }
        }
        if !summary.is_empty() {
            debug!("🔄️💰️ Settlement pass complete: {summary:?}");
        }
        Ok(summary)
    }
}
