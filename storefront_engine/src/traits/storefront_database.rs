use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{NewOrderBatch, Order, OrderBatch, Points},
    traits::{
        data_objects::{SettlementResult, TransferResult},
        AccountApiError,
        AccountManagement,
        CatalogManagement,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the storefront engine.
///
/// This behaviour includes:
/// * Persisting a batch of new orders together with its settlement job
/// * Guarded order cancellation
/// * Settling batches, exactly once, and crediting the earned points
/// * Atomic point transfers between accounts
///
/// All status changes are conditional on the current status of the row, so concurrent cancellation and settlement of
/// the same order can never both succeed.
#[allow(async_fn_in_trait)]
pub trait StorefrontDatabase: Clone + AccountManagement + CatalogManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores the batch and all its orders in a single atomic transaction. Every order starts out `pending` and the
    /// batch starts out `scheduled`, due at `batch.due_at`.
    ///
    /// Returns the stored batch and its orders, or [`StorefrontError::ValidationError`] if the points of the orders
    /// add up to more than a balance can hold.
    async fn insert_order_batch(&self, batch: NewOrderBatch) -> Result<(OrderBatch, Vec<Order>), StorefrontError>;

    /// Moves the order from `pending` to `cancelled`, provided it belongs to `account_id`.
    ///
    /// ## Failure modes:
    /// - The order does not exist, or belongs to someone else: [`StorefrontError::OrderNotFound`]
    /// - The order was already cancelled: [`StorefrontError::OrderAlreadyCancelled`]
    /// - The order already settled: [`StorefrontError::OrderAlreadyCompleted`]
    async fn cancel_order(&self, account_id: i64, order_id: i64) -> Result<Order, StorefrontError>;

    /// Settles the batch in a single atomic transaction:
    /// * The batch is claimed, but only if it is still `scheduled`. Otherwise `AlreadyProcessed` is returned and
    ///   nothing changes.
    /// * Orders of the batch that are still `pending` move to `success`. Cancelled orders are left alone.
    /// * The account is credited with the sum of the points of the orders that moved.
    /// * The batch is marked `settled` (or `void` if no order moved).
    ///
    /// If any step fails, the whole transaction rolls back and the error is returned. A credit that would overflow the
    /// account balance is such a failure, reported as [`StorefrontError::TransactionError`].
    async fn settle_batch(&self, batch_id: i64) -> Result<SettlementResult, StorefrontError>;

    /// Records a failed settlement attempt. The batch stays `scheduled` and becomes due again at `retry_at`, unless
    /// this was attempt number `max_attempts`, in which case the batch is marked `failed`.
    async fn record_settlement_failure(
        &self,
        batch_id: i64,
        reason: &str,
        max_attempts: i64,
        retry_at: DateTime<Utc>,
    ) -> Result<OrderBatch, StorefrontError>;

    /// Fetches up to `limit` batches that are `scheduled` and due at or before `now`, oldest first.
    async fn fetch_due_batches(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OrderBatch>, StorefrontError>;

    /// Moves `amount` points from `sender_id` to `target_id` in a single transaction.
    ///
    /// ## Failure modes:
    /// - The target account does not exist: [`StorefrontError::AccountNotFound`]
    /// - The sender does not exist, or holds fewer than `amount` points: [`StorefrontError::InsufficientBalance`]
    /// - The target balance would overflow: [`StorefrontError::TransactionError`]
    ///
    /// Neither balance changes on failure.
    async fn transfer_points(
        &self,
        sender_id: i64,
        target_id: i64,
        amount: Points,
    ) -> Result<TransferResult, StorefrontError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StorefrontError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorefrontError {
    #[error("Invalid request. {0}")]
    ValidationError(String),
    #[error("Product with id {0} was not found")]
    ProductNotFound(i64),
    #[error("Order with id {0} was not found")]
    OrderNotFound(i64),
    #[error("Order {0} is already cancelled")]
    OrderAlreadyCancelled(i64),
    #[error("Order {0} is already completed and cannot be cancelled")]
    OrderAlreadyCompleted(i64),
    #[error("Order batch {0} was not found")]
    BatchNotFound(i64),
    #[error("Account with id {0} was not found")]
    AccountNotFound(i64),
    #[error("Insufficient balance. Account {account_id} cannot spend {requested}")]
    InsufficientBalance { account_id: i64, requested: Points },
    #[error("Cannot transfer points to yourself")]
    SelfTransfer,
    #[error("Transaction failed. {0}")]
    TransactionError(String),
    #[error("Account query failed. {0}")]
    AccountError(#[from] AccountApiError),
}

impl From<sqlx::Error> for StorefrontError {
    fn from(e: sqlx::Error) -> Self {
        StorefrontError::TransactionError(e.to_string())
    }
}

