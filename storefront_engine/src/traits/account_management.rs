use thiserror::Error;

use crate::db_types::{Order, OrderBatch, OrderView, UserAccount};

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}

/// The `AccountManagement` trait defines read-only queries over accounts and the orders they own.
///
/// The [`StorefrontDatabase`](crate::traits::StorefrontDatabase) trait handles all state changes. `AccountManagement`
/// never mutates anything, so it is safe to hand out to read-only API surfaces.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    /// Fetches the user account with the given id. If no account exists, `None` is returned.
    async fn fetch_user_account(&self, account_id: i64) -> Result<Option<UserAccount>, AccountApiError>;

    /// Fetches a single order by its id, regardless of owner or status.
    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;

    /// Order listing for one account. Cancelled orders are excluded, and the newest orders come first.
    async fn fetch_order_views_for_account(&self, account_id: i64) -> Result<Vec<OrderView>, AccountApiError>;

    /// Order listing across all accounts. Cancelled orders are excluded, and the newest orders come first.
    async fn fetch_all_order_views(&self) -> Result<Vec<OrderView>, AccountApiError>;

    /// All orders belonging to the given batch, in creation order.
    async fn fetch_orders_for_batch(&self, batch_id: i64) -> Result<Vec<Order>, AccountApiError>;

    async fn fetch_batch(&self, batch_id: i64) -> Result<Option<OrderBatch>, AccountApiError>;
}
