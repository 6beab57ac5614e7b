//! Unifies API for accessing accounts and order listings.

use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{Order, OrderView, UserAccount},
    traits::{AccountApiError, AccountManagement},
};

/// The `AccountApi` provides read-only access to accounts and their orders.
pub struct AccountApi<B> {
    db: B,
}

impl<B: Debug> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi ({:?})", self.db)
    }
}

impl<B> AccountApi<B>
where B: AccountManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the user account for the given account id. If no account exists, `None` is returned.
    pub async fn account_by_id(&self, account_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        self.db.fetch_user_account(account_id).await
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        self.db.fetch_order(order_id).await
    }

    /// The caller's own orders, newest first. Cancelled orders are not listed.
    pub async fn orders_for_account(&self, account_id: i64) -> Result<Vec<OrderView>, AccountApiError> {
        let orders = self.db.fetch_order_views_for_account(account_id).await?;
        trace!("🔄️ Fetched {} orders for account #{account_id}", orders.len());
        Ok(orders)
    }

    /// Every non-cancelled order in the store, newest first.
    pub async fn all_orders(&self) -> Result<Vec<OrderView>, AccountApiError> {
        self.db.fetch_all_order_views().await
    }
}
