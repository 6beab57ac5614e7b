//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! Every transaction below starts with a write statement. SQLite then takes the write lock up front, and concurrent
//! writers queue on the busy timeout rather than deadlocking on a read-to-write lock upgrade.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate, SqliteConnection, SqlitePool};

use super::db::{accounts, batches, db_url, new_pool, orders, products};
use crate::{
    db_types::{NewOrderBatch, NewProduct, Order, OrderBatch, OrderStatusType, OrderView, Points, Product, Role, UserAccount},
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogManagement,
        SettlementResult,
        StorefrontDatabase,
        StorefrontError,
        TransferResult,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order_batch(&self, batch: NewOrderBatch) -> Result<(OrderBatch, Vec<Order>), StorefrontError> {
        let total_points = batch.total_points().map_err(|e| StorefrontError::ValidationError(e.to_string()))?;
        let NewOrderBatch { account_id, due_at, orders: new_orders } = batch;
        let mut tx = self.pool.begin().await?;
        let batch = batches::insert_batch(account_id, total_points, due_at, &mut tx).await?;
        let mut stored = Vec::with_capacity(new_orders.len());
        for order in new_orders {
            let order = orders::insert_order(batch.id, account_id, order, &mut tx).await?;
            stored.push(order);
        }
        tx.commit().await?;
        debug!(
            "🗃️ Batch {} with {} orders ({total_points}) saved for account #{account_id}. Due at {}",
            batch.id,
            stored.len(),
            batch.due_at
        );
        Ok((batch, stored))
    }

    async fn cancel_order(&self, account_id: i64, order_id: i64) -> Result<Order, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        if let Some(order) = orders::cancel_pending_order(order_id, account_id, &mut tx).await? {
            tx.commit().await?;
            debug!("🗃️ Order #{order_id} cancelled by account #{account_id}");
            return Ok(order);
        }
        // Nothing changed. Work out why for the caller.
        let existing = orders::fetch_order_for_account(order_id, account_id, &mut tx).await?;
        tx.rollback().await?;
        let status = existing.map(|o| o.status).ok_or(StorefrontError::OrderNotFound(order_id))?;
        if status.can_transition_to(OrderStatusType::Cancelled) {
            return Err(StorefrontError::TransactionError(format!(
                "Order #{order_id} is {status} but could not be cancelled"
            )));
        }
        match status {
            OrderStatusType::Cancelled => Err(StorefrontError::OrderAlreadyCancelled(order_id)),
            _ => Err(StorefrontError::OrderAlreadyCompleted(order_id)),
        }
    }

    async fn settle_batch(&self, batch_id: i64) -> Result<SettlementResult, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let Some(batch) = batches::claim_batch(batch_id, &mut tx).await? else {
            let batch = batches::fetch_batch(batch_id, &mut tx).await?.ok_or(StorefrontError::BatchNotFound(batch_id))?;
            tx.rollback().await?;
            trace!("🗃️ Batch {batch_id} is already {}. Nothing to settle.", batch.status);
            return Ok(SettlementResult::AlreadyProcessed(batch));
        };
        let settled = orders::settle_pending_orders(batch_id, &mut tx).await?;
        if settled.is_empty() {
            let batch = batches::mark_void(batch_id, &mut tx).await?;
            tx.commit().await?;
            debug!("🗃️ Every order in batch {batch_id} was cancelled. Batch is void.");
            return Ok(SettlementResult::Void(batch));
        }
        let credited = Points::checked_sum(settled.iter().map(|o| o.points))
            .map_err(|e| StorefrontError::TransactionError(format!("Batch {batch_id} cannot be credited. {e}")))?;
        if !accounts::credit_points(batch.account_id, credited, &mut tx).await? {
            return Err(credit_failure(batch.account_id, credited, &mut tx).await?);
        }
        let batch = batches::mark_settled(batch_id, credited, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Batch {batch_id} settled. {} orders completed and {credited} credited to account #{}",
            settled.len(),
            batch.account_id
        );
        Ok(SettlementResult::Settled { batch, orders: settled, credited })
    }

    async fn record_settlement_failure(
        &self,
        batch_id: i64,
        reason: &str,
        max_attempts: i64,
        retry_at: DateTime<Utc>,
    ) -> Result<OrderBatch, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let batch = match batches::record_failure(batch_id, reason, max_attempts, retry_at, &mut tx).await? {
            Some(batch) => batch,
            None => batches::fetch_batch(batch_id, &mut tx).await?.ok_or(StorefrontError::BatchNotFound(batch_id))?,
        };
        tx.commit().await?;
        Ok(batch)
    }

    async fn fetch_due_batches(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<OrderBatch>, StorefrontError> {
        let mut conn = self.pool.acquire().await?;
        let batches = batches::fetch_due_batches(now, limit, &mut conn).await?;
        Ok(batches)
    }

    async fn transfer_points(
        &self,
        sender_id: i64,
        target_id: i64,
        amount: Points,
    ) -> Result<TransferResult, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        if !accounts::touch_account(target_id, &mut tx).await? {
            return Err(StorefrontError::AccountNotFound(target_id));
        }
        if !accounts::debit_points(sender_id, amount, &mut tx).await? {
            return Err(StorefrontError::InsufficientBalance { account_id: sender_id, requested: amount });
        }
        if !accounts::credit_points(target_id, amount, &mut tx).await? {
            return Err(credit_failure(target_id, amount, &mut tx).await?);
        }
        let sender =
            accounts::fetch_user_account(sender_id, &mut tx).await?.ok_or(StorefrontError::AccountNotFound(sender_id))?;
        let target =
            accounts::fetch_user_account(target_id, &mut tx).await?.ok_or(StorefrontError::AccountNotFound(target_id))?;
        tx.commit().await?;
        debug!("🗃️ {amount} moved from account #{sender_id} to account #{target_id}");
        Ok(TransferResult { sender, target, amount })
    }

    async fn close(&mut self) -> Result<(), StorefrontError> {
        self.pool.close().await;
        Ok(())
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_user_account(&self, account_id: i64) -> Result<Option<UserAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let account = accounts::fetch_user_account(account_id, &mut conn).await?;
        Ok(account)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_views_for_account(&self, account_id: i64) -> Result<Vec<OrderView>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let views = orders::fetch_order_views_for_account(account_id, &mut conn).await?;
        Ok(views)
    }

    async fn fetch_all_order_views(&self) -> Result<Vec<OrderView>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let views = orders::fetch_all_order_views(&mut conn).await?;
        Ok(views)
    }

    async fn fetch_orders_for_batch(&self, batch_id: i64) -> Result<Vec<Order>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_batch(batch_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_batch(&self, batch_id: i64) -> Result<Option<OrderBatch>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let batch = batches::fetch_batch(batch_id, &mut conn).await?;
        Ok(batch)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }
}

/// Explains why `credit_points` left the account untouched. The caller drops the transaction, which rolls it back.
async fn credit_failure(
    account_id: i64,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<StorefrontError, StorefrontError> {
    let account =
        accounts::fetch_user_account(account_id, conn).await?.ok_or(StorefrontError::AccountNotFound(account_id))?;
    warn!("🗃️ Crediting {amount} to account #{account_id} would overflow its balance of {}", account.points);
    Ok(StorefrontError::TransactionError(format!(
        "Crediting {amount} to account #{account_id} would overflow its balance"
    )))
}

impl SqliteDatabase {
    /// Creates a new database API object, using `SF_DATABASE_URL` or the default URL.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies the embedded schema migrations. Already-applied migrations are skipped.
    pub async fn run_migrations(&self) -> Result<(), StorefrontError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorefrontError::TransactionError(format!("Migrations failed. {e}")))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Creates a user account. Accounts are normally created by the registration service; this is for seeding and
    /// tests.
    pub async fn create_account(&self, email: &str, role: Role, points: Points) -> Result<UserAccount, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let account = accounts::insert_user_account(email, role, points, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Account #{} created for {email}", account.id);
        Ok(account)
    }

    /// Adds a product to the catalog. Catalog management is normally done elsewhere; this is for seeding and tests.
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    pub async fn soft_delete_product(&self, product_id: i64) -> Result<bool, StorefrontError> {
        let mut tx = self.pool.begin().await?;
        let deleted = products::soft_delete_product(product_id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}
