use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewOrder, Order, OrderView};

/// Shared SELECT for order listings. Cancelled orders are hidden, and the newest orders come first.
const ORDER_VIEW_SELECT: &str = r#"
    SELECT
        o.id, o.account_id, a.email, o.product_id, p.name AS product, p.image,
        o.quantity, p.price, o.total, o.points, o.status, o.created_at
    FROM orders o
        JOIN user_accounts a ON a.id = o.account_id
        JOIN products p ON p.id = o.product_id
    WHERE o.status != 'cancelled'
"#;

/// Inserts a new `pending` order into the given batch. This is not atomic on its own; embed the call in a
/// transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    batch_id: i64,
    account_id: i64,
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (batch_id, account_id, product_id, quantity, total, points, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING *;
        "#,
    )
    .bind(batch_id)
    .bind(account_id)
    .bind(order.product_id)
    .bind(order.quantity)
    .bind(order.total)
    .bind(order.points)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} for product {} inserted into batch {batch_id}", order.id, order.product_id);
    Ok(order)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches the order only if it belongs to `account_id`.
pub async fn fetch_order_for_account(
    order_id: i64,
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND account_id = $2")
        .bind(order_id)
        .bind(account_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_orders_for_batch(batch_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders =
        sqlx::query_as("SELECT * FROM orders WHERE batch_id = $1 ORDER BY id").bind(batch_id).fetch_all(conn).await?;
    Ok(orders)
}

/// `pending → cancelled`, guarded on the current status and owner. Returns `None` if the order does not exist, is
/// owned by someone else, or is no longer `pending`.
pub async fn cancel_pending_order(
    order_id: i64,
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'cancelled', updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND account_id = $2 AND status = 'pending'
        RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(account_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// `pending → success` for every order of the batch that is still `pending`. Returns exactly the orders that moved.
pub async fn settle_pending_orders(batch_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> = sqlx::query_as(
        r#"
        UPDATE orders SET status = 'success', updated_at = CURRENT_TIMESTAMP
        WHERE batch_id = $1 AND status = 'pending'
        RETURNING *;
        "#,
    )
    .bind(batch_id)
    .fetch_all(conn)
    .await?;
    orders.sort_by_key(|o| o.id);
    Ok(orders)
}

pub async fn fetch_order_views_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderView>, sqlx::Error> {
    let query = format!("{ORDER_VIEW_SELECT} AND o.account_id = $1 ORDER BY o.created_at DESC, o.id DESC");
    let orders = sqlx::query_as(&query).bind(account_id).fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_all_order_views(conn: &mut SqliteConnection) -> Result<Vec<OrderView>, sqlx::Error> {
    let query = format!("{ORDER_VIEW_SELECT} ORDER BY o.created_at DESC, o.id DESC");
    let orders = sqlx::query_as(&query).fetch_all(conn).await?;
    Ok(orders)
}
