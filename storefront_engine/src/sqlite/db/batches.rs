use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::db_types::{OrderBatch, Points};

pub async fn insert_batch(
    account_id: i64,
    total_points: Points,
    due_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<OrderBatch, sqlx::Error> {
    let batch = sqlx::query_as(
        r#"
            INSERT INTO order_batches (account_id, total_points, status, due_at)
            VALUES ($1, $2, 'scheduled', $3)
            RETURNING *;
        "#,
    )
    .bind(account_id)
    .bind(total_points)
    .bind(due_at.timestamp())
    .fetch_one(conn)
    .await?;
    Ok(batch)
}

pub async fn fetch_batch(batch_id: i64, conn: &mut SqliteConnection) -> Result<Option<OrderBatch>, sqlx::Error> {
    let batch =
        sqlx::query_as("SELECT * FROM order_batches WHERE id = $1").bind(batch_id).fetch_optional(conn).await?;
    Ok(batch)
}

pub async fn fetch_due_batches(
    now: DateTime<Utc>,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderBatch>, sqlx::Error> {
    let batches = sqlx::query_as(
        r#"
        SELECT * FROM order_batches
        WHERE status = 'scheduled' AND due_at <= $1
        ORDER BY due_at, id
        LIMIT $2
        "#,
    )
    .bind(now.timestamp())
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(batches)
}

/// Compare-and-swap entry point for settlement. Counts the attempt, but only if the batch is still `scheduled`.
///
/// Returns `None` when the batch is missing or has already reached a terminal status.
pub async fn claim_batch(batch_id: i64, conn: &mut SqliteConnection) -> Result<Option<OrderBatch>, sqlx::Error> {
    let batch = sqlx::query_as(
        r#"
        UPDATE order_batches SET attempts = attempts + 1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND status = 'scheduled'
        RETURNING *;
        "#,
    )
    .bind(batch_id)
    .fetch_optional(conn)
    .await?;
    Ok(batch)
}

pub async fn mark_settled(
    batch_id: i64,
    credited: Points,
    conn: &mut SqliteConnection,
) -> Result<OrderBatch, sqlx::Error> {
    let batch = sqlx::query_as(
        r#"
        UPDATE order_batches
        SET status = 'settled', credited_points = $1, last_error = NULL, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2
        RETURNING *;
        "#,
    )
    .bind(credited)
    .bind(batch_id)
    .fetch_one(conn)
    .await?;
    Ok(batch)
}

pub async fn mark_void(batch_id: i64, conn: &mut SqliteConnection) -> Result<OrderBatch, sqlx::Error> {
    let batch = sqlx::query_as(
        r#"
        UPDATE order_batches SET status = 'void', last_error = NULL, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(batch_id)
    .fetch_one(conn)
    .await?;
    Ok(batch)
}

/// Records a failed attempt on a `scheduled` batch. The right-hand sides below all see the row as it was before the
/// update, so `attempts + 1` is the number of the attempt that just failed.
pub async fn record_failure(
    batch_id: i64,
    reason: &str,
    max_attempts: i64,
    retry_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderBatch>, sqlx::Error> {
    let batch = sqlx::query_as(
        r#"
        UPDATE order_batches
        SET attempts = attempts + 1,
            last_error = $1,
            due_at = $2,
            status = CASE WHEN attempts + 1 >= $3 THEN 'failed' ELSE 'scheduled' END,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $4 AND status = 'scheduled'
        RETURNING *;
        "#,
    )
    .bind(reason)
    .bind(retry_at.timestamp())
    .bind(max_attempts)
    .bind(batch_id)
    .fetch_optional(conn)
    .await?;
    Ok(batch)
}
