use sqlx::SqliteConnection;

use crate::db_types::{Points, Role, UserAccount};

pub async fn fetch_user_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<UserAccount>, sqlx::Error> {
    let account =
        sqlx::query_as("SELECT * FROM user_accounts WHERE id = $1").bind(account_id).fetch_optional(conn).await?;
    Ok(account)
}

/// Creates an account. Registration is handled by an external service in production; this is used for seeding.
pub async fn insert_user_account(
    email: &str,
    role: Role,
    points: Points,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, sqlx::Error> {
    let account = sqlx::query_as("INSERT INTO user_accounts (email, role, points) VALUES ($1, $2, $3) RETURNING *")
        .bind(email)
        .bind(role)
        .bind(points)
        .fetch_one(conn)
        .await?;
    Ok(account)
}

/// Bumps `updated_at` on the account. This is a write, so it is a cheap way to both check that the account exists and
/// take the write lock at the start of a transaction.
///
/// Returns `false` if no such account exists.
pub async fn touch_account(account_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE user_accounts SET updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(account_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Adds `amount` to the account balance in place.
///
/// Returns `false` if no such account exists, or if the new balance would not fit in an `i64`. SQLite would otherwise
/// silently store the result as a REAL.
pub async fn credit_points(account_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_accounts SET points = points + $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND points <= 9223372036854775807 - $1
        "#,
    )
    .bind(amount)
    .bind(account_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Subtracts `amount` from the account balance, but only if the balance covers it.
///
/// Returns `false` if the account does not exist or holds fewer than `amount` points. The balance is untouched in
/// that case.
pub async fn debit_points(account_id: i64, amount: Points, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_accounts SET points = points - $1, updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND points >= $1
        "#,
    )
    .bind(amount)
    .bind(account_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
