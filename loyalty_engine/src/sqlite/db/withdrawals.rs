use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewWithdrawal, Withdrawal};

/// Appends a withdrawal to the history. This does not touch the balance; see [`super::balances::try_debit`].
pub async fn insert_withdrawal(
    withdrawal: NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, sqlx::Error> {
    let withdrawal = sqlx::query_as(
        r#"
            INSERT INTO withdrawals (owner, order_number, sum, processed_at) VALUES ($1, $2, $3, $4)
            RETURNING id, owner, order_number, sum, processed_at;
        "#,
    )
    .bind(withdrawal.owner)
    .bind(withdrawal.order_number.as_str())
    .bind(withdrawal.sum)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(withdrawal)
}

pub async fn fetch_withdrawals_for_owner(
    owner: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals = sqlx::query_as(
        r#"
            SELECT id, owner, order_number, sum, processed_at FROM withdrawals
            WHERE owner = $1
            ORDER BY processed_at ASC, id ASC
        "#,
    )
    .bind(owner)
    .fetch_all(conn)
    .await?;
    Ok(withdrawals)
}
