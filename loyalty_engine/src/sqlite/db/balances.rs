use chrono::Utc;
use log::debug;
use loyalty_common::Points;
use sqlx::SqliteConnection;

use crate::db_types::Balance;

pub async fn fetch_balance(owner: &str, conn: &mut SqliteConnection) -> Result<Option<Balance>, sqlx::Error> {
    let balance = sqlx::query_as("SELECT owner, accrued, withdrawn FROM balances WHERE owner = $1")
        .bind(owner)
        .fetch_optional(conn)
        .await?;
    Ok(balance)
}

/// Adds `amount` to the accrued total of `owner`, creating the balance row if this is their first credit.
pub async fn credit(owner: &str, amount: Points, conn: &mut SqliteConnection) -> Result<Balance, sqlx::Error> {
    let balance: Balance = sqlx::query_as(
        r#"
            INSERT INTO balances (owner, accrued, withdrawn, updated_at) VALUES ($1, $2, 0, $3)
            ON CONFLICT (owner) DO UPDATE SET
                accrued = accrued + excluded.accrued,
                updated_at = excluded.updated_at
            RETURNING owner, accrued, withdrawn;
        "#,
    )
    .bind(owner)
    .bind(amount)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("💸️ Credited {amount} to {owner}. Available balance is now {}", balance.available());
    Ok(balance)
}

/// Adds `amount` to the withdrawn total of `owner` if, and only if, their available balance covers it.
///
/// The funds check is part of the `UPDATE` itself, so concurrent debits cannot both pass it against the same funds.
/// Returns the new balance, or `None` if the owner could not afford the debit (in which case nothing changed).
pub async fn try_debit(owner: &str, amount: Points, conn: &mut SqliteConnection) -> Result<Option<Balance>, sqlx::Error> {
    let balance: Option<Balance> = sqlx::query_as(
        r#"
            UPDATE balances SET
                withdrawn = withdrawn + $1,
                updated_at = $2
            WHERE owner = $3 AND accrued - withdrawn >= $4
            RETURNING owner, accrued, withdrawn;
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(owner)
    .bind(amount)
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}
