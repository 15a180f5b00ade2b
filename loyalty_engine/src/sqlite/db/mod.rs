//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interactions are simple functions (rather than stateful structs) that accept a `&mut SqliteConnection`
//! argument. Callers can obtain a connection from a pool, or open a transaction and pass `&mut tx` through to the
//! functions without any other changes.
//!
//! Every mutation here is written "write first": the guard condition lives in the `WHERE` clause of the `UPDATE` (or
//! in a `UNIQUE` constraint), so SQLite takes the write lock before any decision is made.
use std::{str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod balances;
pub mod orders;
pub mod withdrawals;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(10));
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    info!("🗃️ Opened database {url} with up to {max_connections} connections");
    Ok(pool)
}
