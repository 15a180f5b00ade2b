use loyalty_common::Points;
use thiserror::Error;

use crate::db_types::{Balance, NewWithdrawal, Withdrawal};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Insufficient funds. {owner} tried to withdraw {requested}")]
    InsufficientFunds { owner: String, requested: Points },
    #[error("Ledger amounts must be positive. Got {0}")]
    NonPositiveAmount(Points),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// The `LedgerManagement` trait maintains each user's points balance and their withdrawal history.
///
/// The balance invariant `withdrawn <= accrued` must hold at all times, including while any number of debits for the
/// same user are in flight. Implementations must make the funds check and the mutation a single atomic step.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Returns the balance for `owner`. Users that have never been credited have an all-zero balance.
    async fn fetch_balance(&self, owner: &str) -> Result<Balance, LedgerError>;

    /// Adds `amount` to the accrued total for `owner`, creating the balance record if necessary.
    async fn credit(&self, owner: &str, amount: Points) -> Result<Balance, LedgerError>;

    /// Atomically checks that the owner can afford the withdrawal, adds it to their withdrawn total and appends it to
    /// their history. On [`LedgerError::InsufficientFunds`] nothing is changed.
    async fn debit(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError>;

    /// The withdrawal history for `owner`, oldest first.
    async fn fetch_withdrawals(&self, owner: &str) -> Result<Vec<Withdrawal>, LedgerError>;
}
