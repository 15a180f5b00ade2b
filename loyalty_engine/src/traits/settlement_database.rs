use loyalty_common::Points;
use thiserror::Error;

use crate::{
    db_types::{OrderNumber, SettlementResult},
    traits::{LedgerManagement, OrderManagement},
};

#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Accruals cannot be negative. Got {0}")]
    NegativeAccrual(Points),
}

impl From<sqlx::Error> for SettlementError {
    fn from(e: sqlx::Error) -> Self {
        SettlementError::DatabaseError(e.to_string())
    }
}

/// The highest level of behaviour for loyalty engine backends.
///
/// Besides the order and ledger contracts, a backend must be able to settle an order: flip it to `PROCESSED` and
/// credit its accrual to the owner as one atomic unit. Doing the two steps separately would allow a crash (or a
/// concurrent settlement of the same order) to credit an accrual twice, or not at all.
#[allow(async_fn_in_trait)]
pub trait SettlementDatabase: Clone + OrderManagement + LedgerManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// In a single atomic transaction,
    /// * moves the order from `NEW` or `PROCESSING` to `PROCESSED`, recording `accrual`,
    /// * adds `accrual` to the owner's accrued total.
    ///
    /// If the order is already terminal, nothing changes and [`SettlementResult::AlreadySettled`] is returned. This
    /// makes settlement idempotent: the accrual for any order is credited at most once.
    async fn settle_order(&self, number: &OrderNumber, accrual: Points) -> Result<SettlementResult, SettlementError>;
}
