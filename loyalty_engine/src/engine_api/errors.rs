use loyalty_common::Points;
use thiserror::Error;

use crate::{
    db_types::OrderNumber,
    helpers::OrderNumberError,
    traits::{LedgerError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("{0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Order {0} has already been submitted by another user")]
    OwnedByOtherUser(OrderNumber),
    #[error("{0}")]
    StoreError(#[from] OrderStoreError),
}

#[derive(Debug, Clone, Error)]
pub enum BalanceApiError {
    #[error("{0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Withdrawal amounts must be positive. Got {0}")]
    NonPositiveSum(Points),
    #[error("Insufficient funds to withdraw {0}")]
    InsufficientFunds(Points),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<LedgerError> for BalanceApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::DatabaseError(s) => BalanceApiError::DatabaseError(s),
            LedgerError::InsufficientFunds { requested, .. } => BalanceApiError::InsufficientFunds(requested),
            LedgerError::NonPositiveAmount(p) => BalanceApiError::NonPositiveSum(p),
        }
    }
}
