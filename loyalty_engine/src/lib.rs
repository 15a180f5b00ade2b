//! Loyalty Engine
//!
//! The loyalty engine tracks the purchase orders that users submit, settles each of them against an external accrual
//! authority, and maintains every user's points balance. It is transport-agnostic: the HTTP surface and the accrual
//! client live in their own crates.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`mod@traits`] and the SQLite backend). You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The exception is the data types used in the database. These
//!    are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@engine_api`]). This provides the order flow, settlement and balance operations.
//!    Backends need to implement the traits in [`mod@traits`] in order to be used by the APIs.
//!
//! Points are always fixed-point amounts ([`loyalty_common::Points`]); no floating point arithmetic ever touches a
//! balance.
pub mod db_types;
pub mod helpers;
pub mod traits;

mod engine_api;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use engine_api::{
    balance_api::BalanceApi,
    errors::{BalanceApiError, OrderFlowError},
    order_flow_api::{OrderFlowApi, SubmitOrderOutcome},
    settlement_api::SettlementApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use traits::{
    LedgerError,
    LedgerManagement,
    OrderManagement,
    OrderStoreError,
    SettlementDatabase,
    SettlementError,
};
