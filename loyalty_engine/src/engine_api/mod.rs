//! # Loyalty engine public API
//!
//! The `engine_api` module exposes the programmatic API for the loyalty engine. The API is modular, so that clients
//! can pick the functionality they need and supply only the backend traits that functionality requires.
//!
//! * [`order_flow_api`] validates and registers order numbers submitted by users, and lists their orders.
//! * [`settlement_api`] applies the accrual authority's verdicts to orders, crediting points exactly once.
//! * [`balance_api`] reports balances and withdrawal histories, and debits points for new purchases.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits required by the
//! API.
//!
//! ```rust,ignore
//! use loyalty_engine::{BalanceApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/loyalty.db", 5).await?;
//! // SqliteDatabase implements LedgerManagement
//! let api = BalanceApi::new(db);
//! let balance = api.balance("alice").await?;
//! ```
pub mod balance_api;
pub mod errors;
pub mod order_flow_api;
pub mod settlement_api;
