//! # Storage backends
//!
//! This module defines the contracts that a storage backend must honour in order to be used by the loyalty engine.
//!
//! ## Orders
//! An order is a purchase receipt number submitted by a user. Each number belongs to exactly one user for its whole
//! life, and moves through the status machine described on [`crate::db_types::OrderStatusType`].
//!
//! ## Balances
//! Every user has a points balance made up of two running totals: the points accrued from processed orders and the
//! points withdrawn to pay for new orders. The available balance is the difference between the two and may never go
//! negative.
//!
//! ## Traits
//! * [`OrderManagement`] registers orders and moves them through their statuses.
//! * [`LedgerManagement`] reads and mutates balances and keeps the withdrawal history.
//! * [`SettlementDatabase`] is the highest level of behaviour. It combines the two and adds the composite operation
//!   that settles an order and credits its owner in a single atomic step.
mod ledger_management;
mod order_management;
mod settlement_database;

pub use ledger_management::{LedgerError, LedgerManagement};
pub use order_management::{OrderManagement, OrderStoreError};
pub use settlement_database::{SettlementDatabase, SettlementError};
