//! Client for the external accrual authority.
//!
//! The authority is the system of record for how many points an order is worth. It is queried with
//! `GET <base>/api/orders/{number}` and may answer with a verdict, with "not known yet", or with a rate limit.
//!
//! * [`AccrualApi`] is the reqwest-backed client. All clones share one [`RateLimitGate`], so a 429 seen by any caller
//!   pauses every caller in the process until the cooldown expires.
//! * [`AccrualSource`] is the seam used by the reconciliation worker, so that the worker can be exercised without a
//!   network.
mod api;
mod config;
mod data_objects;
mod error;
mod rate_limit;

pub use api::{AccrualApi, AccrualSource};
pub use config::AccrualConfig;
pub use data_objects::{AccrualResponse, AccrualResult, AccrualStatus};
pub use error::AccrualApiError;
pub use rate_limit::{parse_retry_after, RateLimitGate};
