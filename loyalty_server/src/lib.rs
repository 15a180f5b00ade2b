//! # Loyalty points server
//! This crate hosts the HTTP front end and the background reconciliation worker of the loyalty points backend. It is
//! responsible for:
//! * Accepting purchase order numbers from logged-in users and registering them for settlement.
//! * Polling the external accrual system for every pending order and crediting the awarded points.
//! * Reporting balances and letting users spend their points on new orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/user/orders`: Submit an order number (plain text body).
//! * `GET /api/user/orders`: The user's orders, oldest first.
//! * `GET /api/user/balance`: The user's available and withdrawn points.
//! * `POST /api/user/balance/withdraw`: Spend points on a new order.
//! * `GET /api/user/withdrawals`: The user's withdrawal history.
//!
//! All `/api/user` routes need a session token. See [auth](auth/index.html).

pub mod accrual_worker;
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
