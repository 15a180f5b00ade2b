use std::fmt::Display;

use chrono::{DateTime, Utc};
use loyalty_common::Points;
use loyalty_engine::db_types::{Balance, Order, OrderStatusType, Withdrawal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

/// An order as presented to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub number: String,
    pub status: OrderStatusType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
    pub submitted_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            number: order.number.as_str().to_string(),
            status: order.status,
            accrual: order.accrual,
            submitted_at: order.submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    /// What the user can spend right now
    pub accrued_available: Points,
    pub withdrawn_total: Points,
}

impl From<Balance> for BalanceView {
    fn from(balance: Balance) -> Self {
        Self { accrued_available: balance.available(), withdrawn_total: balance.withdrawn }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// The new order being paid for with points
    pub order: String,
    pub sum: Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalView {
    pub order: String,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        Self { order: w.order_number.as_str().to_string(), sum: w.sum, processed_at: w.processed_at }
    }
}
