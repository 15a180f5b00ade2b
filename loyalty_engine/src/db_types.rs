use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use loyalty_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::{validate_order_number, OrderNumberError};

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// A normalized, Luhn-valid purchase order number.
///
/// The only way to construct an `OrderNumber` from user input is via [`OrderNumber::parse`] (or `FromStr`), which
/// runs the validator, so holding one is proof that the number is well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize)]
#[sqlx(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn parse<B: AsRef<[u8]>>(raw: B) -> Result<Self, OrderNumberError> {
        validate_order_number(raw.as_ref()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for OrderNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The settlement state of an order.
///
/// ```text
///   NEW ──► PROCESSING ──► PROCESSED
///    │          │  ▲ │
///    │          └──┘ └───► INVALID
///    └──────────────────►  (NEW may also jump straight to either terminal state)
/// ```
/// `INVALID` and `PROCESSED` are sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been registered, but the accrual authority has not been consulted yet.
    New,
    /// The accrual authority knows about the order, but has not reached a verdict.
    Processing,
    /// The accrual authority rejected the order. No points will be awarded.
    Invalid,
    /// The accrual has been calculated and credited to the owner's balance.
    Processed,
}

impl OrderStatusType {
    /// Returns the status that results from moving to `next`, or an error if the transition is illegal.
    ///
    /// `PROCESSING -> PROCESSING` is allowed (the order was re-checked and is still in progress), but nothing may
    /// leave a terminal state and nothing may return to `NEW`.
    pub fn transition(self, next: OrderStatusType) -> Result<OrderStatusType, StatusTransitionError> {
        use OrderStatusType::*;
        match (self, next) {
            (New | Processing, Processing | Invalid | Processed) => Ok(next),
            (from, to) => Err(StatusTransitionError { from, to }),
        }
    }

    /// Every status from which `target` can legally be reached.
    pub fn allowed_sources(target: OrderStatusType) -> Vec<OrderStatusType> {
        Self::ALL.into_iter().filter(|s| s.transition(target).is_ok()).collect()
    }

    pub const ALL: [OrderStatusType; 4] = [Self::New, Self::Processing, Self::Invalid, Self::Processed];
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Illegal order status transition from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: OrderStatusType,
    pub to: OrderStatusType,
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub number: OrderNumber,
    pub owner: String,
    pub status: OrderStatusType,
    /// Only ever set when `status` is `PROCESSED`.
    pub accrual: Option<Points>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order that is waiting on the accrual authority.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PendingOrder {
    pub number: OrderNumber,
    pub owner: String,
    pub status: OrderStatusType,
}

/// The outcome of trying to register an order number for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOrderResult {
    /// A fresh record was created in `NEW` status.
    Registered(Order),
    /// The same user had already submitted this number. Nothing was changed.
    AlreadyOwnedBySameUser(Order),
    /// Somebody else owns this number. Nothing was changed.
    OwnedByOtherUser,
}

//--------------------------------------        Balance       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Balance {
    pub owner: String,
    pub accrued: Points,
    pub withdrawn: Points,
}

impl Balance {
    pub fn empty<S: Into<String>>(owner: S) -> Self {
        Self { owner: owner.into(), accrued: Points::zero(), withdrawn: Points::zero() }
    }

    pub fn available(&self) -> Points {
        self.accrued - self.withdrawn
    }
}

//--------------------------------------      Withdrawal      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Withdrawal {
    pub id: i64,
    pub owner: String,
    pub order_number: OrderNumber,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub owner: String,
    /// The order being paid for with points
    pub order_number: OrderNumber,
    pub sum: Points,
}

impl NewWithdrawal {
    pub fn new<S: Into<String>>(owner: S, order_number: OrderNumber, sum: Points) -> Self {
        Self { owner: owner.into(), order_number, sum }
    }
}

//--------------------------------------    SettlementResult   ---------------------------------------------------------
/// The effect of applying a terminal accrual verdict to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementResult {
    /// The order moved to `PROCESSED` and the accrual was credited to the owner in the same transaction.
    Credited { order: Order, balance: Balance },
    /// The order was already in a terminal state. No credit was applied.
    AlreadySettled(Order),
}
