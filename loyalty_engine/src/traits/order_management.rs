use loyalty_common::Points;
use thiserror::Error;

use crate::db_types::{
    Order,
    OrderNumber,
    OrderStatusType,
    PendingOrder,
    RegisterOrderResult,
    StatusTransitionError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("{0}")]
    IllegalTransition(#[from] StatusTransitionError),
    #[error("Order {0} cannot be marked as processed without an accrual")]
    MissingAccrual(OrderNumber),
    #[error("Order {number} cannot carry an accrual in {status} status")]
    UnexpectedAccrual { number: OrderNumber, status: OrderStatusType },
    #[error("Accruals cannot be negative. Got {0}")]
    NegativeAccrual(Points),
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait is the durable record of which user owns which order number, and where each order is
/// in the settlement lifecycle.
///
/// Ownership of an order number is first-writer-wins. Implementations must guarantee that when several users race to
/// register the same number, exactly one of them is recorded as the owner.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Registers `number` for `owner` in `NEW` status if nobody has registered it yet.
    ///
    /// If the number is already known, nothing is changed and the result tells the caller whether the existing record
    /// belongs to `owner` or to somebody else.
    async fn register_order_if_new(
        &self,
        number: &OrderNumber,
        owner: &str,
    ) -> Result<RegisterOrderResult, OrderStoreError>;

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;

    /// All orders belonging to `owner`, oldest submission first.
    async fn fetch_orders_for_owner(&self, owner: &str) -> Result<Vec<Order>, OrderStoreError>;

    /// Every order in `NEW` or `PROCESSING` status, in registration order.
    async fn fetch_pending_orders(&self) -> Result<Vec<PendingOrder>, OrderStoreError>;

    /// Moves the order to `status`, storing `accrual` alongside it.
    ///
    /// An accrual must be supplied for `PROCESSED` and must be absent for every other status. Illegal transitions
    /// (including any transition out of a terminal state) are rejected and leave the record untouched.
    ///
    /// This method does **not** credit the owner. Use [`crate::traits::SettlementDatabase::settle_order`] to process an
    /// order and credit its accrual atomically.
    async fn apply_result(
        &self,
        number: &OrderNumber,
        status: OrderStatusType,
        accrual: Option<Points>,
    ) -> Result<Order, OrderStoreError>;
}
