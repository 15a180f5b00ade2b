use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderNumber, RegisterOrderResult},
    engine_api::errors::OrderFlowError,
    traits::OrderManagement,
};

/// What happened when a user submitted an order number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOrderOutcome {
    /// The number was new and is now queued for settlement.
    Accepted(Order),
    /// The user had already submitted this number.
    AlreadySubmitted(Order),
}

/// `OrderFlowApi` is the entry point for order numbers submitted by users.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Validates the raw order number and registers it for `owner`.
    ///
    /// Submitting the same number twice is harmless for the user that owns it. A number that belongs to somebody
    /// else is rejected with [`OrderFlowError::OwnedByOtherUser`].
    pub async fn submit_order<R: AsRef<[u8]>>(&self, raw: R, owner: &str) -> Result<SubmitOrderOutcome, OrderFlowError> {
        let number = OrderNumber::parse(raw)?;
        match self.db.register_order_if_new(&number, owner).await? {
            RegisterOrderResult::Registered(order) => {
                info!("🔄️📦️ Order {number} accepted for {owner}");
                Ok(SubmitOrderOutcome::Accepted(order))
            },
            RegisterOrderResult::AlreadyOwnedBySameUser(order) => {
                debug!("🔄️📦️ {owner} re-submitted order {number}");
                Ok(SubmitOrderOutcome::AlreadySubmitted(order))
            },
            RegisterOrderResult::OwnedByOtherUser => {
                warn!("🔄️📦️ {owner} tried to submit order {number}, which belongs to another user");
                Err(OrderFlowError::OwnedByOtherUser(number))
            },
        }
    }

    /// All orders submitted by `owner`, oldest first.
    pub async fn orders_for_owner(&self, owner: &str) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_owner(owner).await?;
        trace!("🔄️📦️ {} orders found for {owner}", orders.len());
        Ok(orders)
    }
}
