use std::fmt::Debug;

use log::*;
use loyalty_common::Points;

use crate::{
    db_types::{Order, OrderNumber, OrderStatusType, PendingOrder, SettlementResult},
    traits::{OrderStoreError, SettlementDatabase, SettlementError},
};

/// `SettlementApi` applies the accrual authority's verdicts to pending orders.
///
/// Only [`Self::settle`] moves points. It is safe to call repeatedly for the same order: the first call credits the
/// accrual and every later call reports [`SettlementResult::AlreadySettled`].
pub struct SettlementApi<B> {
    db: B,
}

impl<B: Debug> Debug for SettlementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi ({:?})", self.db)
    }
}

impl<B: Clone> Clone for SettlementApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<B> SettlementApi<B>
where B: SettlementDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn pending_orders(&self) -> Result<Vec<PendingOrder>, OrderStoreError> {
        self.db.fetch_pending_orders().await
    }

    /// The authority knows about the order but has no verdict yet.
    pub async fn mark_processing(&self, number: &OrderNumber) -> Result<Order, OrderStoreError> {
        let order = self.db.apply_result(number, OrderStatusType::Processing, None).await?;
        trace!("🔄️ Order {number} is processing");
        Ok(order)
    }

    /// The authority rejected the order. No points will be awarded for it.
    pub async fn mark_invalid(&self, number: &OrderNumber) -> Result<Order, OrderStoreError> {
        let order = self.db.apply_result(number, OrderStatusType::Invalid, None).await?;
        info!("🔄️ Order {number} was rejected by the accrual system and is now INVALID");
        Ok(order)
    }

    /// Marks the order as processed and credits `accrual` to its owner, atomically and at most once.
    pub async fn settle(&self, number: &OrderNumber, accrual: Points) -> Result<SettlementResult, SettlementError> {
        let result = self.db.settle_order(number, accrual).await?;
        if let SettlementResult::Credited { order, balance } = &result {
            info!(
                "🔄️ Order {number} processed. {accrual} points credited to {}, whose available balance is {}",
                order.owner,
                balance.available()
            );
        }
        Ok(result)
    }
}
