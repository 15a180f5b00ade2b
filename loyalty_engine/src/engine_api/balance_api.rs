use std::fmt::Debug;

use log::*;
use loyalty_common::Points;

use crate::{
    db_types::{Balance, NewWithdrawal, OrderNumber, Withdrawal},
    engine_api::errors::BalanceApiError,
    traits::LedgerManagement,
};

/// `BalanceApi` reports user balances and lets users spend their points.
pub struct BalanceApi<B> {
    db: B,
}

impl<B: Debug> Debug for BalanceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BalanceApi ({:?})", self.db)
    }
}

impl<B> BalanceApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn balance(&self, owner: &str) -> Result<Balance, BalanceApiError> {
        Ok(self.db.fetch_balance(owner).await?)
    }

    /// Spends `sum` points from the balance of `owner` against the (new) order `raw_order`.
    ///
    /// The order number is checked before the ledger is touched. It does not need to have been submitted as an
    /// accrual order.
    pub async fn withdraw(&self, owner: &str, raw_order: &str, sum: Points) -> Result<Withdrawal, BalanceApiError> {
        let order_number = OrderNumber::parse(raw_order)?;
        if !sum.is_positive() {
            return Err(BalanceApiError::NonPositiveSum(sum));
        }
        let withdrawal = self.db.debit(NewWithdrawal::new(owner, order_number, sum)).await;
        match &withdrawal {
            Ok(w) => debug!("💸️ {owner} spent {} on order {}", w.sum, w.order_number),
            Err(e) => debug!("💸️ Withdrawal of {sum} by {owner} was refused. {e}"),
        }
        Ok(withdrawal?)
    }

    /// The withdrawal history for `owner`, oldest first.
    pub async fn withdrawals(&self, owner: &str) -> Result<Vec<Withdrawal>, BalanceApiError> {
        Ok(self.db.fetch_withdrawals(owner).await?)
    }
}
