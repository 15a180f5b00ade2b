//! `SqliteDatabase` is a concrete implementation of a loyalty engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use loyalty_common::Points;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{balances, new_pool, orders, withdrawals};
use crate::{
    db_types::{
        Balance,
        NewWithdrawal,
        Order,
        OrderNumber,
        OrderStatusType,
        PendingOrder,
        RegisterOrderResult,
        SettlementResult,
        StatusTransitionError,
        Withdrawal,
    },
    traits::{
        LedgerError,
        LedgerManagement,
        OrderManagement,
        OrderStoreError,
        SettlementDatabase,
        SettlementError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SettlementDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn settle_order(&self, number: &OrderNumber, accrual: Points) -> Result<SettlementResult, SettlementError> {
        if accrual.is_negative() {
            return Err(SettlementError::NegativeAccrual(accrual));
        }
        let mut tx = self.pool.begin().await?;
        let updated = orders::update_status_if_allowed(number, OrderStatusType::Processed, Some(accrual), &mut tx).await?;
        let result = match updated {
            Some(order) => {
                let balance = balances::credit(&order.owner, accrual, &mut tx).await?;
                SettlementResult::Credited { order, balance }
            },
            None => match orders::fetch_order_by_number(number, &mut tx).await? {
                Some(order) => SettlementResult::AlreadySettled(order),
                None => return Err(SettlementError::OrderNotFound(number.clone())),
            },
        };
        tx.commit().await?;
        match &result {
            SettlementResult::Credited { order, .. } => {
                info!("🗃️ Order {} settled. {accrual} credited to {}", order.number, order.owner)
            },
            SettlementResult::AlreadySettled(order) => {
                debug!("🗃️ Order {} is already {}. No credit applied", order.number, order.status)
            },
        }
        Ok(result)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn register_order_if_new(
        &self,
        number: &OrderNumber,
        owner: &str,
    ) -> Result<RegisterOrderResult, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        if let Some(order) = orders::insert_if_new(number, owner, &mut conn).await? {
            return Ok(RegisterOrderResult::Registered(order));
        }
        // The number is taken. Rows are never deleted, so the existing record must be there.
        let existing = orders::fetch_order_by_number(number, &mut conn)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(number.clone()))?;
        if existing.owner == owner {
            Ok(RegisterOrderResult::AlreadyOwnedBySameUser(existing))
        } else {
            Ok(RegisterOrderResult::OwnedByOtherUser)
        }
    }

    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_owner(&self, owner: &str) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_owner(owner, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_pending_orders(&self) -> Result<Vec<PendingOrder>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_pending_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn apply_result(
        &self,
        number: &OrderNumber,
        status: OrderStatusType,
        accrual: Option<Points>,
    ) -> Result<Order, OrderStoreError> {
        match (status, accrual) {
            (OrderStatusType::Processed, None) => return Err(OrderStoreError::MissingAccrual(number.clone())),
            (OrderStatusType::Processed, Some(a)) if a.is_negative() => return Err(OrderStoreError::NegativeAccrual(a)),
            (OrderStatusType::Processed, Some(_)) => {},
            (status, Some(_)) => return Err(OrderStoreError::UnexpectedAccrual { number: number.clone(), status }),
            (_, None) => {},
        }
        let mut tx = self.pool.begin().await?;
        let updated = orders::update_status_if_allowed(number, status, accrual, &mut tx).await?;
        let order = match updated {
            Some(order) => order,
            None => {
                let existing = orders::fetch_order_by_number(number, &mut tx).await?;
                let err = match existing {
                    Some(o) => OrderStoreError::IllegalTransition(StatusTransitionError { from: o.status, to: status }),
                    None => OrderStoreError::OrderNotFound(number.clone()),
                };
                return Err(err);
            },
        };
        tx.commit().await?;
        Ok(order)
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn fetch_balance(&self, owner: &str) -> Result<Balance, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let balance = balances::fetch_balance(owner, &mut conn).await?.unwrap_or_else(|| Balance::empty(owner));
        Ok(balance)
    }

    async fn credit(&self, owner: &str, amount: Points) -> Result<Balance, LedgerError> {
        if amount.is_negative() {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        let mut conn = self.pool.acquire().await?;
        let balance = balances::credit(owner, amount, &mut conn).await?;
        Ok(balance)
    }

    async fn debit(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError> {
        if !withdrawal.sum.is_positive() {
            return Err(LedgerError::NonPositiveAmount(withdrawal.sum));
        }
        let mut tx = self.pool.begin().await?;
        let owner = withdrawal.owner.clone();
        let requested = withdrawal.sum;
        match balances::try_debit(&owner, requested, &mut tx).await? {
            Some(balance) => {
                let record = withdrawals::insert_withdrawal(withdrawal, &mut tx).await?;
                tx.commit().await?;
                info!(
                    "🗃️ {owner} withdrew {requested} for order {}. Available balance is now {}",
                    record.order_number,
                    balance.available()
                );
                Ok(record)
            },
            None => {
                tx.rollback().await?;
                debug!("🗃️ {owner} cannot afford a withdrawal of {requested}");
                Err(LedgerError::InsufficientFunds { owner, requested })
            },
        }
    }

    async fn fetch_withdrawals(&self, owner: &str) -> Result<Vec<Withdrawal>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let history = withdrawals::fetch_withdrawals_for_owner(owner, &mut conn).await?;
        Ok(history)
    }
}

impl SqliteDatabase {
    /// Opens a connection pool to the database at `url`. The database file is created if it does not exist.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. This is safe to call on every startup.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
