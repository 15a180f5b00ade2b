use loyalty_common::Points;
use loyalty_engine::{
    db_types::{Balance, NewWithdrawal, Order, OrderNumber, OrderStatusType, PendingOrder, RegisterOrderResult, Withdrawal},
    LedgerError,
    LedgerManagement,
    OrderManagement,
    OrderStoreError,
};
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn register_order_if_new(&self, number: &OrderNumber, owner: &str) -> Result<RegisterOrderResult, OrderStoreError>;
        async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_orders_for_owner(&self, owner: &str) -> Result<Vec<Order>, OrderStoreError>;
        async fn fetch_pending_orders(&self) -> Result<Vec<PendingOrder>, OrderStoreError>;
        async fn apply_result(&self, number: &OrderNumber, status: OrderStatusType, accrual: Option<Points>) -> Result<Order, OrderStoreError>;
    }
}

mock! {
    pub Ledger {}
    impl LedgerManagement for Ledger {
        async fn fetch_balance(&self, owner: &str) -> Result<Balance, LedgerError>;
        async fn credit(&self, owner: &str, amount: Points) -> Result<Balance, LedgerError>;
        async fn debit(&self, withdrawal: NewWithdrawal) -> Result<Withdrawal, LedgerError>;
        async fn fetch_withdrawals(&self, owner: &str) -> Result<Vec<Withdrawal>, LedgerError>;
    }
}
