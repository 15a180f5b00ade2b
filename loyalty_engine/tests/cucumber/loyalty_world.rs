use cucumber::World;
use log::*;
use loyalty_engine::{
    db_types::Withdrawal,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    BalanceApi,
    BalanceApiError,
    OrderFlowApi,
    OrderFlowError,
    SettlementApi,
    SqliteDatabase,
    SubmitOrderOutcome,
};

#[derive(Default, Debug, World)]
pub struct LoyaltyWorld {
    pub system: Option<LoyaltySystem>,
    pub last_submission: Option<Result<SubmitOrderOutcome, OrderFlowError>>,
    pub last_withdrawal: Option<Result<Withdrawal, BalanceApiError>>,
}

#[derive(Debug)]
pub struct LoyaltySystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub settlement: SettlementApi<SqliteDatabase>,
    pub balances: BalanceApi<SqliteDatabase>,
}

impl LoyaltyWorld {
    pub fn system(&self) -> &LoyaltySystem {
        self.system.as_ref().expect("Loyalty system not initialised")
    }
}

impl LoyaltySystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        debug!("Created database: {url}");
        Self {
            db_path: url,
            orders: OrderFlowApi::new(db.clone()),
            settlement: SettlementApi::new(db.clone()),
            balances: BalanceApi::new(db.clone()),
            db,
        }
    }
}
