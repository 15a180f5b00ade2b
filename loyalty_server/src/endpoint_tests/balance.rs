use actix_web::{
    http::{header::ContentType, StatusCode},
    web,
    web::ServiceConfig,
};
use loyalty_common::Points;
use loyalty_engine::{
    db_types::{Balance, NewWithdrawal, OrderNumber, Withdrawal},
    BalanceApi,
    LedgerError,
};
use mockall::predicate::eq;

use super::{
    helpers::{get_request, issue_token, post_request, timestamp, Auth},
    mocks::MockLedger,
};
use crate::routes::{MyBalanceRoute, MyWithdrawalsRoute, WithdrawRoute};

fn configure_with(ledger: MockLedger) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(MyBalanceRoute::<MockLedger>::new())
            .service(WithdrawRoute::<MockLedger>::new())
            .service(MyWithdrawalsRoute::<MockLedger>::new())
            .app_data(web::Data::new(BalanceApi::new(ledger)));
    }
}

fn withdrawal(id: i64, order: &str, sum: Points) -> Withdrawal {
    Withdrawal {
        id,
        owner: "alice".into(),
        order_number: OrderNumber::parse(order).unwrap(),
        sum,
        processed_at: timestamp(2024, 4, 1, 10, 0),
    }
}

async fn withdraw(body: &str, ledger: MockLedger) -> (StatusCode, String) {
    let token = issue_token("alice");
    post_request(Auth::Bearer(&token), "/balance/withdraw", body, ContentType::json(), configure_with(ledger))
        .await
        .expect("Request failed")
}

#[actix_web::test]
async fn fetch_balance() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_balance().with(eq("alice")).returning(|_| {
        Ok(Balance { owner: "alice".into(), accrued: Points::from_whole(500), withdrawn: Points::from(30_050) })
    });
    let token = issue_token("alice");
    let (status, body) = get_request(Auth::Bearer(&token), "/balance", configure_with(ledger)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"accrued_available":199.5,"withdrawn_total":300.5}"#);
}

#[actix_web::test]
async fn fetch_balance_without_token() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(Auth::None, "/balance", configure_with(MockLedger::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn successful_withdrawal() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger
        .expect_debit()
        .withf(|w: &NewWithdrawal| {
            w.owner == "alice" && w.order_number.as_str() == "2377225624" && w.sum == Points::from_whole(300)
        })
        .times(1)
        .returning(|w| Ok(withdrawal(1, w.order_number.as_str(), w.sum)));
    let (status, body) = withdraw(r#"{"order":"2377225624","sum":300}"#, ledger).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"order":"2377225624","sum":300.0,"processed_at":"2024-04-01T10:00:00Z"}"#);
}

#[actix_web::test]
async fn fractional_withdrawal() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger
        .expect_debit()
        .withf(|w: &NewWithdrawal| w.sum == Points::from(75_125))
        .times(1)
        .returning(|w| Ok(withdrawal(1, w.order_number.as_str(), w.sum)));
    let (status, _) = withdraw(r#"{"order":"2377225624","sum":751.25}"#, ledger).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn withdrawal_with_insufficient_funds() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_debit().times(1).returning(|w| {
        Err(LedgerError::InsufficientFunds { owner: w.owner.clone(), requested: w.sum })
    });
    let (status, body) = withdraw(r#"{"order":"2377225624","sum":1000}"#, ledger).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body.contains("Insufficient funds"), "was: {body}");
}

#[actix_web::test]
async fn withdrawal_for_invalid_order_numbers() {
    let _ = env_logger::try_init().ok();
    for order in ["2377225625", "23772-25624", ""] {
        // The ledger must not be touched
        let body = format!(r#"{{"order":"{order}","sum":10}}"#);
        let (status, _) = withdraw(&body, MockLedger::new()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "order: {order:?}");
    }
}

#[actix_web::test]
async fn malformed_withdrawal_requests() {
    let _ = env_logger::try_init().ok();
    for body in [
        r#"{"order":2377225624,"sum":10}"#,
        r#"{"order":"2377225624"}"#,
        r#"{"order":"2377225624","sum":"ten"}"#,
        r#"{"order":"2377225624","sum":0}"#,
        r#"{"order":"2377225624","sum":-5}"#,
        "not json",
    ] {
        let (status, _) = withdraw(body, MockLedger::new()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[actix_web::test]
async fn withdrawal_history() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_withdrawals().with(eq("alice")).returning(|_| {
        Ok(vec![withdrawal(1, "2377225624", Points::from_whole(300)), withdrawal(2, "12345678903", Points::from(1_050))])
    });
    let token = issue_token("alice");
    let (status, body) = get_request(Auth::Bearer(&token), "/withdrawals", configure_with(ledger)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"order":"2377225624","sum":300.0,"processed_at":"2024-04-01T10:00:00Z"},{"order":"12345678903","sum":10.5,"processed_at":"2024-04-01T10:00:00Z"}]"#
    );
}

#[actix_web::test]
async fn empty_withdrawal_history() {
    let _ = env_logger::try_init().ok();
    let mut ledger = MockLedger::new();
    ledger.expect_fetch_withdrawals().returning(|_| Ok(vec![]));
    let token = issue_token("alice");
    let (status, _) = get_request(Auth::Bearer(&token), "/withdrawals", configure_with(ledger)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NO_CONTENT);
}
