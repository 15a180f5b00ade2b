use actix_web::{
    http::{header::ContentType, StatusCode},
    web,
    web::ServiceConfig,
};
use loyalty_common::Points;
use loyalty_engine::{
    db_types::{Order, OrderNumber, OrderStatusType, RegisterOrderResult},
    OrderFlowApi,
};
use mockall::predicate::eq;

use super::{
    helpers::{get_request, issue_token, post_request, timestamp, Auth},
    mocks::MockOrderManager,
};
use crate::routes::{MyOrdersRoute, SubmitOrderRoute};

fn order(number: &str, owner: &str) -> Order {
    Order {
        id: 1,
        number: OrderNumber::parse(number).unwrap(),
        owner: owner.to_string(),
        status: OrderStatusType::New,
        accrual: None,
        submitted_at: timestamp(2024, 2, 29, 13, 30),
        updated_at: timestamp(2024, 2, 29, 13, 30),
    }
}

fn configure_with(manager: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(SubmitOrderRoute::<MockOrderManager>::new())
            .service(MyOrdersRoute::<MockOrderManager>::new())
            .app_data(web::Data::new(OrderFlowApi::new(manager)));
    }
}

fn register_returns(result: RegisterOrderResult) -> MockOrderManager {
    let mut manager = MockOrderManager::new();
    manager
        .expect_register_order_if_new()
        .with(eq(OrderNumber::parse("12345678903").unwrap()), eq("alice"))
        .times(1)
        .return_once(move |_, _| Ok(result));
    manager
}

async fn submit(body: &str, manager: MockOrderManager) -> (StatusCode, String) {
    let token = issue_token("alice");
    post_request(Auth::Bearer(&token), "/orders", body, ContentType::plaintext(), configure_with(manager))
        .await
        .expect("Request failed")
}

#[actix_web::test]
async fn submit_order_without_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(Auth::None, "/orders", "12345678903", ContentType::plaintext(), configure_with(MockOrderManager::new()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No session token was found in the request"), "was: {body}");
}

#[actix_web::test]
async fn submit_new_order() {
    let _ = env_logger::try_init().ok();
    let manager = register_returns(RegisterOrderResult::Registered(order("12345678903", "alice")));
    let (status, body) = submit("12345678903", manager).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, r#"{"success":true,"message":"Order 12345678903 accepted"}"#);
}

#[actix_web::test]
async fn surrounding_whitespace_is_ignored() {
    let _ = env_logger::try_init().ok();
    let manager = register_returns(RegisterOrderResult::Registered(order("12345678903", "alice")));
    let (status, _) = submit("  12345678903\n", manager).await;
    assert_eq!(status, StatusCode::ACCEPTED);
}

#[actix_web::test]
async fn resubmit_own_order() {
    let _ = env_logger::try_init().ok();
    let manager = register_returns(RegisterOrderResult::AlreadyOwnedBySameUser(order("12345678903", "alice")));
    let (status, body) = submit("12345678903", manager).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order 12345678903 was already submitted"}"#);
}

#[actix_web::test]
async fn submit_another_users_order() {
    let _ = env_logger::try_init().ok();
    let manager = register_returns(RegisterOrderResult::OwnedByOtherUser);
    let (status, body) = submit("12345678903", manager).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"This order number has already been submitted by another user."}"#);
}

#[actix_web::test]
async fn malformed_order_numbers_are_bad_requests() {
    let _ = env_logger::try_init().ok();
    for body in ["", "12-34", "order 18", "  "] {
        // The store must not be touched
        let (status, _) = submit(body, MockOrderManager::new()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body:?}");
    }
}

#[actix_web::test]
async fn bad_checksum_is_unprocessable() {
    let _ = env_logger::try_init().ok();
    let (status, body) = submit("12345678901", MockOrderManager::new()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("Invalid order number"), "was: {body}");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_owner().with(eq("alice")).returning(|_| Ok(orders_response()));
    let token = issue_token("alice");
    let (status, body) = get_request(Auth::Bearer(&token), "/orders", configure_with(manager)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_my_orders_with_cookie() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_owner().with(eq("alice")).returning(|_| Ok(orders_response()));
    let token = issue_token("alice");
    let (status, body) = get_request(Auth::Cookie(&token), "/orders", configure_with(manager)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn no_orders_is_no_content() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_orders_for_owner().with(eq("bob")).returning(|_| Ok(vec![]));
    let token = issue_token("bob");
    let (status, body) = get_request(Auth::Bearer(&token), "/orders", configure_with(manager)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

// Mock response to `fetch_orders_for_owner` call
fn orders_response() -> Vec<Order> {
    vec![
        Order {
            status: OrderStatusType::Processed,
            accrual: Some(Points::from(72998)),
            updated_at: timestamp(2024, 3, 1, 9, 0),
            ..order("12345678903", "alice")
        },
        Order {
            id: 2,
            status: OrderStatusType::Processing,
            submitted_at: timestamp(2024, 3, 15, 18, 30),
            updated_at: timestamp(2024, 3, 16, 11, 20),
            ..order("79927398713", "alice")
        },
    ]
}

const ORDERS_JSON: &str = r#"[{"number":"12345678903","status":"PROCESSED","accrual":729.98,"submitted_at":"2024-02-29T13:30:00Z"},{"number":"79927398713","status":"PROCESSING","submitted_at":"2024-03-15T18:30:00Z"}]"#;
