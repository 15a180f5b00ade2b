use cucumber::{then, when};
use loyalty_common::Points;
use loyalty_engine::{
    db_types::{OrderNumber, OrderStatusType, SettlementResult},
    BalanceApiError,
    OrderFlowError,
    OrderManagement,
    SubmitOrderOutcome,
};

use crate::cucumber::LoyaltyWorld;

#[when(expr = "user {string} submits order {word}")]
async fn submit_order(world: &mut LoyaltyWorld, user: String, number: String) {
    let result = world.system().orders.submit_order(&number, &user).await;
    world.last_submission = Some(result);
}

#[when(expr = "the accrual system reports order {word} as processing")]
async fn accrual_processing(world: &mut LoyaltyWorld, number: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number in feature file");
    world.system().settlement.mark_processing(&number).await.expect("Error marking order as processing");
}

#[when(expr = "the accrual system reports order {word} as invalid")]
async fn accrual_invalid(world: &mut LoyaltyWorld, number: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number in feature file");
    world.system().settlement.mark_invalid(&number).await.expect("Error marking order as invalid");
}

#[when(expr = "the accrual system awards {int} points for order {word}")]
async fn accrual_processed(world: &mut LoyaltyWorld, points: i64, number: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number in feature file");
    let result = world.system().settlement.settle(&number, Points::from_whole(points)).await;
    match result.expect("Error settling order") {
        SettlementResult::Credited { .. } => {},
        SettlementResult::AlreadySettled(order) => log::debug!("Order {} was already {}", order.number, order.status),
    }
}

#[when(expr = "user {string} withdraws {int} points for order {word}")]
async fn withdraw(world: &mut LoyaltyWorld, user: String, points: i64, number: String) {
    let result = world.system().balances.withdraw(&user, &number, Points::from_whole(points)).await;
    world.last_withdrawal = Some(result);
}

#[then("the order is accepted")]
async fn order_accepted(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("No order was submitted");
    assert!(matches!(result, Ok(SubmitOrderOutcome::Accepted(_))), "Expected acceptance, got {result:?}");
}

#[then("the order was already submitted")]
async fn order_repeated(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("No order was submitted");
    assert!(matches!(result, Ok(SubmitOrderOutcome::AlreadySubmitted(_))), "Got {result:?}");
}

#[then("the order is rejected because it belongs to someone else")]
async fn order_conflict(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("No order was submitted");
    assert!(matches!(result, Err(OrderFlowError::OwnedByOtherUser(_))), "Got {result:?}");
}

#[then(expr = "order {word} has status {word}")]
async fn order_status(world: &mut LoyaltyWorld, number: String, status: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number in feature file");
    let expected = status.parse::<OrderStatusType>().expect("Invalid status in feature file");
    let order = world.system().db.fetch_order(&number).await.expect("Error fetching order").expect("Order not found");
    assert_eq!(order.status, expected);
}

#[then(expr = "user {string} has {int} orders")]
async fn order_count(world: &mut LoyaltyWorld, user: String, count: usize) {
    let orders = world.system().orders.orders_for_owner(&user).await.expect("Error fetching orders");
    assert_eq!(orders.len(), count);
}

#[then(expr = "user {string} has {int} points available and {int} withdrawn")]
async fn check_balance(world: &mut LoyaltyWorld, user: String, available: i64, withdrawn: i64) {
    let balance = world.system().balances.balance(&user).await.expect("Error fetching balance");
    assert_eq!(balance.available(), Points::from_whole(available));
    assert_eq!(balance.withdrawn, Points::from_whole(withdrawn));
}

#[then("the withdrawal succeeds")]
async fn withdrawal_ok(world: &mut LoyaltyWorld) {
    let result = world.last_withdrawal.as_ref().expect("No withdrawal was attempted");
    assert!(result.is_ok(), "Expected success, got {result:?}");
}

#[then("the withdrawal is refused for insufficient funds")]
async fn withdrawal_refused(world: &mut LoyaltyWorld) {
    let result = world.last_withdrawal.as_ref().expect("No withdrawal was attempted");
    assert!(matches!(result, Err(BalanceApiError::InsufficientFunds(_))), "Got {result:?}");
}

#[then(expr = "user {string} has {int} withdrawals")]
async fn withdrawal_count(world: &mut LoyaltyWorld, user: String, count: usize) {
    let history = world.system().balances.withdrawals(&user).await.expect("Error fetching withdrawals");
    assert_eq!(history.len(), count);
}
