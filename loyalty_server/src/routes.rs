//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database and network access must always be awaited, never blocked
//! on.
//!
//! Every handler that takes a [`JwtClaims`] argument is only reachable with a valid session token.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use loyalty_engine::{
    traits::{LedgerManagement, OrderManagement},
    BalanceApi,
    OrderFlowApi,
    SubmitOrderOutcome,
};

use crate::{
    auth::JwtClaims,
    data_objects::{BalanceView, JsonResponse, OrderView, WithdrawRequest, WithdrawalView},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// All the routes that act on behalf of the logged-in user, mounted under `/api/user`.
pub fn user_scope<B>() -> actix_web::Scope
where B: OrderManagement + LedgerManagement + 'static {
    web::scope("/api/user")
        .service(SubmitOrderRoute::<B>::new())
        .service(MyOrdersRoute::<B>::new())
        .service(MyBalanceRoute::<B>::new())
        .service(WithdrawRoute::<B>::new())
        .service(MyWithdrawalsRoute::<B>::new())
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/orders" impl OrderManagement);
/// Route handler for submitting an order number for points.
///
/// The body is the bare order number. Responds with
/// * `202 Accepted` if the number is new and has been queued for settlement,
/// * `200 OK` if the user had already submitted it,
/// * `409 Conflict` if somebody else owns it,
/// * `400` for bodies that are not a number, and `422` for numbers that fail the Luhn check.
pub async fn submit_order<B: OrderManagement>(
    claims: JwtClaims,
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order for {}", claims.user());
    let outcome = api.submit_order(&body, claims.user()).await?;
    let response = match outcome {
        SubmitOrderOutcome::Accepted(order) => {
            HttpResponse::Accepted().json(JsonResponse::success(format!("Order {} accepted", order.number.as_str())))
        },
        SubmitOrderOutcome::AlreadySubmitted(order) => HttpResponse::Ok()
            .json(JsonResponse::success(format!("Order {} was already submitted", order.number.as_str()))),
    };
    Ok(response)
}

route!(my_orders => Get "/orders" impl OrderManagement);
/// Route handler for listing the user's orders, oldest first. Responds with `204 No Content` if there are none.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for {}", claims.user());
    let orders = api.orders_for_owner(claims.user()).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let orders = orders.into_iter().map(OrderView::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(my_balance => Get "/balance" impl LedgerManagement);
pub async fn my_balance<B: LedgerManagement>(
    claims: JwtClaims,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET balance for {}", claims.user());
    let balance = api.balance(claims.user()).await?;
    Ok(HttpResponse::Ok().json(BalanceView::from(balance)))
}

route!(withdraw => Post "/balance/withdraw" impl LedgerManagement);
/// Route handler for spending points on a new order.
///
/// The body is `{"order": "<number>", "sum": <points>}`. Responds with `402 Payment Required` if the balance does not
/// cover the sum, in which case nothing is deducted.
pub async fn withdraw<B: LedgerManagement>(
    claims: JwtClaims,
    body: web::Bytes,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = serde_json::from_slice::<WithdrawRequest>(&body).map_err(|e| {
        debug!("💻️ Could not parse withdrawal request. {e}");
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    debug!("💻️ POST withdrawal of {} for order {} by {}", request.sum, request.order, claims.user());
    let withdrawal = api.withdraw(claims.user(), &request.order, request.sum).await?;
    Ok(HttpResponse::Ok().json(WithdrawalView::from(withdrawal)))
}

route!(my_withdrawals => Get "/withdrawals" impl LedgerManagement);
/// Route handler for the user's withdrawal history, oldest first. Responds with `204 No Content` if there is none.
pub async fn my_withdrawals<B: LedgerManagement>(
    claims: JwtClaims,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET withdrawals for {}", claims.user());
    let history = api.withdrawals(claims.user()).await?;
    if history.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let history = history.into_iter().map(WithdrawalView::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(history))
}
