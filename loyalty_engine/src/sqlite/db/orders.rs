use chrono::Utc;
use log::{debug, trace};
use loyalty_common::Points;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db_types::{Order, OrderNumber, OrderStatusType, PendingOrder};

const ORDER_COLUMNS: &str = "id, number, owner, status, accrual, submitted_at, updated_at";

/// Inserts a new order in `NEW` status, unless the number is already taken.
///
/// Returns `None` if another record already holds the number. The `UNIQUE` constraint on `number` arbitrates between
/// concurrent callers, so exactly one of them gets `Some`.
pub async fn insert_if_new(
    number: &OrderNumber,
    owner: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let now = Utc::now();
    let order: Option<Order> = sqlx::query_as(&format!(
        r#"
            INSERT INTO orders (number, owner, status, submitted_at, updated_at)
            VALUES ($1, $2, 'NEW', $3, $4)
            ON CONFLICT (number) DO NOTHING
            RETURNING {ORDER_COLUMNS};
        "#
    ))
    .bind(number.as_str())
    .bind(owner)
    .bind(now)
    .bind(now)
    .fetch_optional(conn)
    .await?;
    if let Some(o) = &order {
        debug!("🗃️ Order {} registered for {} with id {}", o.number, o.owner, o.id);
    }
    Ok(order)
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE number = $1"))
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_orders_for_owner(owner: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE owner = $1 ORDER BY submitted_at ASC, id ASC"
    ))
    .bind(owner)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub async fn fetch_pending_orders(conn: &mut SqliteConnection) -> Result<Vec<PendingOrder>, sqlx::Error> {
    let orders: Vec<PendingOrder> = sqlx::query_as(
        "SELECT number, owner, status FROM orders WHERE status IN ('NEW', 'PROCESSING') ORDER BY id ASC",
    )
    .fetch_all(conn)
    .await?;
    trace!("🗃️ {} orders are pending", orders.len());
    Ok(orders)
}

/// Moves an order to `status`, but only if its current status is one from which `status` can legally be reached.
///
/// Returns `None` if no row was changed, either because the order does not exist or because it is in a status that
/// does not permit the transition. The caller can use [`fetch_order_by_number`] to tell the two apart.
pub async fn update_status_if_allowed(
    number: &OrderNumber,
    status: OrderStatusType,
    accrual: Option<Points>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let sources = OrderStatusType::allowed_sources(status);
    if sources.is_empty() {
        return Ok(None);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
    builder.push_bind(status);
    builder.push(", accrual = ");
    builder.push_bind(accrual);
    builder.push(", updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(" WHERE number = ");
    builder.push_bind(number.as_str().to_string());
    builder.push(" AND status IN (");
    let mut separated = builder.separated(", ");
    for s in sources {
        separated.push_bind(s);
    }
    separated.push_unseparated(") RETURNING ");
    builder.push(ORDER_COLUMNS);
    trace!("🗃️ Executing query: {}", builder.sql());
    let order = builder.build_query_as::<Order>().fetch_optional(conn).await?;
    if let Some(o) = &order {
        debug!("🗃️ Order {} is now {}", o.number, o.status);
    }
    Ok(order)
}
