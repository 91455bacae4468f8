use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{
        AcceptanceStatus,
        CancelledBy,
        DeliveryStatus,
        InvoiceBreakout,
        NewOrder,
        Order,
        OrderId,
        RefundStatus,
    },
    order_objects::OrderQueryFilter,
};

/// Inserts the order into the database, returning `false` in the second parameter if the order
/// already exists.
pub async fn idempotent_insert(order: NewOrder, conn: &mut SqliteConnection) -> Result<(Order, bool), sqlx::Error> {
    let inserted = match fetch_order_by_order_id(&order.order_id, &mut *conn).await? {
        Some(order) => (order, false),
        None => {
            let order = insert_order(order, conn).await?;
            debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
            (order, true)
        },
    };
    Ok(inserted)
}

/// Inserts a new order using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection
/// argument.
async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                restaurant_id,
                customer_id,
                total_price,
                vendor_payout_amount,
                invoice_breakout,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.restaurant_id)
    .bind(order.customer_id)
    .bind(order.total_price.value())
    .bind(order.vendor_payout_amount.map(|a| a.value()))
    .bind(Json(order.invoice_breakout))
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in ascending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.0);
    }
    if let Some(restaurant_id) = query.restaurant_id {
        where_clause.push("restaurant_id = ");
        where_clause.push_bind_unseparated(restaurant_id);
    }
    if let Some(customer_id) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(customer_id);
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    if let Some(statuses) = query.status {
        let statuses = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("order_status IN ({statuses})"));
    }
    if let Some(statuses) = query.refund_status {
        let statuses = statuses.iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("refund_status IN ({statuses})"));
    }
    builder.push(" ORDER BY created_at ASC");
    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    Ok(orders)
}

/// Marks a paid order as `Placed`, recording when the payment landed.
pub async fn mark_placed(id: i64, placed_at: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET order_status = 'Placed', placed_at = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(placed_at)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn set_acceptance_status(
    id: i64,
    status: AcceptanceStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET acceptance_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn set_delivery_status(
    id: i64,
    status: DeliveryStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET delivery_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Records the handover to the customer. The order stays `Placed`; the completion sweep picks
/// it up once the grace period has passed.
pub async fn mark_delivered(
    id: i64,
    delivered_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET delivery_status = 'Delivered', delivered_at = $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(delivered_at)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Cancels the order. The delivery job is cancelled alongside only when `cancel_delivery` is
/// set; dispatched orders keep their delivery status.
pub async fn mark_cancelled(
    id: i64,
    by: CancelledBy,
    cancel_delivery: bool,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = if cancel_delivery {
        sqlx::query_as(
            r#"
                UPDATE orders
                SET order_status = 'Cancelled', delivery_status = 'Cancelled', cancelled_by = $1,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = $2
                RETURNING *;
            "#,
        )
    } else {
        sqlx::query_as(
            r#"
                UPDATE orders
                SET order_status = 'Cancelled', cancelled_by = $1, updated_at = CURRENT_TIMESTAMP
                WHERE id = $2
                RETURNING *;
            "#,
        )
    }
    .bind(by)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn set_refund_status(
    id: i64,
    status: RefundStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET refund_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Writes the settlement split into the order's invoice breakout and moves the refund status in
/// the same statement.
pub async fn write_settlement(
    id: i64,
    breakout: &InvoiceBreakout,
    refund_status: RefundStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders
            SET invoice_breakout = $1, refund_status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(Json(breakout.clone()))
    .bind(refund_status)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

/// Completes every placed order that was delivered on or before `cutoff`. Returns the orders
/// that were completed.
pub async fn complete_delivered(cutoff: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            UPDATE orders
            SET order_status = 'Completed', updated_at = CURRENT_TIMESTAMP
            WHERE order_status = 'Placed' AND delivery_status = 'Delivered'
              AND delivered_at IS NOT NULL AND delivered_at <= $1
            RETURNING *;
        "#,
    )
    .bind(cutoff)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Stamps the member orders of a payout batch with its transfer id. Only rows that are still
/// unstamped are touched, which is what makes the stamp exactly-once.
pub async fn stamp_payout_members(
    transfer_id: &str,
    payout_id: i64,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders
            SET payout_transaction_id = $1, updated_at = CURRENT_TIMESTAMP
            WHERE payout_transaction_id IS NULL
              AND order_id IN (SELECT order_id FROM payout_orders WHERE payout_id = $2)
        "#,
    )
    .bind(transfer_id)
    .bind(payout_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Orders whose payout stamp does not correspond to any payout batch.
pub async fn orphaned_payout_stamps(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT o.* FROM orders o
            LEFT JOIN payouts p ON o.payout_transaction_id = p.transfer_id
            WHERE o.payout_transaction_id IS NOT NULL AND p.id IS NULL
            ORDER BY o.id ASC
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
