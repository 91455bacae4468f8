use chrono::{DateTime, Duration, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{NewPayout, OrderId, Payout, PayoutOrderEntry, PayoutStatus};

/// The conditions under which an order may enter a payout batch.
///
/// Two kinds of orders qualify: completed-and-delivered orders with a recorded vendor share, and
/// cancelled orders whose refund settlement has been decided and is not in flight. Orders that
/// are already stamped, or that sit inside a live `Init` batch, never qualify. A `Failed`
/// refund does not block the vendor's share; the refund retry and the payout are independent.
const PAYABLE_PREDICATE: &str = r#"
    payout_transaction_id IS NULL
    AND order_id NOT IN (
        SELECT po.order_id FROM payout_orders po
        JOIN payouts p ON po.payout_id = p.id
        WHERE p.status = 'Init'
    )
    AND (
        (order_status = 'Completed' AND acceptance_status = 'Accepted'
            AND delivery_status = 'Delivered' AND vendor_payout_amount IS NOT NULL)
        OR (order_status = 'Cancelled'
            AND json_extract(invoice_breakout, '$.refund_settlement_details') IS NOT NULL
            AND (refund_status IS NULL OR refund_status NOT IN ('ApprovalPending', 'Pending')))
    )"#;

/// Tries to take the advisory payout lock for a restaurant. A lock row acquired before
/// `now - stale_after` is presumed to belong to a crashed run and is taken over.
pub async fn try_acquire_lock(
    restaurant_id: &str,
    stale_after: Duration,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("INSERT INTO payout_locks (restaurant_id, acquired_at) VALUES ($1, $2)")
        .bind(restaurant_id)
        .bind(now)
        .execute(&mut *conn)
        .await;
    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            let cutoff = now - stale_after;
            let taken =
                sqlx::query("UPDATE payout_locks SET acquired_at = $1 WHERE restaurant_id = $2 AND acquired_at <= $3")
                    .bind(now)
                    .bind(restaurant_id)
                    .bind(cutoff)
                    .execute(conn)
                    .await?;
            Ok(taken.rows_affected() > 0)
        },
        Err(e) => Err(e),
    }
}

pub async fn release_lock(restaurant_id: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM payout_locks WHERE restaurant_id = $1").bind(restaurant_id).execute(conn).await?;
    Ok(())
}

/// The restaurants a payout run must visit: those with payable orders plus those with leftover
/// `Init` batches.
pub async fn restaurants_due(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    let sql = format!(
        r#"
            SELECT DISTINCT restaurant_id FROM orders WHERE {PAYABLE_PREDICATE}
            UNION
            SELECT DISTINCT restaurant_id FROM payouts WHERE status = 'Init'
            ORDER BY restaurant_id ASC
        "#
    );
    let restaurants = sqlx::query_scalar(&sql).fetch_all(conn).await?;
    Ok(restaurants)
}

/// The orders currently eligible to enter a payout batch for `restaurant_id`, with the amount
/// each contributes. Completed orders contribute their vendor payout amount; settled
/// cancellations contribute the vendor share of the settlement.
pub async fn payable_orders(
    restaurant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<PayoutOrderEntry>, sqlx::Error> {
    let sql = format!(
        r#"
            SELECT order_id,
                   CASE WHEN order_status = 'Completed'
                        THEN vendor_payout_amount
                        ELSE CAST(json_extract(invoice_breakout, '$.refund_settlement_details.vendor_payout_amount')
                             AS INTEGER)
                   END AS amount
            FROM orders
            WHERE restaurant_id = $1 AND {PAYABLE_PREDICATE}
            ORDER BY id ASC
        "#
    );
    trace!("📝️ Executing query: {sql}");
    let entries = sqlx::query_as(&sql).bind(restaurant_id).fetch_all(conn).await?;
    Ok(entries)
}

/// Completed orders that can never be paid out because no vendor payout amount was recorded.
pub async fn orders_missing_payout_amount(
    restaurant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderId>, sqlx::Error> {
    let ids: Vec<String> = sqlx::query_scalar(
        r#"
            SELECT order_id FROM orders
            WHERE restaurant_id = $1 AND payout_transaction_id IS NULL
              AND order_status = 'Completed' AND acceptance_status = 'Accepted'
              AND delivery_status = 'Delivered' AND vendor_payout_amount IS NULL
            ORDER BY id ASC
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(conn)
    .await?;
    Ok(ids.into_iter().map(OrderId).collect())
}

pub async fn unresolved(restaurant_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Payout>, sqlx::Error> {
    let payouts = sqlx::query_as("SELECT * FROM payouts WHERE restaurant_id = $1 AND status = 'Init' ORDER BY id ASC")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await?;
    Ok(payouts)
}

pub async fn insert(payout: NewPayout, conn: &mut SqliteConnection) -> Result<Payout, sqlx::Error> {
    let payout = sqlx::query_as(
        r#"
            INSERT INTO payouts (
                restaurant_id,
                total_order_amount,
                transaction_charges,
                amount_paid_to_vendor,
                transfer_id
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(payout.restaurant_id)
    .bind(payout.total_order_amount.value())
    .bind(payout.transaction_charges.value())
    .bind(payout.amount_paid_to_vendor.value())
    .bind(payout.transfer_id)
    .fetch_one(conn)
    .await?;
    Ok(payout)
}

pub async fn add_member(
    payout_id: i64,
    member: &PayoutOrderEntry,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO payout_orders (payout_id, order_id, amount) VALUES ($1, $2, $3)")
        .bind(payout_id)
        .bind(member.order_id.as_str())
        .bind(member.amount.value())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn members(payout_id: i64, conn: &mut SqliteConnection) -> Result<Vec<PayoutOrderEntry>, sqlx::Error> {
    let members = sqlx::query_as("SELECT order_id, amount FROM payout_orders WHERE payout_id = $1 ORDER BY rowid ASC")
        .bind(payout_id)
        .fetch_all(conn)
        .await?;
    Ok(members)
}

pub async fn set_status(
    payout_id: i64,
    status: PayoutStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Payout>, sqlx::Error> {
    let payout =
        sqlx::query_as("UPDATE payouts SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(payout_id)
            .fetch_optional(conn)
            .await?;
    Ok(payout)
}

pub async fn fetch(payout_id: i64, conn: &mut SqliteConnection) -> Result<Option<Payout>, sqlx::Error> {
    let payout = sqlx::query_as("SELECT * FROM payouts WHERE id = $1").bind(payout_id).fetch_optional(conn).await?;
    Ok(payout)
}

pub async fn fetch_for_restaurant(
    restaurant_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payout>, sqlx::Error> {
    let payouts = sqlx::query_as("SELECT * FROM payouts WHERE restaurant_id = $1 ORDER BY id DESC")
        .bind(restaurant_id)
        .fetch_all(conn)
        .await?;
    Ok(payouts)
}
