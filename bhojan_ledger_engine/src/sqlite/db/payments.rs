use ble_common::Paisa;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{OrderId, Payment, PaymentAttempt, PaymentEvent};

/// Creates the pending payment record that accompanies every new order.
pub async fn insert_for_order(
    order_id: &OrderId,
    amount: Paisa,
    conn: &mut SqliteConnection,
) -> Result<Payment, sqlx::Error> {
    let payment = sqlx::query_as("INSERT INTO payments (order_id, amount) VALUES ($1, $2) RETURNING *")
        .bind(order_id.as_str())
        .bind(amount.value())
        .fetch_one(conn)
        .await?;
    Ok(payment)
}

pub async fn fetch_payment_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, sqlx::Error> {
    let payment = sqlx::query_as("SELECT * FROM payments WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(payment)
}

pub async fn mark_completed(id: i64, conn: &mut SqliteConnection) -> Result<Payment, sqlx::Error> {
    let payment = sqlx::query_as(
        "UPDATE payments SET status = 'Completed', updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(payment)
}

/// Appends a gateway attempt to the log. Returns `None` when the `(external_payment_id, kind)`
/// pair has been seen before, which is how webhook replays are detected.
pub async fn insert_attempt(
    payment_id: i64,
    event: &PaymentEvent,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentAttempt>, sqlx::Error> {
    let result = sqlx::query_as::<_, PaymentAttempt>(
        r#"
            INSERT INTO payment_attempts (
                payment_id,
                order_id,
                external_payment_id,
                kind,
                payment_method,
                error_detail,
                event_time
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(payment_id)
    .bind(event.order_id.as_str())
    .bind(&event.external_payment_id)
    .bind(event.kind)
    .bind(&event.payment_method)
    .bind(&event.error_detail)
    .bind(event.event_time)
    .fetch_one(conn)
    .await;
    match result {
        Ok(attempt) => Ok(Some(attempt)),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            debug!("📝️ Attempt [{} / {}] has been seen before", event.external_payment_id, event.kind);
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

pub async fn attempts_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentAttempt>, sqlx::Error> {
    let attempts = sqlx::query_as("SELECT * FROM payment_attempts WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(attempts)
}
