use chrono::{DateTime, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{OrderId, Refund, RefundEvent, RefundStatus};

/// Inserts the refund record for a first-seen refund id. Returns `None` when the refund id is
/// already on file, which is how refund webhook replays are detected.
pub async fn idempotent_insert(
    event: &RefundEvent,
    status: RefundStatus,
    processed_at: Option<DateTime<Utc>>,
    conn: &mut SqliteConnection,
) -> Result<Option<Refund>, sqlx::Error> {
    let result = sqlx::query_as::<_, Refund>(
        r#"
            INSERT INTO refunds (
                refund_id,
                order_id,
                payment_id,
                amount,
                charges,
                status,
                status_description,
                created_at,
                processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(&event.refund_id)
    .bind(event.order_id.as_str())
    .bind(&event.payment_id)
    .bind(event.amount.value())
    .bind(event.charges.value())
    .bind(status)
    .bind(&event.status_description)
    .bind(event.event_time)
    .bind(processed_at)
    .fetch_one(conn)
    .await;
    match result {
        Ok(refund) => Ok(Some(refund)),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            debug!("📝️ Refund [{}] has been seen before", event.refund_id);
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

pub async fn fetch_by_refund_id(refund_id: &str, conn: &mut SqliteConnection) -> Result<Option<Refund>, sqlx::Error> {
    let refund =
        sqlx::query_as("SELECT * FROM refunds WHERE refund_id = $1").bind(refund_id).fetch_optional(conn).await?;
    Ok(refund)
}

pub async fn fetch_for_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<Refund>, sqlx::Error> {
    let refunds = sqlx::query_as("SELECT * FROM refunds WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(refunds)
}

/// Moves a refund record to its terminal state.
pub async fn resolve(
    refund_id: &str,
    status: RefundStatus,
    description: Option<&str>,
    processed_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Refund>, sqlx::Error> {
    let refund = sqlx::query_as(
        r#"
            UPDATE refunds
            SET status = $1, status_description = COALESCE($2, status_description), processed_at = $3
            WHERE refund_id = $4
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(description)
    .bind(processed_at)
    .bind(refund_id)
    .fetch_optional(conn)
    .await?;
    Ok(refund)
}
