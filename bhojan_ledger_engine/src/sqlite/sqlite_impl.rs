//! `SqliteDatabase` is a concrete implementation of a ledger engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`crate::traits`] module. Every mutating trait method runs as one transaction, so webhook
//! replays and crashes can never leave a half-applied event behind.
use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::*;
use sqlx::{SqliteConnection, SqlitePool};

use super::db::{db_url, new_pool, orders, payments, payouts, refunds};
use crate::{
    db_types::{
        AttemptKind,
        CancelledBy,
        NewOrder,
        NewPayout,
        Order,
        OrderId,
        OrderStatus,
        Payment,
        PaymentAttempt,
        PaymentEvent,
        Payout,
        PayoutOrderEntry,
        Refund,
        RefundEvent,
        RefundSettlement,
        RefundStatus,
    },
    order_objects::OrderQueryFilter,
    state::{self, DeliveryEvent, OrderEvent, PayoutEvent, RefundFlowEvent, TransitionError, VendorDecision},
    traits::{
        CancellationOutcome,
        LedgerDatabase,
        LedgerError,
        LedgerManagement,
        LedgerQueryError,
        PaymentEventOutcome,
        RefundEventOutcome,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl LedgerManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_payment_for_order(&self, order_id: &OrderId) -> Result<Option<Payment>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let payment = payments::fetch_payment_for_order(order_id, &mut conn).await?;
        Ok(payment)
    }

    async fn fetch_payment_attempts(&self, order_id: &OrderId) -> Result<Vec<PaymentAttempt>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let attempts = payments::attempts_for_order(order_id, &mut conn).await?;
        Ok(attempts)
    }

    async fn fetch_refunds_for_order(&self, order_id: &OrderId) -> Result<Vec<Refund>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let refunds = refunds::fetch_for_order(order_id, &mut conn).await?;
        Ok(refunds)
    }

    async fn fetch_refund_by_refund_id(&self, refund_id: &str) -> Result<Option<Refund>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let refund = refunds::fetch_by_refund_id(refund_id, &mut conn).await?;
        Ok(refund)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_payout(&self, payout_id: i64) -> Result<Option<Payout>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let payout = payouts::fetch(payout_id, &mut conn).await?;
        Ok(payout)
    }

    async fn fetch_payouts_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let payouts = payouts::fetch_for_restaurant(restaurant_id, &mut conn).await?;
        Ok(payouts)
    }

    async fn fetch_payout_members(&self, payout_id: i64) -> Result<Vec<PayoutOrderEntry>, LedgerQueryError> {
        let mut conn = self.pool.acquire().await?;
        let members = payouts::members(payout_id, &mut conn).await?;
        Ok(members)
    }
}

impl LedgerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError> {
        let mut tx = self.pool.begin().await?;
        let (order, inserted) = orders::idempotent_insert(order, &mut tx).await?;
        if inserted {
            payments::insert_for_order(&order.order_id, order.total_price, &mut tx).await?;
            debug!("🗃️ Order {} saved with a pending payment record", order.order_id);
        }
        tx.commit().await?;
        Ok((order, inserted))
    }

    async fn apply_payment_event(&self, event: PaymentEvent) -> Result<PaymentEventOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(&event.order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(event.order_id.clone()))?;
        let payment = payments::fetch_payment_for_order(&order.order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::IntegrityViolation(format!("order {} has no payment record", order.order_id)))?;
        let Some(attempt) = payments::insert_attempt(payment.id, &event, &mut tx).await? else {
            tx.rollback().await?;
            return Ok(PaymentEventOutcome::Duplicate);
        };
        if event.amount != payment.amount {
            warn!(
                "🗃️ Attempt {} reports {} but order {} was invoiced for {}",
                attempt.external_payment_id, event.amount, order.order_id, payment.amount
            );
        }
        let outcome = match (event.kind, order.order_status) {
            (AttemptKind::Success, OrderStatus::Pending) => {
                state::next_payment_status(payment.status, event.kind)?;
                state::next_order_status(order.order_status, OrderEvent::PaymentSucceeded)?;
                payments::mark_completed(payment.id, &mut tx).await?;
                let order = orders::mark_placed(order.id, event.event_time, &mut tx).await?;
                debug!("🗃️ Order {} placed by attempt {}", order.order_id, attempt.external_payment_id);
                PaymentEventOutcome::Placed(order)
            },
            (AttemptKind::Success, status) => {
                warn!(
                    "🗃️ Successful attempt {} arrived for order {} which is already {status}. Logged without a \
                     transition; support may need to reverse the charge.",
                    attempt.external_payment_id, order.order_id
                );
                PaymentEventOutcome::AttemptRecorded(event.kind)
            },
            (kind, _) => PaymentEventOutcome::AttemptRecorded(kind),
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn record_vendor_decision(
        &self,
        order_id: &OrderId,
        decision: VendorDecision,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.clone()))?;
        let new_acceptance = state::next_acceptance_status(order.acceptance_status, decision)?;
        let outcome = match decision {
            VendorDecision::Accept => {
                let order = orders::set_acceptance_status(order.id, new_acceptance, &mut tx).await?;
                debug!("🗃️ Restaurant accepted order {}", order.order_id);
                CancellationOutcome { order, refund_opened: false }
            },
            VendorDecision::Reject => {
                state::next_order_status(order.order_status, OrderEvent::Cancel)?;
                let order = orders::set_acceptance_status(order.id, new_acceptance, &mut tx).await?;
                debug!("🗃️ Restaurant rejected order {}. Cancelling it on the vendor's behalf.", order.order_id);
                // Rejections refund in full, unless the order was never paid for.
                let disposition = if order.order_status == OrderStatus::Pending {
                    RefundDisposition::NoRefund
                } else {
                    RefundDisposition::Auto
                };
                cancel_order_in_tx(order, CancelledBy::Vendor, disposition, now, &mut tx).await?
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn record_delivery_event(
        &self,
        order_id: &OrderId,
        event: DeliveryEvent,
        now: DateTime<Utc>,
    ) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.clone()))?;
        if matches!(event, DeliveryEvent::Cancel) {
            // Cancellations must go through cancel_order so the refund disposition is decided.
            return Err(TransitionError::new("delivery", order.delivery_status, "Cancel (use cancel_order)").into());
        }
        if order.order_status != OrderStatus::Placed {
            return Err(TransitionError::new("delivery", format!("{} order", order.order_status), event).into());
        }
        let new_status = state::next_delivery_status(order.delivery_status, event)?;
        let order = match event {
            DeliveryEvent::Deliver => orders::mark_delivered(order.id, now, &mut tx).await?,
            _ => orders::set_delivery_status(order.id, new_status, &mut tx).await?,
        };
        debug!("🗃️ Order {} delivery moved to {}", order.order_id, order.delivery_status);
        tx.commit().await?;
        Ok(order)
    }

    async fn cancel_order(
        &self,
        order_id: &OrderId,
        by: CancelledBy,
        free_window: Duration,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.clone()))?;
        state::next_order_status(order.order_status, OrderEvent::Cancel)?;
        let disposition = refund_disposition(&order, by, free_window, now);
        let outcome = cancel_order_in_tx(order, by, disposition, now, &mut tx).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn complete_delivered_orders(&self, min_age: Duration, now: DateTime<Utc>) -> Result<Vec<Order>, LedgerError> {
        let cutoff = now - min_age;
        let mut tx = self.pool.begin().await?;
        let completed = orders::complete_delivered(cutoff, &mut tx).await?;
        tx.commit().await?;
        if !completed.is_empty() {
            debug!("🗃️ Completion sweep finalised {} order(s) delivered before {cutoff}", completed.len());
        }
        Ok(completed)
    }

    async fn mark_order_for_refund(&self, order_id: &OrderId) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.clone()))?;
        if let Some(transfer_id) = &order.payout_transaction_id {
            return Err(LedgerError::AlreadyPaidOut(order.order_id.clone(), transfer_id.clone()));
        }
        if order.order_status != OrderStatus::Cancelled {
            let reason = format!("the order is {}, not Cancelled", order.order_status);
            return Err(LedgerError::RefundNotAllowed(order.order_id.clone(), reason));
        }
        let new_status = state::next_refund_status(order.refund_status, RefundFlowEvent::Open)?;
        let order = orders::set_refund_status(order.id, new_status, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn settle_order_refund(
        &self,
        order_id: &OrderId,
        settlement: RefundSettlement,
        now: DateTime<Utc>,
    ) -> Result<Order, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(order_id.clone()))?;
        if let Some(transfer_id) = &order.payout_transaction_id {
            return Err(LedgerError::AlreadyPaidOut(order.order_id.clone(), transfer_id.clone()));
        }
        let new_status = state::next_refund_status(order.refund_status, RefundFlowEvent::Settle)?;
        let mut breakout = order.invoice_breakout.0.clone();
        breakout.refund_settlement_details = Some(settlement.into_details(now));
        let order = orders::write_settlement(order.id, &breakout, new_status, &mut tx).await?;
        debug!("🗃️ Settlement recorded for order {}. Refund status is {new_status}.", order.order_id);
        tx.commit().await?;
        Ok(order)
    }

    async fn apply_refund_event(&self, event: RefundEvent) -> Result<RefundEventOutcome, LedgerError> {
        let terminal = match event.status {
            RefundStatus::ApprovalPending => {
                return Err(LedgerError::IntegrityViolation(
                    "refund events can never carry the ApprovalPending status".into(),
                ));
            },
            RefundStatus::Pending => None,
            RefundStatus::Success => Some(RefundFlowEvent::Succeed),
            RefundStatus::Failed => Some(RefundFlowEvent::Fail),
        };
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(&event.order_id, &mut tx)
            .await?
            .ok_or_else(|| LedgerError::OrderNotFound(event.order_id.clone()))?;
        let existing = refunds::fetch_by_refund_id(&event.refund_id, &mut tx).await?;
        let outcome = match (existing, terminal) {
            (None, None) => {
                let refund = refunds::idempotent_insert(&event, RefundStatus::Pending, None, &mut tx)
                    .await?
                    .ok_or_else(|| integrity_race(&event.refund_id))?;
                debug!("🗃️ Refund {} initiated against order {}", refund.refund_id, order.order_id);
                RefundEventOutcome::Initiated(refund)
            },
            (None, Some(flow)) => {
                // The terminal webhook outran (or replaced) the initiation webhook.
                let new_status = state::next_refund_status(order.refund_status, flow)?;
                let refund = refunds::idempotent_insert(&event, event.status, Some(event.event_time), &mut tx)
                    .await?
                    .ok_or_else(|| integrity_race(&event.refund_id))?;
                let order = orders::set_refund_status(order.id, new_status, &mut tx).await?;
                debug!("🗃️ Refund {} arrived already resolved: {}", refund.refund_id, refund.status);
                RefundEventOutcome::Resolved { refund, order }
            },
            (Some(existing), Some(flow)) if existing.status == RefundStatus::Pending => {
                let new_status = state::next_refund_status(order.refund_status, flow)?;
                let refund = refunds::resolve(
                    &event.refund_id,
                    event.status,
                    event.status_description.as_deref(),
                    event.event_time,
                    &mut tx,
                )
                .await?
                .ok_or_else(|| integrity_race(&event.refund_id))?;
                let order = orders::set_refund_status(order.id, new_status, &mut tx).await?;
                debug!("🗃️ Refund {} resolved: {}", refund.refund_id, refund.status);
                RefundEventOutcome::Resolved { refund, order }
            },
            (Some(existing), _) => {
                debug!(
                    "🗃️ Refund event [{} / {}] changes nothing; the record is already {}",
                    event.refund_id, event.status, existing.status
                );
                tx.rollback().await?;
                return Ok(RefundEventOutcome::Duplicate);
            },
        };
        tx.commit().await?;
        Ok(outcome)
    }

    async fn acquire_payout_lock(
        &self,
        restaurant_id: &str,
        stale_after: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let acquired = payouts::try_acquire_lock(restaurant_id, stale_after, now, &mut conn).await?;
        Ok(acquired)
    }

    async fn release_payout_lock(&self, restaurant_id: &str) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        payouts::release_lock(restaurant_id, &mut conn).await?;
        Ok(())
    }

    async fn restaurants_due_for_payout(&self) -> Result<Vec<String>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let restaurants = payouts::restaurants_due(&mut conn).await?;
        Ok(restaurants)
    }

    async fn unresolved_payouts(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let payouts = payouts::unresolved(restaurant_id, &mut conn).await?;
        Ok(payouts)
    }

    async fn payable_orders(&self, restaurant_id: &str) -> Result<Vec<PayoutOrderEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let entries = payouts::payable_orders(restaurant_id, &mut conn).await?;
        Ok(entries)
    }

    async fn orders_missing_payout_amount(&self, restaurant_id: &str) -> Result<Vec<OrderId>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let ids = payouts::orders_missing_payout_amount(restaurant_id, &mut conn).await?;
        Ok(ids)
    }

    async fn create_payout(&self, payout: NewPayout, members: &[PayoutOrderEntry]) -> Result<Payout, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let payout = payouts::insert(payout, &mut tx).await?;
        for member in members {
            payouts::add_member(payout.id, member, &mut tx).await?;
        }
        debug!("🗃️ Payout batch {} created with {} member order(s)", payout.transfer_id, members.len());
        tx.commit().await?;
        Ok(payout)
    }

    async fn complete_payout(&self, payout_id: i64) -> Result<(Payout, u64), LedgerError> {
        let mut tx = self.pool.begin().await?;
        let payout =
            payouts::fetch(payout_id, &mut tx).await?.ok_or(LedgerError::PayoutNotFound(payout_id))?;
        let new_status = state::next_payout_status(payout.status, PayoutEvent::TransferSucceeded)?;
        let payout =
            payouts::set_status(payout_id, new_status, &mut tx).await?.ok_or(LedgerError::PayoutNotFound(payout_id))?;
        let stamped = orders::stamp_payout_members(&payout.transfer_id, payout.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payout {} completed. {stamped} member order(s) stamped.", payout.transfer_id);
        Ok((payout, stamped))
    }

    async fn fail_payout(&self, payout_id: i64) -> Result<Payout, LedgerError> {
        let mut tx = self.pool.begin().await?;
        let payout =
            payouts::fetch(payout_id, &mut tx).await?.ok_or(LedgerError::PayoutNotFound(payout_id))?;
        let new_status = state::next_payout_status(payout.status, PayoutEvent::TransferFailed)?;
        let payout =
            payouts::set_status(payout_id, new_status, &mut tx).await?.ok_or(LedgerError::PayoutNotFound(payout_id))?;
        tx.commit().await?;
        debug!("🗃️ Payout {} marked failed. Its orders return to the payable pool.", payout.transfer_id);
        Ok(payout)
    }

    async fn orphaned_payout_stamps(&self) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::orphaned_payout_stamps(&mut conn).await?;
        Ok(orders)
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

enum RefundDisposition {
    /// The order was never paid; there is nothing to return.
    NoRefund,
    /// Full refund to the customer, settled by the engine without operator involvement.
    Auto,
    /// An operator must decide the settlement split first.
    Approval,
}

fn refund_disposition(order: &Order, by: CancelledBy, free_window: Duration, now: DateTime<Utc>) -> RefundDisposition {
    if order.order_status == OrderStatus::Pending {
        return RefundDisposition::NoRefund;
    }
    let within_window = order.placed_at.map(|placed| now - placed <= free_window).unwrap_or(false);
    if within_window || matches!(by, CancelledBy::Vendor | CancelledBy::DeliveryService) {
        RefundDisposition::Auto
    } else {
        RefundDisposition::Approval
    }
}

/// The shared tail of every cancellation path. Assumes the caller has already validated the
/// order-level transition.
async fn cancel_order_in_tx(
    order: Order,
    by: CancelledBy,
    disposition: RefundDisposition,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<CancellationOutcome, LedgerError> {
    let cancel_delivery = state::next_delivery_status(order.delivery_status, DeliveryEvent::Cancel).is_ok();
    let cancelled = orders::mark_cancelled(order.id, by, cancel_delivery, &mut *conn).await?;
    if !cancel_delivery {
        warn!(
            "🗃️ Order {} was cancelled while its delivery is {}. The delivery status is left as is.",
            cancelled.order_id, cancelled.delivery_status
        );
    }
    let outcome = match disposition {
        RefundDisposition::NoRefund => CancellationOutcome { order: cancelled, refund_opened: false },
        RefundDisposition::Auto => {
            let new_status = state::next_refund_status(cancelled.refund_status, RefundFlowEvent::AutoSettle)?;
            let settlement = RefundSettlement::full_refund(&cancelled).into_details(now);
            let mut breakout = cancelled.invoice_breakout.0.clone();
            breakout.refund_settlement_details = Some(settlement);
            let order = orders::write_settlement(cancelled.id, &breakout, new_status, conn).await?;
            debug!("🗃️ Auto-settled a full refund of {} for order {}", order.total_price, order.order_id);
            CancellationOutcome { order, refund_opened: true }
        },
        RefundDisposition::Approval => {
            let new_status = state::next_refund_status(cancelled.refund_status, RefundFlowEvent::Open)?;
            let order = orders::set_refund_status(cancelled.id, new_status, conn).await?;
            debug!("🗃️ Order {} parked at {new_status} awaiting a settlement decision", order.order_id);
            CancellationOutcome { order, refund_opened: false }
        },
    };
    Ok(outcome)
}

fn integrity_race(refund_id: &str) -> LedgerError {
    LedgerError::IntegrityViolation(format!("refund {refund_id} changed underneath an open transaction"))
}
