use std::{fmt::Debug, sync::Arc};

use chrono::Duration;
use log::*;

use crate::{
    db_types::{CancelledBy, NewOrder, Order, OrderId, PaymentEvent},
    events::{EventProducers, OrderPlacedEvent, RefundInitiatedEvent},
    helpers::{Clock, SystemClock},
    state::{DeliveryEvent, VendorDecision},
    traits::{CancellationOutcome, LedgerDatabase, LedgerError, PaymentEventOutcome},
};

pub const DEFAULT_FREE_CANCEL_WINDOW_MINS: i64 = 5;

/// `OrderFlowApi` is the primary API for moving orders through their lifecycle in response to
/// ordering-service events, gateway payment webhooks, vendor decisions and delivery updates.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
    clock: Arc<dyn Clock>,
    free_cancel_window: Duration,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self {
            db,
            producers,
            clock: Arc::new(SystemClock),
            free_cancel_window: Duration::minutes(DEFAULT_FREE_CANCEL_WINDOW_MINS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_free_cancel_window(mut self, window: Duration) -> Self {
        self.free_cancel_window = window;
        self
    }
}

impl<B> OrderFlowApi<B>
where B: LedgerDatabase
{
    /// Submit a new order to the ledger.
    ///
    /// The order is stored together with a pending payment record. The call is idempotent: the
    /// boolean in the result is `true` if this call inserted the order.
    pub async fn process_new_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError> {
        let (order, inserted) = self.db.insert_order(order).await?;
        if inserted {
            debug!("🔁️📦️ Order {} recorded. Awaiting payment of {}.", order.order_id, order.total_price);
        } else {
            debug!("🔁️📦️ Order {} was already on the ledger. Nothing to do.", order.order_id);
        }
        Ok((order, inserted))
    }

    /// Submit a payment webhook to the ledger.
    ///
    /// Replays are detected on the `(external_payment_id, kind)` pair and ignored. A first-seen
    /// success on a pending order places it and fires the order placed hook.
    pub async fn process_payment_event(&self, event: PaymentEvent) -> Result<PaymentEventOutcome, LedgerError> {
        trace!("🔁️💰️ {event} received");
        let outcome = self.db.apply_payment_event(event).await?;
        match &outcome {
            PaymentEventOutcome::Placed(order) => {
                debug!("🔁️💰️ Payment captured in full. Order {} is placed.", order.order_id);
                self.call_order_placed_hook(order).await;
            },
            PaymentEventOutcome::AttemptRecorded(kind) => {
                debug!("🔁️💰️ {kind} attempt logged. No transition fired.");
            },
            PaymentEventOutcome::Duplicate => {
                debug!("🔁️💰️ Replayed payment event. Ledger untouched.");
            },
        }
        Ok(outcome)
    }

    /// Record the restaurant's decision on an order. A rejection cancels the order and releases
    /// a full refund to the customer, which fires the refund hook.
    pub async fn record_vendor_decision(&self, order_id: &OrderId, decision: VendorDecision) -> Result<Order, LedgerError> {
        let now = self.clock.now();
        let outcome = self.db.record_vendor_decision(order_id, decision, now).await?;
        debug!("🔁️🏪️ Vendor decision on order {order_id}: {decision}");
        if outcome.refund_opened {
            self.call_refund_initiated_hook(&outcome).await;
        }
        Ok(outcome.order)
    }

    /// Record a delivery service event against an order. `Cancel` is routed through the full
    /// cancellation flow on the delivery service's behalf.
    pub async fn record_delivery_event(&self, order_id: &OrderId, event: DeliveryEvent) -> Result<Order, LedgerError> {
        if matches!(event, DeliveryEvent::Cancel) {
            let outcome = self.cancel_order(order_id, CancelledBy::DeliveryService).await?;
            return Ok(outcome.order);
        }
        let now = self.clock.now();
        let order = self.db.record_delivery_event(order_id, event, now).await?;
        debug!("🔁️🚚️ Delivery update on order {order_id}: {event} -> {}", order.delivery_status);
        Ok(order)
    }

    /// Cancel an order on behalf of `by`.
    ///
    /// Paid orders cancelled within the free window, or cancelled by the vendor or delivery
    /// service, auto-settle a full customer refund and fire the refund hook. Other paid
    /// cancellations wait for an operator settlement.
    pub async fn cancel_order(&self, order_id: &OrderId, by: CancelledBy) -> Result<CancellationOutcome, LedgerError> {
        let now = self.clock.now();
        let outcome = self.db.cancel_order(order_id, by, self.free_cancel_window, now).await?;
        info!("🔁️❌️ Order {order_id} cancelled by {by}");
        if outcome.refund_opened {
            self.call_refund_initiated_hook(&outcome).await;
        }
        Ok(outcome)
    }

    /// Sweep delivered orders older than `min_age` into `Completed`, making them payable to the
    /// restaurant. Returns the completed orders.
    pub async fn complete_delivered_orders(&self, min_age: Duration) -> Result<Vec<Order>, LedgerError> {
        let now = self.clock.now();
        let completed = self.db.complete_delivered_orders(min_age, now).await?;
        if !completed.is_empty() {
            info!("🔁️🏁️ {} delivered order(s) completed", completed.len());
        }
        Ok(completed)
    }

    async fn call_order_placed_hook(&self, order: &Order) {
        for emitter in &self.producers.order_placed_producer {
            debug!("🔁️📦️ Notifying order placed hook subscribers");
            let event = OrderPlacedEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_refund_initiated_hook(&self, outcome: &CancellationOutcome) {
        let Some(settlement) = outcome.order.settlement_details() else {
            error!(
                "🔁️❌️ Order {} reported an opened refund but carries no settlement details. This is a bug.",
                outcome.order.order_id
            );
            return;
        };
        for emitter in &self.producers.refund_initiated_producer {
            debug!("🔁️❌️ Notifying refund initiated hook subscribers");
            let event = RefundInitiatedEvent::new(outcome.order.clone(), settlement.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}
