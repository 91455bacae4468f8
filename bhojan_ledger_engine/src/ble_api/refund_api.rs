use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::{
    db_types::{Order, OrderId, RefundEvent, RefundSettlement},
    events::{EventProducers, RefundInitiatedEvent},
    helpers::{Clock, SystemClock},
    traits::{LedgerDatabase, LedgerError, RefundEventOutcome},
};

/// `RefundApi` handles the money-return side of cancelled orders: opening refunds for operator
/// approval, recording settlement splits, and ingesting the gateway's refund webhooks.
pub struct RefundApi<B> {
    db: B,
    producers: EventProducers,
    clock: Arc<dyn Clock>,
}

impl<B> Debug for RefundApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefundApi")
    }
}

impl<B> RefundApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, clock: Arc::new(SystemClock) }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl<B> RefundApi<B>
where B: LedgerDatabase
{
    /// Open a refund approval on a cancelled order. The order parks at `ApprovalPending` until
    /// an operator decides the settlement split.
    pub async fn mark_for_refund(&self, order_id: &OrderId) -> Result<Order, LedgerError> {
        let order = self.db.mark_order_for_refund(order_id).await?;
        info!("🧾️ Order {order_id} is awaiting a refund settlement decision");
        Ok(order)
    }

    /// Record an operator's settlement split and release the refund for execution. Fires the
    /// refund initiated hook so the actual gateway refund can be kicked off.
    ///
    /// The split is not forced to add up to the order total (the vendor share may be negative,
    /// and goodwill credits happen), but a mismatch is logged.
    pub async fn settle_refund(&self, order_id: &OrderId, settlement: RefundSettlement) -> Result<Order, LedgerError> {
        let now = self.clock.now();
        let total = settlement.total();
        let order = self.db.settle_order_refund(order_id, settlement, now).await?;
        if total != order.total_price {
            warn!(
                "🧾️ Settlement for order {order_id} adds up to {total}, but the customer paid {}. Proceeding; the \
                 split is the operator's call.",
                order.total_price
            );
        }
        info!("🧾️ Refund settlement recorded for order {order_id}. Refund is ready for execution.");
        self.call_refund_initiated_hook(&order).await;
        Ok(order)
    }

    /// Submit a refund webhook to the ledger. Replays are detected on `refund_id` and ignored.
    pub async fn process_refund_event(&self, event: RefundEvent) -> Result<RefundEventOutcome, LedgerError> {
        trace!("🧾️ {event} received");
        let outcome = self.db.apply_refund_event(event).await?;
        match &outcome {
            RefundEventOutcome::Initiated(refund) => {
                debug!("🧾️ Refund {} recorded against order {}", refund.refund_id, refund.order_id);
            },
            RefundEventOutcome::Resolved { refund, order } => {
                info!("🧾️ Refund {} for order {} resolved: {}", refund.refund_id, order.order_id, refund.status);
            },
            RefundEventOutcome::Duplicate => {
                debug!("🧾️ Replayed refund event. Ledger untouched.");
            },
        }
        Ok(outcome)
    }

    async fn call_refund_initiated_hook(&self, order: &Order) {
        let Some(settlement) = order.settlement_details() else {
            error!("🧾️ Order {} was settled but carries no settlement details. This is a bug.", order.order_id);
            return;
        };
        for emitter in &self.producers.refund_initiated_producer {
            debug!("🧾️ Notifying refund initiated hook subscribers");
            let event = RefundInitiatedEvent::new(order.clone(), settlement.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
