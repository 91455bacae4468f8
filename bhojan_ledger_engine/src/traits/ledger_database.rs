use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    db_types::{
        CancelledBy,
        NewOrder,
        NewPayout,
        Order,
        OrderId,
        PaymentEvent,
        Payout,
        PayoutOrderEntry,
        RefundEvent,
        RefundSettlement,
    },
    state::{DeliveryEvent, TransitionError, VendorDecision},
    traits::{
        data_objects::{CancellationOutcome, PaymentEventOutcome, RefundEventOutcome},
        LedgerManagement,
        LedgerQueryError,
    },
};

/// This trait defines the highest level of behaviour for backends supporting the lifecycle
/// engine.
///
/// This behaviour includes:
/// * Idempotent ingestion of payment and refund webhooks.
/// * Driving the order, acceptance, delivery and refund state machines, atomically per event.
/// * Payout batch bookkeeping: eligibility queries, batch creation, exactly-once stamping of
///   member orders and the per-restaurant advisory lock.
///
/// Every method that mutates state runs inside a single database transaction, so a crash leaves
/// the ledger either before or after the event, never in between.
#[allow(async_fn_in_trait)]
pub trait LedgerDatabase: Clone + LedgerManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a new order and, in a single atomic transaction, stores the order together with its
    /// pending payment record. This call is idempotent.
    ///
    /// Returns the order and `true` if it was inserted, or the existing order and `false` if it
    /// already existed.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError>;

    /// Applies one payment webhook to the ledger.
    ///
    /// The `(external_payment_id, kind)` pair is the idempotency key: a replay inserts nothing,
    /// changes nothing, and reports [`PaymentEventOutcome::Duplicate`]. A first-seen event is
    /// appended to the attempt log, and a successful attempt on a `Pending` order marks the
    /// payment `Completed` and the order `Placed` in the same transaction.
    ///
    /// A success for an order that is no longer `Pending` (a second gateway payment, or a
    /// payment that raced a cancellation) is recorded in the attempt log but triggers no
    /// transition.
    async fn apply_payment_event(&self, event: PaymentEvent) -> Result<PaymentEventOutcome, LedgerError>;

    /// Records the restaurant's accept/reject decision on a placed order.
    ///
    /// A rejection cancels the order on the vendor's behalf and auto-settles a full refund to
    /// the customer, all in the same transaction. The returned outcome flags whether a refund
    /// was opened so callers can fire the refund hook.
    async fn record_vendor_decision(
        &self,
        order_id: &OrderId,
        decision: VendorDecision,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, LedgerError>;

    /// Records a delivery service event (`Accept`, `Dispatch` or `Deliver`) against the order.
    /// `Deliver` stamps `delivered_at` but leaves the order `Placed`; the completion sweep
    /// finalises it later.
    ///
    /// [`DeliveryEvent::Cancel`] is not accepted here. Cancellations route through
    /// [`cancel_order`](Self::cancel_order) so the refund disposition is decided in one place.
    async fn record_delivery_event(
        &self,
        order_id: &OrderId,
        event: DeliveryEvent,
        now: DateTime<Utc>,
    ) -> Result<Order, LedgerError>;

    /// Cancels the order on behalf of `by` and decides the refund disposition.
    ///
    /// * An unpaid (`Pending`) order cancels with no refund.
    /// * A paid order cancelled inside `free_window` of its placement, or cancelled by the
    ///   vendor or the delivery service, auto-settles a full refund to the customer.
    /// * Any other paid cancellation parks the order at `ApprovalPending` for an operator.
    ///
    /// The delivery job is cancelled alongside when its own state machine allows it; an order
    /// already `Dispatched` keeps its delivery status and only the order-level cancel applies.
    async fn cancel_order(
        &self,
        order_id: &OrderId,
        by: CancelledBy,
        free_window: Duration,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, LedgerError>;

    /// Moves orders that were delivered at least `min_age` ago from `Placed` to `Completed`.
    ///
    /// The result is the list of orders that were completed in this sweep.
    async fn complete_delivered_orders(&self, min_age: Duration, now: DateTime<Utc>) -> Result<Vec<Order>, LedgerError>;

    /// Opens a refund approval on a cancelled order, moving its refund status to
    /// `ApprovalPending`. A previously `Failed` refund may be reopened this way.
    ///
    /// ## Failure modes:
    /// - The order is not cancelled ([`LedgerError::RefundNotAllowed`]).
    /// - The order has already been settled by a payout batch ([`LedgerError::AlreadyPaidOut`]).
    /// - A refund is already open or has already succeeded.
    async fn mark_order_for_refund(&self, order_id: &OrderId) -> Result<Order, LedgerError>;

    /// Records an operator's settlement split on an `ApprovalPending` order and releases the
    /// refund for execution by moving the refund status to `Pending`. The split is written into
    /// the order's invoice breakout document.
    async fn settle_order_refund(
        &self,
        order_id: &OrderId,
        settlement: RefundSettlement,
        now: DateTime<Utc>,
    ) -> Result<Order, LedgerError>;

    /// Applies one refund webhook to the ledger. `refund_id` is the idempotency key.
    ///
    /// The first event for a refund id inserts the refund record. A terminal event (`Success`
    /// or `Failed`) also moves the order's refund status, whether or not an initiation event
    /// was seen first. Replays and late events after a terminal state are reported as
    /// [`RefundEventOutcome::Duplicate`].
    async fn apply_refund_event(&self, event: RefundEvent) -> Result<RefundEventOutcome, LedgerError>;

    /// Tries to take the advisory payout lock for a restaurant. Returns `false` when another
    /// live run holds it. A lock older than `stale_after` is presumed abandoned by a crashed
    /// run and is taken over.
    async fn acquire_payout_lock(
        &self,
        restaurant_id: &str,
        stale_after: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError>;

    async fn release_payout_lock(&self, restaurant_id: &str) -> Result<(), LedgerError>;

    /// The restaurants the reconciler must visit: those with payable orders plus those with an
    /// unresolved `Init` batch left over from an earlier run.
    async fn restaurants_due_for_payout(&self) -> Result<Vec<String>, LedgerError>;

    /// Unresolved (`Init`) payout batches for the restaurant, oldest first.
    async fn unresolved_payouts(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerError>;

    /// The orders currently eligible to enter a payout batch for this restaurant, with the
    /// amount each contributes.
    ///
    /// Eligible are completed-and-delivered orders with a vendor payout amount, and cancelled
    /// orders whose refund settlement is decided and not in flight. Orders already stamped or
    /// sitting in a live `Init` batch never appear.
    async fn payable_orders(&self, restaurant_id: &str) -> Result<Vec<PayoutOrderEntry>, LedgerError>;

    /// Completed-and-delivered orders that would be payable except that no vendor payout amount
    /// was ever recorded. These are skipped by the reconciler and need operator attention.
    async fn orders_missing_payout_amount(&self, restaurant_id: &str) -> Result<Vec<OrderId>, LedgerError>;

    /// Creates a payout batch in `Init` state with its member orders, atomically.
    async fn create_payout(&self, payout: NewPayout, members: &[PayoutOrderEntry]) -> Result<Payout, LedgerError>;

    /// Marks a batch `Complete` and stamps its members' `payout_transaction_id`, atomically.
    /// The stamping update only touches rows that are still unstamped, so the stamp is applied
    /// exactly once even if the batch resolution is replayed.
    ///
    /// Returns the updated batch and the number of orders stamped.
    async fn complete_payout(&self, payout_id: i64) -> Result<(Payout, u64), LedgerError>;

    /// Marks a batch `Failed`. Its member orders become payable again in the next run.
    async fn fail_payout(&self, payout_id: i64) -> Result<Payout, LedgerError>;

    /// Orders whose `payout_transaction_id` does not match any payout batch. A non-empty result
    /// means the ledger was tampered with or a bug stamped outside the reconciler.
    async fn orphaned_payout_stamps(&self) -> Result<Vec<Order>, LedgerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("We have an internal database error (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} has already been settled by payout transfer {1}")]
    AlreadyPaidOut(OrderId, String),
    #[error("A refund cannot be opened for order {0}: {1}")]
    RefundNotAllowed(OrderId, String),
    #[error("{0}")]
    QueryError(#[from] LedgerQueryError),
    #[error("{0}")]
    InvalidTransition(#[from] TransitionError),
    #[error("Ledger integrity violation: {0}")]
    IntegrityViolation(String),
    #[error("The requested payout batch (internal id {0}) does not exist")]
    PayoutNotFound(i64),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
