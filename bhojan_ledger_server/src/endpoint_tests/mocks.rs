use bhojan_ledger_engine::{
    db_types::{
        CancelledBy,
        NewOrder,
        NewPayout,
        Order,
        OrderId,
        Payment,
        PaymentAttempt,
        PaymentEvent,
        Payout,
        PayoutOrderEntry,
        Refund,
        RefundEvent,
        RefundSettlement,
    },
    order_objects::OrderQueryFilter,
    state::{DeliveryEvent, VendorDecision},
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
use chrono::{DateTime, Duration, Utc};
use mockall::mock;

mock! {
    pub Ledger {}

    impl Clone for Ledger {
        fn clone(&self) -> Self;
    }

    impl LedgerManagement for Ledger {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerQueryError>;
        async fn fetch_payment_for_order(&self, order_id: &OrderId) -> Result<Option<Payment>, LedgerQueryError>;
        async fn fetch_payment_attempts(&self, order_id: &OrderId) -> Result<Vec<PaymentAttempt>, LedgerQueryError>;
        async fn fetch_refunds_for_order(&self, order_id: &OrderId) -> Result<Vec<Refund>, LedgerQueryError>;
        async fn fetch_refund_by_refund_id(&self, refund_id: &str) -> Result<Option<Refund>, LedgerQueryError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerQueryError>;
        async fn fetch_payout(&self, payout_id: i64) -> Result<Option<Payout>, LedgerQueryError>;
        async fn fetch_payouts_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerQueryError>;
        async fn fetch_payout_members(&self, payout_id: i64) -> Result<Vec<PayoutOrderEntry>, LedgerQueryError>;
    }

    impl LedgerDatabase for Ledger {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError>;
        async fn apply_payment_event(&self, event: PaymentEvent) -> Result<PaymentEventOutcome, LedgerError>;
        async fn record_vendor_decision(
            &self,
            order_id: &OrderId,
            decision: VendorDecision,
            now: DateTime<Utc>,
        ) -> Result<CancellationOutcome, LedgerError>;
        async fn record_delivery_event(
            &self,
            order_id: &OrderId,
            event: DeliveryEvent,
            now: DateTime<Utc>,
        ) -> Result<Order, LedgerError>;
        async fn cancel_order(
            &self,
            order_id: &OrderId,
            by: CancelledBy,
            free_window: Duration,
            now: DateTime<Utc>,
        ) -> Result<CancellationOutcome, LedgerError>;
        async fn complete_delivered_orders(&self, min_age: Duration, now: DateTime<Utc>) -> Result<Vec<Order>, LedgerError>;
        async fn mark_order_for_refund(&self, order_id: &OrderId) -> Result<Order, LedgerError>;
        async fn settle_order_refund(
            &self,
            order_id: &OrderId,
            settlement: RefundSettlement,
            now: DateTime<Utc>,
        ) -> Result<Order, LedgerError>;
        async fn apply_refund_event(&self, event: RefundEvent) -> Result<RefundEventOutcome, LedgerError>;
        async fn acquire_payout_lock(
            &self,
            restaurant_id: &str,
            stale_after: Duration,
            now: DateTime<Utc>,
        ) -> Result<bool, LedgerError>;
        async fn release_payout_lock(&self, restaurant_id: &str) -> Result<(), LedgerError>;
        async fn restaurants_due_for_payout(&self) -> Result<Vec<String>, LedgerError>;
        async fn unresolved_payouts(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerError>;
        async fn payable_orders(&self, restaurant_id: &str) -> Result<Vec<PayoutOrderEntry>, LedgerError>;
        async fn orders_missing_payout_amount(&self, restaurant_id: &str) -> Result<Vec<OrderId>, LedgerError>;
        async fn create_payout(&self, payout: NewPayout, members: &[PayoutOrderEntry]) -> Result<Payout, LedgerError>;
        async fn complete_payout(&self, payout_id: i64) -> Result<(Payout, u64), LedgerError>;
        async fn fail_payout(&self, payout_id: i64) -> Result<Payout, LedgerError>;
        async fn orphaned_payout_stamps(&self) -> Result<Vec<Order>, LedgerError>;
    }
}
