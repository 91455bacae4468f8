use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, Payment, PaymentAttempt, Payout, PayoutOrderEntry, Refund},
    order_objects::OrderQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum LedgerQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for LedgerQueryError {
    fn from(e: sqlx::Error) -> Self {
        LedgerQueryError::DatabaseError(e.to_string())
    }
}

/// Read-only queries over the ledger.
///
/// [`LedgerDatabase`](crate::traits::LedgerDatabase) handles the actual machinery of moving
/// orders, refunds and payouts through their lifecycles. `LedgerManagement` provides methods
/// for inspecting that state, and is all the query API and the read-only HTTP routes need.
#[allow(async_fn_in_trait)]
pub trait LedgerManagement {
    /// Fetches the order with the given external order id. If no order exists, `None` is returned.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerQueryError>;

    /// Fetches the payment record for the order, if the order exists.
    async fn fetch_payment_for_order(&self, order_id: &OrderId) -> Result<Option<Payment>, LedgerQueryError>;

    /// Fetches the append-only log of gateway payment attempts for the order, oldest first.
    async fn fetch_payment_attempts(&self, order_id: &OrderId) -> Result<Vec<PaymentAttempt>, LedgerQueryError>;

    /// Fetches every refund record raised against the order, oldest first.
    async fn fetch_refunds_for_order(&self, order_id: &OrderId) -> Result<Vec<Refund>, LedgerQueryError>;

    /// Fetches a refund by the gateway's refund id.
    async fn fetch_refund_by_refund_id(&self, refund_id: &str) -> Result<Option<Refund>, LedgerQueryError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerQueryError>;

    /// Fetches a payout batch by its internal id.
    async fn fetch_payout(&self, payout_id: i64) -> Result<Option<Payout>, LedgerQueryError>;

    /// Fetches all payout batches for a restaurant, newest first.
    async fn fetch_payouts_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerQueryError>;

    /// Fetches the orders that make up a payout batch, with their contributed amounts.
    async fn fetch_payout_members(&self, payout_id: i64) -> Result<Vec<PayoutOrderEntry>, LedgerQueryError>;
}
