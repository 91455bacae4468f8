use std::fmt::Debug;

use log::*;

use crate::{
    ble_api::order_objects::{OrderQueryFilter, OrderStatement},
    db_types::{Order, OrderId, Payout, PayoutOrderEntry},
    traits::{LedgerManagement, LedgerQueryError},
};

/// Read-only view over the ledger, for admin screens and support tooling.
pub struct LedgerQueryApi<B> {
    db: B,
}

impl<B> Debug for LedgerQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerQueryApi")
    }
}

impl<B> LedgerQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> LedgerQueryApi<B>
where B: LedgerManagement
{
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, LedgerQueryError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    /// The full money trail for one order: order row, payment record, attempt log and refunds.
    /// Returns `None` if the order does not exist.
    pub async fn order_statement(&self, order_id: &OrderId) -> Result<Option<OrderStatement>, LedgerQueryError> {
        let Some(order) = self.db.fetch_order_by_order_id(order_id).await? else {
            return Ok(None);
        };
        let payment = self.db.fetch_payment_for_order(order_id).await?;
        let attempts = self.db.fetch_payment_attempts(order_id).await?;
        let refunds = self.db.fetch_refunds_for_order(order_id).await?;
        Ok(Some(OrderStatement { order, payment, attempts, refunds }))
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, LedgerQueryError> {
        trace!("💻️ Searching orders: {query}");
        self.db.search_orders(query).await
    }

    pub async fn payouts_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Payout>, LedgerQueryError> {
        self.db.fetch_payouts_for_restaurant(restaurant_id).await
    }

    /// A payout batch with its member orders. Returns `None` if the batch does not exist.
    pub async fn payout_statement(
        &self,
        payout_id: i64,
    ) -> Result<Option<(Payout, Vec<PayoutOrderEntry>)>, LedgerQueryError> {
        let Some(payout) = self.db.fetch_payout(payout_id).await? else {
            return Ok(None);
        };
        let members = self.db.fetch_payout_members(payout_id).await?;
        Ok(Some((payout, members)))
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
