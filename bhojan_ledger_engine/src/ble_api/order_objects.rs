use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderId, OrderStatus, Payment, PaymentAttempt, Refund, RefundStatus},
    traits::LedgerQueryError,
};

/// Everything the ledger knows about one order: the order row, its payment record, the raw
/// attempt log and any refunds. This is the shape the admin order view returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatement {
    pub order: Order,
    pub payment: Option<Payment>,
    pub attempts: Vec<PaymentAttempt>,
    pub refunds: Vec<Refund>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub restaurant_id: Option<String>,
    pub customer_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<Vec<OrderStatus>>,
    pub refund_status: Option<Vec<RefundStatus>>,
}

impl OrderQueryFilter {
    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_restaurant_id<S: Into<String>>(mut self, restaurant_id: S) -> Self {
        self.restaurant_id = Some(restaurant_id.into());
        self
    }

    pub fn with_customer_id<S: Into<String>>(mut self, customer_id: S) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, LedgerQueryError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| LedgerQueryError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, LedgerQueryError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| LedgerQueryError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_refund_status(mut self, status: RefundStatus) -> Self {
        self.refund_status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() &&
            self.restaurant_id.is_none() &&
            self.customer_id.is_none() &&
            self.status.is_none() &&
            self.refund_status.is_none() &&
            self.since.is_none() &&
            self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(order_id) = &self.order_id {
            write!(f, "order_id: {order_id}. ")?;
        }
        if let Some(restaurant_id) = &self.restaurant_id {
            write!(f, "restaurant_id: {restaurant_id}. ")?;
        }
        if let Some(customer_id) = &self.customer_id {
            write!(f, "customer_id: {customer_id}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if let Some(statuses) = &self.status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "status in ({statuses}). ")?;
        }
        if let Some(statuses) = &self.refund_status {
            let statuses = statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "refund_status in ({statuses}). ")?;
        }
        Ok(())
    }
}
