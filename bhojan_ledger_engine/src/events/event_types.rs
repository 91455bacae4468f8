use serde::{Deserialize, Serialize};

use crate::db_types::{Order, RefundSettlementDetails};

/// Fired when a successful payment moves an order to `Placed`. This is the signal downstream
/// services key off to start preparing and dispatching food.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
}

impl OrderPlacedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Fired when a refund settlement is released for execution, whether an operator decided the
/// split or the engine auto-settled it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundInitiatedEvent {
    pub order: Order,
    pub settlement: RefundSettlementDetails,
}

impl RefundInitiatedEvent {
    pub fn new(order: Order, settlement: RefundSettlementDetails) -> Self {
        Self { order, settlement }
    }
}
