//! The transition tables that govern every status column in the ledger.
//!
//! Database code never writes a status directly; it asks one of these functions for the
//! successor state and propagates [`TransitionError`] when the move is not in the table. All
//! functions are pure so the tables can be tested without a database.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{
    AcceptanceStatus,
    AttemptKind,
    ConversionError,
    DeliveryStatus,
    OrderStatus,
    PaymentStatus,
    PayoutStatus,
    RefundStatus,
};

/// An event/state pair that the transition tables do not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal {concern} transition from {from} on {event}")]
pub struct TransitionError {
    pub concern: &'static str,
    pub from: String,
    pub event: String,
}

impl TransitionError {
    pub fn new<F: Display, E: Display>(concern: &'static str, from: F, event: E) -> Self {
        Self { concern, from: from.to_string(), event: event.to_string() }
    }
}

//--------------------------------------     Order events      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEvent {
    PaymentSucceeded,
    Delivered,
    Cancel,
}

impl Display for OrderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEvent::PaymentSucceeded => write!(f, "PaymentSucceeded"),
            OrderEvent::Delivered => write!(f, "Delivered"),
            OrderEvent::Cancel => write!(f, "Cancel"),
        }
    }
}

pub fn next_order_status(from: OrderStatus, event: OrderEvent) -> Result<OrderStatus, TransitionError> {
    use OrderStatus::*;
    match (from, event) {
        (Pending, OrderEvent::PaymentSucceeded) => Ok(Placed),
        (Placed, OrderEvent::Delivered) => Ok(Completed),
        (Pending | Placed, OrderEvent::Cancel) => Ok(Cancelled),
        (from, event) => Err(TransitionError::new("order", from, event)),
    }
}

//--------------------------------------    Vendor decision    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorDecision {
    Accept,
    Reject,
}

impl Display for VendorDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VendorDecision::Accept => write!(f, "Accept"),
            VendorDecision::Reject => write!(f, "Reject"),
        }
    }
}

impl FromStr for VendorDecision {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accept" => Ok(Self::Accept),
            "Reject" => Ok(Self::Reject),
            s => Err(ConversionError::new(format!("Invalid vendor decision: {s}"))),
        }
    }
}

pub fn next_acceptance_status(
    from: AcceptanceStatus,
    decision: VendorDecision,
) -> Result<AcceptanceStatus, TransitionError> {
    use AcceptanceStatus::*;
    match (from, decision) {
        (Pending, VendorDecision::Accept) => Ok(Accepted),
        (Pending, VendorDecision::Reject) => Ok(Rejected),
        (from, decision) => Err(TransitionError::new("acceptance", from, decision)),
    }
}

//--------------------------------------    Delivery events    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryEvent {
    Accept,
    Dispatch,
    Deliver,
    Cancel,
}

impl Display for DeliveryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryEvent::Accept => write!(f, "Accept"),
            DeliveryEvent::Dispatch => write!(f, "Dispatch"),
            DeliveryEvent::Deliver => write!(f, "Deliver"),
            DeliveryEvent::Cancel => write!(f, "Cancel"),
        }
    }
}

impl FromStr for DeliveryEvent {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accept" => Ok(Self::Accept),
            "Dispatch" => Ok(Self::Dispatch),
            "Deliver" => Ok(Self::Deliver),
            "Cancel" => Ok(Self::Cancel),
            s => Err(ConversionError::new(format!("Invalid delivery event: {s}"))),
        }
    }
}

pub fn next_delivery_status(from: DeliveryStatus, event: DeliveryEvent) -> Result<DeliveryStatus, TransitionError> {
    use DeliveryStatus::*;
    match (from, event) {
        (Pending, DeliveryEvent::Accept) => Ok(Accepted),
        (Accepted, DeliveryEvent::Dispatch) => Ok(Dispatched),
        (Dispatched, DeliveryEvent::Deliver) => Ok(Delivered),
        (Pending | Accepted, DeliveryEvent::Cancel) => Ok(Cancelled),
        (from, event) => Err(TransitionError::new("delivery", from, event)),
    }
}

//--------------------------------------     Refund events     -------------------------------------------------------
/// Moves in the refund lifecycle. `Open` and `Settle` are operator actions, `AutoSettle` is the
/// engine settling on the operator's behalf (free-window and no-fault cancellations), and the
/// terminal events arrive from the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundFlowEvent {
    Open,
    Settle,
    AutoSettle,
    Succeed,
    Fail,
}

impl Display for RefundFlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefundFlowEvent::Open => write!(f, "Open"),
            RefundFlowEvent::Settle => write!(f, "Settle"),
            RefundFlowEvent::AutoSettle => write!(f, "AutoSettle"),
            RefundFlowEvent::Succeed => write!(f, "Succeed"),
            RefundFlowEvent::Fail => write!(f, "Fail"),
        }
    }
}

/// The refund table starts from `Option<RefundStatus>` because most orders have no refund state
/// at all. A `Failed` refund may be reopened; every other state is a dead end for `Open`.
pub fn next_refund_status(
    from: Option<RefundStatus>,
    event: RefundFlowEvent,
) -> Result<RefundStatus, TransitionError> {
    use RefundStatus::*;
    match (from, event) {
        (None | Some(Failed), RefundFlowEvent::Open) => Ok(ApprovalPending),
        (None | Some(Failed), RefundFlowEvent::AutoSettle) => Ok(Pending),
        (Some(ApprovalPending), RefundFlowEvent::Settle) => Ok(Pending),
        (Some(Pending), RefundFlowEvent::Succeed) => Ok(Success),
        (Some(Pending), RefundFlowEvent::Fail) => Ok(Failed),
        (from, event) => {
            let from = from.map(|s| s.to_string()).unwrap_or_else(|| "None".to_string());
            Err(TransitionError::new("refund", from, event))
        },
    }
}

//--------------------------------------    Payment events     -------------------------------------------------------
/// Failed and dropped attempts never move the payment record; the customer can retry until a
/// success arrives or the order is cancelled.
pub fn next_payment_status(from: PaymentStatus, kind: AttemptKind) -> Result<PaymentStatus, TransitionError> {
    use PaymentStatus::*;
    match (from, kind) {
        (Pending, AttemptKind::Success) => Ok(Completed),
        (Pending, AttemptKind::Failed | AttemptKind::UserDropped) => Ok(Pending),
        (from, kind) => Err(TransitionError::new("payment", from, kind)),
    }
}

//--------------------------------------     Payout events     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutEvent {
    TransferSucceeded,
    TransferFailed,
}

impl Display for PayoutEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutEvent::TransferSucceeded => write!(f, "TransferSucceeded"),
            PayoutEvent::TransferFailed => write!(f, "TransferFailed"),
        }
    }
}

/// Payout batches resolve exactly once. There are no moves out of `Complete` or `Failed`.
pub fn next_payout_status(from: PayoutStatus, event: PayoutEvent) -> Result<PayoutStatus, TransitionError> {
    use PayoutStatus::*;
    match (from, event) {
        (Init, PayoutEvent::TransferSucceeded) => Ok(Complete),
        (Init, PayoutEvent::TransferFailed) => Ok(Failed),
        (from, event) => Err(TransitionError::new("payout", from, event)),
    }
}
