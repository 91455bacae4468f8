use std::{fmt::Display, str::FromStr};

use ble_common::Paisa;
use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// A lightweight wrapper around the external order identifier assigned by the ordering service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

impl ConversionError {
    pub fn new<S: Into<String>>(msg: S) -> Self {
        Self(msg.into())
    }
}

//--------------------------------------     OrderStatus       -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order exists but no successful payment has been recorded yet.
    Pending,
    /// Payment has been captured in full and the order is live.
    Placed,
    /// The order was delivered and the post-delivery grace period has elapsed.
    Completed,
    /// The order was cancelled by one of the parties.
    Cancelled,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Placed => write!(f, "Placed"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Placed" => Ok(Self::Placed),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------   AcceptanceStatus    -------------------------------------------------------
/// The restaurant's decision on a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Rejected,
}

impl Display for AcceptanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptanceStatus::Pending => write!(f, "Pending"),
            AcceptanceStatus::Accepted => write!(f, "Accepted"),
            AcceptanceStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for AcceptanceStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid acceptance status: {s}"))),
        }
    }
}

//--------------------------------------    DeliveryStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// No rider has picked the job up yet.
    Pending,
    /// The delivery service has assigned the job.
    Accepted,
    /// The rider has collected the order from the restaurant.
    Dispatched,
    /// The order has been handed to the customer.
    Delivered,
    /// The delivery was called off before dispatch.
    Cancelled,
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Pending => write!(f, "Pending"),
            DeliveryStatus::Accepted => write!(f, "Accepted"),
            DeliveryStatus::Dispatched => write!(f, "Dispatched"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
            DeliveryStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Accepted" => Ok(Self::Accepted),
            "Dispatched" => Ok(Self::Dispatched),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid delivery status: {s}"))),
        }
    }
}

//--------------------------------------     RefundStatus      -------------------------------------------------------
/// Tracks the refund lifecycle on the order itself as well as on individual refund records.
///
/// `ApprovalPending` only ever appears on orders. It marks a cancellation that needs an
/// operator to decide the settlement split before any money moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum RefundStatus {
    ApprovalPending,
    Pending,
    Success,
    Failed,
}

impl Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefundStatus::ApprovalPending => write!(f, "ApprovalPending"),
            RefundStatus::Pending => write!(f, "Pending"),
            RefundStatus::Success => write!(f, "Success"),
            RefundStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for RefundStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ApprovalPending" => Ok(Self::ApprovalPending),
            "Pending" => Ok(Self::Pending),
            "Success" => Ok(Self::Success),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid refund status: {s}"))),
        }
    }
}

impl RefundStatus {
    /// A refund in one of these states blocks its order from entering a payout batch.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RefundStatus::ApprovalPending | RefundStatus::Pending)
    }
}

//--------------------------------------      CancelledBy      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum CancelledBy {
    Customer,
    Vendor,
    Admin,
    DeliveryService,
}

impl Display for CancelledBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelledBy::Customer => write!(f, "Customer"),
            CancelledBy::Vendor => write!(f, "Vendor"),
            CancelledBy::Admin => write!(f, "Admin"),
            CancelledBy::DeliveryService => write!(f, "DeliveryService"),
        }
    }
}

impl FromStr for CancelledBy {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Vendor" => Ok(Self::Vendor),
            "Admin" => Ok(Self::Admin),
            "DeliveryService" => Ok(Self::DeliveryService),
            s => Err(ConversionError(format!("Invalid cancelling party: {s}"))),
        }
    }
}

//--------------------------------------     PaymentStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------      AttemptKind      -------------------------------------------------------
/// The kind of payment attempt the gateway reported. Together with the external payment id this
/// forms the idempotency key for payment webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum AttemptKind {
    Success,
    Failed,
    UserDropped,
}

impl Display for AttemptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptKind::Success => write!(f, "Success"),
            AttemptKind::Failed => write!(f, "Failed"),
            AttemptKind::UserDropped => write!(f, "UserDropped"),
        }
    }
}

impl FromStr for AttemptKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(Self::Success),
            "Failed" => Ok(Self::Failed),
            "UserDropped" => Ok(Self::UserDropped),
            s => Err(ConversionError(format!("Invalid payment attempt kind: {s}"))),
        }
    }
}

//--------------------------------------      PayoutStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PayoutStatus {
    /// The batch exists and a transfer may or may not have reached the gateway.
    Init,
    /// The gateway confirmed the transfer. Member orders are stamped.
    Complete,
    /// The transfer failed or was never registered. Member orders are released.
    Failed,
}

impl Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoutStatus::Init => write!(f, "Init"),
            PayoutStatus::Complete => write!(f, "Complete"),
            PayoutStatus::Failed => write!(f, "Failed"),
        }
    }
}

impl FromStr for PayoutStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Init" => Ok(Self::Init),
            "Complete" => Ok(Self::Complete),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payout status: {s}"))),
        }
    }
}

//--------------------------------------    InvoiceBreakout    -------------------------------------------------------
/// The itemised charges that make up an order's total price, stored as a JSON document on the
/// order row. The refund settlement, once decided, is recorded inside the same document so the
/// full money trail for an order lives in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceBreakout {
    pub item_total: Paisa,
    pub packaging_charge: Paisa,
    pub delivery_charge: Paisa,
    pub platform_fee: Paisa,
    pub gst: Paisa,
    pub discount: Paisa,
    pub refund_settlement_details: Option<RefundSettlementDetails>,
}

impl InvoiceBreakout {
    pub fn total(&self) -> Paisa {
        self.item_total + self.packaging_charge + self.delivery_charge + self.platform_fee + self.gst - self.discount
    }
}

//-------------------------------- RefundSettlementDetails -----------------------------------------------------------
/// How the paid amount of a cancelled order was split between the parties. The vendor share may
/// be negative when the restaurant owes the platform for a cancellation it caused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundSettlementDetails {
    pub vendor_payout_amount: Paisa,
    pub delivery_charge_amount: Paisa,
    pub customer_refund_amount: Paisa,
    pub notes: Option<String>,
    pub settled_at: DateTime<Utc>,
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub restaurant_id: String,
    pub customer_id: String,
    pub order_status: OrderStatus,
    pub acceptance_status: AcceptanceStatus,
    pub delivery_status: DeliveryStatus,
    pub refund_status: Option<RefundStatus>,
    pub cancelled_by: Option<CancelledBy>,
    pub total_price: Paisa,
    /// The restaurant's share of a completed order. Set when the order is created and consumed
    /// by the payout reconciler.
    pub vendor_payout_amount: Option<Paisa>,
    /// The transfer id of the payout batch that settled this order. Stamped exactly once.
    pub payout_transaction_id: Option<String>,
    pub invoice_breakout: Json<InvoiceBreakout>,
    pub placed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn settlement_details(&self) -> Option<&RefundSettlementDetails> {
        self.invoice_breakout.refund_settlement_details.as_ref()
    }

    pub fn is_paid_out(&self) -> bool {
        self.payout_transaction_id.is_some()
    }

    /// The amount this order would contribute to a payout batch, if it is in a payable state.
    pub fn payout_contribution(&self) -> Option<Paisa> {
        match self.order_status {
            OrderStatus::Completed => self.vendor_payout_amount,
            OrderStatus::Cancelled => self.settlement_details().map(|s| s.vendor_payout_amount),
            _ => None,
        }
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} for {} at restaurant {} [{}/{}/{}] {}",
            self.order_id,
            self.customer_id,
            self.restaurant_id,
            self.order_status,
            self.acceptance_status,
            self.delivery_status,
            self.total_price
        )
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    /// The order_id as assigned by the ordering service
    pub order_id: OrderId,
    pub restaurant_id: String,
    pub customer_id: String,
    /// The grand total the customer pays, in paisa
    pub total_price: Paisa,
    /// The restaurant's share once the order completes. `None` means the pricing service has not
    /// supplied it yet, and the order can never enter a payout batch as a completed order.
    pub vendor_payout_amount: Option<Paisa>,
    pub invoice_breakout: InvoiceBreakout,
    /// The time the order was created on the ordering service
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new<S1, S2>(order_id: OrderId, restaurant_id: S1, customer_id: S2, total_price: Paisa) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            order_id,
            restaurant_id: restaurant_id.into(),
            customer_id: customer_id.into(),
            total_price,
            vendor_payout_amount: None,
            invoice_breakout: InvoiceBreakout::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_vendor_payout(mut self, amount: Paisa) -> Self {
        self.vendor_payout_amount = Some(amount);
        self
    }

    pub fn with_breakout(mut self, breakout: InvoiceBreakout) -> Self {
        self.invoice_breakout = breakout;
        self
    }

    pub fn is_equivalent(&self, order: &Order) -> bool {
        self.order_id == order.order_id
            && self.restaurant_id == order.restaurant_id
            && self.customer_id == order.customer_id
            && self.total_price == order.total_price
    }
}

impl Display for NewOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NewOrder {} for {} at restaurant {} ({})",
            self.order_id, self.customer_id, self.restaurant_id, self.total_price
        )
    }
}

//--------------------------------------        Payment        -------------------------------------------------------
/// The single payment record attached to an order. Individual gateway callbacks land in
/// [`PaymentAttempt`] rows; this record tracks the aggregate outcome.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: OrderId,
    pub amount: Paisa,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     PaymentAttempt    -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentAttempt {
    pub id: i64,
    pub payment_id: i64,
    pub order_id: OrderId,
    pub external_payment_id: String,
    pub kind: AttemptKind,
    pub payment_method: Option<String>,
    pub error_detail: Option<String>,
    pub event_time: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
}

//--------------------------------------     PaymentEvent      -------------------------------------------------------
/// A payment webhook, converted into neutral engine terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub order_id: OrderId,
    /// The gateway's identifier for this payment attempt
    pub external_payment_id: String,
    pub kind: AttemptKind,
    pub amount: Paisa,
    pub payment_method: Option<String>,
    pub error_detail: Option<String>,
    /// When the gateway says the event happened, as opposed to when we received it
    pub event_time: DateTime<Utc>,
}

impl PaymentEvent {
    pub fn new<S: Into<String>>(order_id: OrderId, external_payment_id: S, kind: AttemptKind, amount: Paisa) -> Self {
        Self {
            order_id,
            external_payment_id: external_payment_id.into(),
            kind,
            amount,
            payment_method: None,
            error_detail: None,
            event_time: Utc::now(),
        }
    }

    pub fn with_method<S: Into<String>>(mut self, method: S) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_error_detail<S: Into<String>>(mut self, detail: S) -> Self {
        self.error_detail = Some(detail.into());
        self
    }

    pub fn with_event_time(mut self, at: DateTime<Utc>) -> Self {
        self.event_time = at;
        self
    }
}

impl Display for PaymentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PaymentEvent[{}] {} on order {} for {}",
            self.kind, self.external_payment_id, self.order_id, self.amount
        )
    }
}

//--------------------------------------        Refund         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Refund {
    pub id: i64,
    /// The gateway's refund identifier, used to deduplicate refund webhooks
    pub refund_id: String,
    pub order_id: OrderId,
    /// The gateway payment the refund draws from
    pub payment_id: String,
    pub amount: Paisa,
    pub charges: Paisa,
    pub status: RefundStatus,
    pub status_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

//--------------------------------------      RefundEvent      -------------------------------------------------------
/// A refund webhook, converted into neutral engine terms. `status` is never
/// [`RefundStatus::ApprovalPending`]; that state exists only inside the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundEvent {
    pub refund_id: String,
    pub order_id: OrderId,
    pub payment_id: String,
    pub amount: Paisa,
    pub charges: Paisa,
    pub status: RefundStatus,
    pub status_description: Option<String>,
    pub event_time: DateTime<Utc>,
}

impl RefundEvent {
    pub fn new<S1, S2>(refund_id: S1, order_id: OrderId, payment_id: S2, amount: Paisa, status: RefundStatus) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            refund_id: refund_id.into(),
            order_id,
            payment_id: payment_id.into(),
            amount,
            charges: Paisa::default(),
            status,
            status_description: None,
            event_time: Utc::now(),
        }
    }

    pub fn with_charges(mut self, charges: Paisa) -> Self {
        self.charges = charges;
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.status_description = Some(description.into());
        self
    }

    pub fn with_event_time(mut self, at: DateTime<Utc>) -> Self {
        self.event_time = at;
        self
    }
}

impl Display for RefundEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefundEvent[{}] {} on order {} for {}", self.status, self.refund_id, self.order_id, self.amount)
    }
}

//--------------------------------------   RefundSettlement    -------------------------------------------------------
/// An operator's decision on how to split a cancelled order's paid amount. Totals are not forced
/// to match the order price; the vendor share may be negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundSettlement {
    pub vendor_payout_amount: Paisa,
    pub delivery_charge_amount: Paisa,
    pub customer_refund_amount: Paisa,
    pub notes: Option<String>,
}

impl RefundSettlement {
    pub fn total(&self) -> Paisa {
        self.vendor_payout_amount + self.delivery_charge_amount + self.customer_refund_amount
    }

    pub fn into_details(self, settled_at: DateTime<Utc>) -> RefundSettlementDetails {
        RefundSettlementDetails {
            vendor_payout_amount: self.vendor_payout_amount,
            delivery_charge_amount: self.delivery_charge_amount,
            customer_refund_amount: self.customer_refund_amount,
            notes: self.notes,
            settled_at,
        }
    }

    /// The standard split for cancellations that are not the customer's fault: the customer gets
    /// everything back and the restaurant gets nothing.
    pub fn full_refund(order: &Order) -> Self {
        Self {
            vendor_payout_amount: Paisa::default(),
            delivery_charge_amount: Paisa::default(),
            customer_refund_amount: order.total_price,
            notes: None,
        }
    }
}

//--------------------------------------        Payout         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Payout {
    pub id: i64,
    pub restaurant_id: String,
    pub status: PayoutStatus,
    /// The sum of the member orders' contributions
    pub total_order_amount: Paisa,
    /// The platform's transaction charge withheld from the total
    pub transaction_charges: Paisa,
    /// What the restaurant actually receives: total minus charges
    pub amount_paid_to_vendor: Paisa,
    /// The idempotency key sent to the payout gateway, and the value stamped onto member orders
    pub transfer_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Display for Payout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Payout {} [{}] to restaurant {}: {} less {} charges = {}",
            self.transfer_id,
            self.status,
            self.restaurant_id,
            self.total_order_amount,
            self.transaction_charges,
            self.amount_paid_to_vendor
        )
    }
}

//--------------------------------------       NewPayout       -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewPayout {
    pub restaurant_id: String,
    pub total_order_amount: Paisa,
    pub transaction_charges: Paisa,
    pub amount_paid_to_vendor: Paisa,
    pub transfer_id: String,
}

//--------------------------------------    PayoutOrderEntry   -------------------------------------------------------
/// One order's membership in a payout batch, with the amount it contributed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PayoutOrderEntry {
    pub order_id: OrderId,
    pub amount: Paisa,
}
