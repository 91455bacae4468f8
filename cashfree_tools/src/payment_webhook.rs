use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A payment webhook delivery. The gateway retries these until it sees a 2xx, so the same
/// payload can arrive any number of times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhook {
    #[serde(rename = "type")]
    pub webhook_type: PaymentWebhookType,
    pub event_time: DateTime<Utc>,
    pub data: PaymentWebhookData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentWebhookType {
    #[serde(rename = "PAYMENT_SUCCESS_WEBHOOK")]
    Success,
    #[serde(rename = "PAYMENT_FAILED_WEBHOOK")]
    Failed,
    #[serde(rename = "PAYMENT_USER_DROPPED_WEBHOOK")]
    UserDropped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookData {
    pub order: WebhookOrder,
    pub payment: WebhookPayment,
    pub customer_details: Option<CustomerDetails>,
    pub error_details: Option<PaymentErrorDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookOrder {
    pub order_id: String,
    pub order_amount: Option<f64>,
    pub order_currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayment {
    /// The gateway's identifier for this payment attempt
    pub cf_payment_id: String,
    pub payment_status: String,
    pub payment_amount: f64,
    pub payment_currency: Option<String>,
    pub payment_message: Option<String>,
    pub payment_time: Option<DateTime<Utc>>,
    pub bank_reference: Option<String>,
    /// An object keyed by the instrument that was used, e.g. `{"upi": {...}}`
    pub payment_method: Option<Value>,
    pub payment_group: Option<String>,
}

impl WebhookPayment {
    /// Best-effort name of the payment instrument.
    pub fn method_name(&self) -> Option<String> {
        let from_method = match &self.payment_method {
            Some(Value::Object(map)) => map.keys().next().cloned(),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        from_method.or_else(|| self.payment_group.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentErrorDetails {
    pub error_code: Option<String>,
    pub error_description: Option<String>,
    pub error_reason: Option<String>,
    pub error_source: Option<String>,
}

impl PaymentErrorDetails {
    /// Collapses whichever fields the gateway filled in into one line for the attempt log.
    pub fn summary(&self) -> String {
        let parts = [&self.error_code, &self.error_reason, &self.error_description];
        let summary = parts.into_iter().flatten().cloned().collect::<Vec<String>>().join(": ");
        if summary.is_empty() {
            "No details given".to_string()
        } else {
            summary
        }
    }
}
