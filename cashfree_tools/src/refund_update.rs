use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A refund status message from the worker channel. `refund_id` is the gateway's identifier
/// and doubles as the dedup key; deliveries are at-least-once here too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundUpdate {
    pub refund_id: String,
    pub order_id: String,
    /// The gateway payment the refund draws from
    pub payment_id: String,
    pub customer_id: Option<String>,
    pub refund_gateway: Option<String>,
    pub refund_amount: f64,
    pub refund_charges: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    /// One of PENDING, SUCCESS, FAILED or CANCELLED
    pub refund_status: String,
    pub status_description: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deserializes_worker_message() {
        let payload = r#"{
          "refund_id": "rf_889021",
          "order_id": "ORD-1001",
          "payment_id": "5114911130",
          "customer_id": "cust-77",
          "refund_gateway": "CASHFREE",
          "refund_amount": 142.00,
          "refund_charges": 0.0,
          "created_at": "2024-05-13T09:00:00+05:30",
          "processed_at": "2024-05-13T09:04:12+05:30",
          "refund_status": "SUCCESS",
          "status_description": "Refund processed successfully"
        }"#;
        let update = serde_json::from_str::<RefundUpdate>(payload).unwrap();
        assert_eq!(update.refund_id, "rf_889021");
        assert_eq!(update.refund_status, "SUCCESS");
        assert!(update.processed_at.is_some());
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let payload = r#"{
          "refund_id": "rf_889022",
          "order_id": "ORD-1002",
          "payment_id": "5114911133",
          "refund_amount": 99.50,
          "created_at": "2024-05-13T10:00:00Z",
          "refund_status": "PENDING"
        }"#;
        let update = serde_json::from_str::<RefundUpdate>(payload).unwrap();
        assert!(update.customer_id.is_none());
        assert!(update.processed_at.is_none());
        assert!(update.status_description.is_none());
    }
}
