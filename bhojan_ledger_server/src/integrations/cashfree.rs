use ble_common::{Paisa, INR_CURRENCY_CODE};
use bhojan_ledger_engine::{
    db_types::{AttemptKind, OrderId, PaymentEvent, RefundEvent, RefundStatus},
    traits::{PayoutGateway, PayoutGatewayError, TransferDetails, TransferRequest, TransferStatus},
};
use cashfree_tools::{
    paisa_from_rupee_value,
    CashfreeApiError,
    CashfreeConfig,
    NewTransfer,
    PaymentWebhook,
    PaymentWebhookType,
    PayoutsApi,
    RefundUpdate,
    Transfer,
};
use thiserror::Error;

use crate::errors::ServerError;

#[derive(Debug, Error)]
pub enum WebhookConversionError {
    #[error("The webhook payload contained invalid data. {0}")]
    FormatError(String),
    #[error("{0} is not a supported currency.")]
    UnsupportedCurrency(String),
}

/// Converts a Cashfree payment webhook into the engine's neutral payment event. The
/// `(cf_payment_id, kind)` pair carries through as the idempotency key.
pub fn payment_event_from_webhook(hook: PaymentWebhook) -> Result<PaymentEvent, WebhookConversionError> {
    let kind = match hook.webhook_type {
        PaymentWebhookType::Success => AttemptKind::Success,
        PaymentWebhookType::Failed => AttemptKind::Failed,
        PaymentWebhookType::UserDropped => AttemptKind::UserDropped,
    };
    let data = hook.data;
    if let Some(currency) = &data.payment.payment_currency {
        if currency.to_uppercase() != INR_CURRENCY_CODE {
            return Err(WebhookConversionError::UnsupportedCurrency(currency.clone()));
        }
    }
    let amount = paisa_from_rupee_value(data.payment.payment_amount);
    let mut event = PaymentEvent::new(OrderId(data.order.order_id), data.payment.cf_payment_id.clone(), kind, amount)
        .with_event_time(hook.event_time);
    if let Some(method) = data.payment.method_name() {
        event = event.with_method(method);
    }
    if let Some(details) = &data.error_details {
        event = event.with_error_detail(details.summary());
    }
    Ok(event)
}

/// Converts a Cashfree refund update into the engine's neutral refund event.
///
/// Cashfree's `CANCELLED` collapses into [`RefundStatus::Failed`]: either way the money never
/// left, the approval reopens, and an operator decides what happens next.
pub fn refund_event_from_update(update: RefundUpdate) -> Result<RefundEvent, WebhookConversionError> {
    let status = match update.refund_status.to_uppercase().as_str() {
        "PENDING" => RefundStatus::Pending,
        "SUCCESS" => RefundStatus::Success,
        "FAILED" | "CANCELLED" => RefundStatus::Failed,
        s => return Err(WebhookConversionError::FormatError(format!("Unknown refund status: {s}"))),
    };
    let amount = paisa_from_rupee_value(update.refund_amount);
    let mut event =
        RefundEvent::new(update.refund_id, OrderId(update.order_id), update.payment_id, amount, status)
            .with_event_time(update.processed_at.unwrap_or(update.created_at));
    if let Some(charges) = update.refund_charges {
        event = event.with_charges(paisa_from_rupee_value(charges));
    }
    if let Some(description) = update.status_description {
        event = event.with_description(description);
    }
    Ok(event)
}

//------------------------------------------ CashfreePayoutGateway ---------------------------------------------------

/// Adapts the Cashfree payouts client to the engine's [`PayoutGateway`] trait.
///
/// The mapping is deliberately careful about what counts as an error. A transfer the gateway
/// definitively rejected comes back as `Ok` with [`TransferStatus::Failed`], so the reconciler
/// can close the batch and release its orders. `Err` is reserved for transport trouble and
/// responses we cannot interpret, where the transfer may still have landed and the batch must
/// stay unresolved until a status lookup settles the question.
#[derive(Clone)]
pub struct CashfreePayoutGateway {
    api: PayoutsApi,
}

impl CashfreePayoutGateway {
    pub fn new(config: CashfreeConfig) -> Result<Self, ServerError> {
        let api = PayoutsApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

impl PayoutGateway for CashfreePayoutGateway {
    async fn account_balance(&self) -> Result<Paisa, PayoutGatewayError> {
        let balance = self.api.get_balance().await.map_err(gateway_error)?;
        balance.available().map_err(|e| PayoutGatewayError::InvalidResponse(e.to_string()))
    }

    async fn request_transfer(&self, request: &TransferRequest) -> Result<TransferDetails, PayoutGatewayError> {
        let transfer = NewTransfer::new(
            request.bene_id.clone(),
            request.amount,
            request.transfer_id.clone(),
            request.remarks.clone(),
        );
        let envelope = self.api.request_transfer(&transfer).await.map_err(gateway_error)?;
        let status = if envelope.is_success() {
            TransferStatus::Success
        } else {
            match envelope.status.to_uppercase().as_str() {
                "PENDING" => TransferStatus::Pending,
                // The gateway refused the transfer outright. It never existed, so the batch can
                // be failed and its orders released without a status lookup.
                "ERROR" => TransferStatus::Failed,
                s => {
                    return Err(PayoutGatewayError::InvalidResponse(format!(
                        "Unrecognised transfer response status: {s}"
                    )))
                },
            }
        };
        let reference_id = envelope.data.as_ref().and_then(|r| r.reference_id).map(|id| id.to_string());
        Ok(TransferDetails { transfer_id: request.transfer_id.clone(), status, reference_id, processed_at: None })
    }

    async fn transfer_details(&self, transfer_id: &str) -> Result<TransferDetails, PayoutGatewayError> {
        match self.api.get_transfer_status(transfer_id).await.map_err(gateway_error)? {
            None => Ok(TransferDetails {
                transfer_id: transfer_id.to_string(),
                status: TransferStatus::NotFound,
                reference_id: None,
                processed_at: None,
            }),
            Some(transfer) => transfer_details_from_transfer(transfer),
        }
    }
}

fn transfer_details_from_transfer(transfer: Transfer) -> Result<TransferDetails, PayoutGatewayError> {
    let status = transfer_status_from_api(&transfer.status)?;
    Ok(TransferDetails {
        transfer_id: transfer.transfer_id,
        status,
        reference_id: transfer.reference_id,
        processed_at: transfer.processed_on,
    })
}

fn transfer_status_from_api(status: &str) -> Result<TransferStatus, PayoutGatewayError> {
    match status.to_uppercase().as_str() {
        "SUCCESS" => Ok(TransferStatus::Success),
        "PENDING" | "PROCESSING" | "RECEIVED" => Ok(TransferStatus::Pending),
        "FAILED" | "REJECTED" | "REVERSED" | "ERROR" => Ok(TransferStatus::Failed),
        s => Err(PayoutGatewayError::InvalidResponse(format!("Unknown transfer status: {s}"))),
    }
}

fn gateway_error(e: CashfreeApiError) -> PayoutGatewayError {
    match e {
        CashfreeApiError::QueryError { status, message } if status >= 500 => {
            PayoutGatewayError::Unreachable(format!("{status}: {message}"))
        },
        CashfreeApiError::QueryError { status, message } => {
            PayoutGatewayError::Rejected(format!("{status}: {message}"))
        },
        CashfreeApiError::JsonError(m) => PayoutGatewayError::InvalidResponse(m),
        e => PayoutGatewayError::Unreachable(e.to_string()),
    }
}

#[cfg(test)]
mod test {
    use ble_common::Paisa;
    use bhojan_ledger_engine::db_types::{AttemptKind, RefundStatus};
    use cashfree_tools::{
        CustomerDetails,
        PaymentErrorDetails,
        PaymentWebhook,
        PaymentWebhookData,
        PaymentWebhookType,
        RefundUpdate,
        WebhookOrder,
        WebhookPayment,
    };
    use chrono::{TimeZone, Utc};

    use super::*;

    fn payment_webhook(webhook_type: PaymentWebhookType, currency: &str) -> PaymentWebhook {
        PaymentWebhook {
            webhook_type,
            event_time: Utc.with_ymd_and_hms(2024, 8, 2, 10, 15, 0).unwrap(),
            data: PaymentWebhookData {
                order: WebhookOrder {
                    order_id: "ord-2318".to_string(),
                    order_amount: Some(142.0),
                    order_currency: Some(currency.to_string()),
                },
                payment: WebhookPayment {
                    cf_payment_id: "5114911130".to_string(),
                    payment_status: "SUCCESS".to_string(),
                    payment_amount: 142.0,
                    payment_currency: Some(currency.to_string()),
                    payment_message: None,
                    bank_reference: None,
                    payment_time: None,
                    payment_method: None,
                    payment_group: Some("upi".to_string()),
                },
                customer_details: None::<CustomerDetails>,
                error_details: None::<PaymentErrorDetails>,
            },
        }
    }

    #[test]
    fn payment_webhook_converts_to_event() {
        let hook = payment_webhook(PaymentWebhookType::Success, "INR");
        let event = payment_event_from_webhook(hook).unwrap();
        assert_eq!(event.order_id.as_str(), "ord-2318");
        assert_eq!(event.external_payment_id, "5114911130");
        assert_eq!(event.kind, AttemptKind::Success);
        assert_eq!(event.amount, Paisa::from(14200));
        assert_eq!(event.payment_method.as_deref(), Some("upi"));
        assert_eq!(event.event_time, Utc.with_ymd_and_hms(2024, 8, 2, 10, 15, 0).unwrap());
    }

    #[test]
    fn foreign_currency_payments_are_refused() {
        let hook = payment_webhook(PaymentWebhookType::Success, "USD");
        let err = payment_event_from_webhook(hook).unwrap_err();
        assert!(matches!(err, WebhookConversionError::UnsupportedCurrency(c) if c == "USD"));
    }

    #[test]
    fn refund_update_converts_to_event() {
        let update = RefundUpdate {
            refund_id: "refund_8872".to_string(),
            order_id: "ord-2318".to_string(),
            payment_id: "5114911130".to_string(),
            customer_id: None,
            refund_gateway: None,
            refund_amount: 142.0,
            refund_charges: Some(1.5),
            created_at: Utc.with_ymd_and_hms(2024, 8, 3, 9, 0, 0).unwrap(),
            processed_at: Some(Utc.with_ymd_and_hms(2024, 8, 3, 11, 30, 0).unwrap()),
            refund_status: "SUCCESS".to_string(),
            status_description: Some("Refund processed successfully".to_string()),
        };
        let event = refund_event_from_update(update).unwrap();
        assert_eq!(event.refund_id, "refund_8872");
        assert_eq!(event.order_id.as_str(), "ord-2318");
        assert_eq!(event.status, RefundStatus::Success);
        assert_eq!(event.amount, Paisa::from(14200));
        assert_eq!(event.charges, Paisa::from(150));
        assert_eq!(event.event_time, Utc.with_ymd_and_hms(2024, 8, 3, 11, 30, 0).unwrap());
    }

    #[test]
    fn cancelled_refunds_fail_and_unknown_statuses_are_rejected() {
        let mut update = RefundUpdate {
            refund_id: "refund_8872".to_string(),
            order_id: "ord-2318".to_string(),
            payment_id: "5114911130".to_string(),
            customer_id: None,
            refund_gateway: None,
            refund_amount: 50.0,
            refund_charges: None,
            created_at: Utc.with_ymd_and_hms(2024, 8, 3, 9, 0, 0).unwrap(),
            processed_at: None,
            refund_status: "CANCELLED".to_string(),
            status_description: None,
        };
        let event = refund_event_from_update(update.clone()).unwrap();
        assert_eq!(event.status, RefundStatus::Failed);
        // No processed_at, so the event time falls back to creation time
        assert_eq!(event.event_time, Utc.with_ymd_and_hms(2024, 8, 3, 9, 0, 0).unwrap());
        update.refund_status = "ONHOLD".to_string();
        assert!(matches!(refund_event_from_update(update), Err(WebhookConversionError::FormatError(_))));
    }

    #[test]
    fn transfer_status_mapping_is_conservative() {
        assert_eq!(transfer_status_from_api("SUCCESS").unwrap(), TransferStatus::Success);
        assert_eq!(transfer_status_from_api("processing").unwrap(), TransferStatus::Pending);
        assert_eq!(transfer_status_from_api("REVERSED").unwrap(), TransferStatus::Failed);
        assert!(matches!(transfer_status_from_api("TELEPORTED"), Err(PayoutGatewayError::InvalidResponse(_))));
    }
}
