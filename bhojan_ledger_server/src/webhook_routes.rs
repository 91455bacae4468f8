//----------------------------------------------   Webhooks  ----------------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use bhojan_ledger_engine::{
    db_types::NewOrder,
    traits::{LedgerDatabase, LedgerError, PaymentEventOutcome, RefundEventOutcome},
    OrderFlowApi,
    RefundApi,
};
use cashfree_tools::{PaymentWebhook, RefundUpdate};
use log::{info, trace, warn};

use crate::{
    data_objects::JsonResponse,
    integrations::cashfree::{payment_event_from_webhook, refund_event_from_update},
    route,
};

route!(order_webhook => Post "/order" impl LedgerDatabase);
/// The ordering service announces every new order here before it sends the customer off to
/// payment. The insert is idempotent, so redelivery is harmless.
pub async fn order_webhook<B: LedgerDatabase>(
    req: HttpRequest,
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> HttpResponse {
    trace!("📦️ Received new order webhook: {}", req.uri());
    let order = body.into_inner();
    // Webhook responses must always be in the 200 range, otherwise the sender will retry
    let result = match api.process_new_order(order).await {
        Ok((order, true)) => {
            info!("📦️ Order {} added to the ledger, awaiting payment.", order.order_id);
            JsonResponse::success("Order recorded.")
        },
        Ok((order, false)) => {
            info!("📦️ Order {} is already on the ledger.", order.order_id);
            JsonResponse::success("Order already exists.")
        },
        Err(e) => {
            warn!("📦️ Could not record new order. {e}");
            JsonResponse::failure("Unexpected error handling new order.")
        },
    };
    HttpResponse::Ok().json(result)
}

route!(payment_webhook => Post "/payment" impl LedgerDatabase);
/// Cashfree reports the outcome of every payment attempt here. The `(payment id, kind)` pair
/// deduplicates redeliveries inside the engine.
pub async fn payment_webhook<B: LedgerDatabase>(
    req: HttpRequest,
    body: web::Json<PaymentWebhook>,
    api: web::Data<OrderFlowApi<B>>,
) -> HttpResponse {
    trace!("💳️ Received payment webhook: {}", req.uri());
    let hook = body.into_inner();
    let result = match payment_event_from_webhook(hook) {
        Err(e) => {
            warn!("💳️ Could not convert payment webhook. {e}");
            JsonResponse::failure(e)
        },
        Ok(event) => match api.process_payment_event(event).await {
            Ok(PaymentEventOutcome::Placed(order)) => {
                info!("💳️ Payment captured for order {}. The order is placed.", order.order_id);
                JsonResponse::success("Order placed.")
            },
            Ok(PaymentEventOutcome::AttemptRecorded(kind)) => {
                info!("💳️ {kind} payment attempt logged.");
                JsonResponse::success("Attempt recorded.")
            },
            Ok(PaymentEventOutcome::Duplicate) => {
                info!("💳️ Duplicate payment event ignored.");
                JsonResponse::success("Event already processed.")
            },
            Err(LedgerError::OrderNotFound(id)) => {
                warn!("💳️ Payment webhook for unknown order {id}.");
                JsonResponse::failure(format!("Order {id} is not on the ledger."))
            },
            Err(e) => {
                warn!("💳️ Could not process payment event. {e}");
                JsonResponse::failure("Unexpected error handling payment event.")
            },
        },
    };
    HttpResponse::Ok().json(result)
}

route!(refund_webhook => Post "/refund" impl LedgerDatabase);
/// Cashfree reports refund progress here. `refund_id` is the idempotency key; terminal events
/// resolve the refund and move the order's refund status with it.
pub async fn refund_webhook<B: LedgerDatabase>(
    req: HttpRequest,
    body: web::Json<RefundUpdate>,
    api: web::Data<RefundApi<B>>,
) -> HttpResponse {
    trace!("🧾️ Received refund webhook: {}", req.uri());
    let update = body.into_inner();
    let result = match refund_event_from_update(update) {
        Err(e) => {
            warn!("🧾️ Could not convert refund update. {e}");
            JsonResponse::failure(e)
        },
        Ok(event) => match api.process_refund_event(event).await {
            Ok(RefundEventOutcome::Initiated(refund)) => {
                info!("🧾️ Refund {} recorded against order {}.", refund.refund_id, refund.order_id);
                JsonResponse::success("Refund recorded.")
            },
            Ok(RefundEventOutcome::Resolved { refund, order }) => {
                info!("🧾️ Refund {} for order {} resolved as {}.", refund.refund_id, order.order_id, refund.status);
                JsonResponse::success("Refund resolved.")
            },
            Ok(RefundEventOutcome::Duplicate) => {
                info!("🧾️ Duplicate refund event ignored.");
                JsonResponse::success("Event already processed.")
            },
            Err(LedgerError::OrderNotFound(id)) => {
                warn!("🧾️ Refund update for unknown order {id}.");
                JsonResponse::failure(format!("Order {id} is not on the ledger."))
            },
            Err(e) => {
                warn!("🧾️ Could not process refund event. {e}");
                JsonResponse::failure("Unexpected error handling refund event.")
            },
        },
    };
    HttpResponse::Ok().json(result)
}
