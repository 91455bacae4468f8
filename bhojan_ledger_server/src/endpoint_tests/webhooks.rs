//! The webhook routes must acknowledge everything with a 200, even events they reject. The
//! `success` flag in the body carries the real outcome, so these tests pin both down.
use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bhojan_ledger_engine::{
    db_types::{AttemptKind, Refund, RefundStatus},
    events::EventProducers,
    traits::{LedgerError, PaymentEventOutcome, RefundEventOutcome},
    OrderFlowApi,
    RefundApi,
};
use ble_common::Paisa;
use serde_json::{json, Value};

use super::helpers::{order_fixture, post_request};
use crate::{
    endpoint_tests::mocks::MockLedger,
    webhook_routes::{OrderWebhookRoute, PaymentWebhookRoute, RefundWebhookRoute},
};

#[actix_web::test]
async fn new_order_is_recorded() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/order", new_order_payload(), configure_new_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order recorded."}"#);
}

#[actix_web::test]
async fn redelivered_order_webhook_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/order", new_order_payload(), configure_duplicate_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order already exists."}"#);
}

#[actix_web::test]
async fn successful_payment_places_the_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment", success_payment_payload(), configure_payment_placed).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Order placed."}"#);
}

#[actix_web::test]
async fn replayed_payment_webhook_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment", success_payment_payload(), configure_payment_duplicate).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Event already processed."}"#);
}

#[actix_web::test]
async fn payment_for_unknown_order_still_gets_a_200() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment", success_payment_payload(), configure_payment_unknown).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":false,"message":"Order #ORD-1001 is not on the ledger."}"#);
}

#[actix_web::test]
async fn foreign_currency_payment_is_refused() {
    let _ = env_logger::try_init().ok();
    let mut payload = success_payment_payload();
    payload["data"]["payment"]["payment_currency"] = json!("USD");
    // The engine must never be called; the untouched mock would panic if it were.
    let (status, body) = post_request("/payment", payload, configure_payment_untouched).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":false,"message":"USD is not a supported currency."}"#);
}

#[actix_web::test]
async fn refund_initiation_is_recorded() {
    let _ = env_logger::try_init().ok();
    let mut payload = refund_update_payload();
    payload["refund_status"] = json!("PENDING");
    payload["processed_at"] = Value::Null;
    let (status, body) = post_request("/refund", payload, configure_refund_initiated).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Refund recorded."}"#);
}

#[actix_web::test]
async fn refund_resolution_is_recorded() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/refund", refund_update_payload(), configure_refund_resolved).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Refund resolved."}"#);
}

//---------------------------------------- Configurations ----------------------------------------------------

fn configure_new_order(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_insert_order()
        .withf(|order| order.order_id.as_str() == "ORD-1001" && order.total_price == Paisa::from(14200))
        .returning(|_| Ok((order_fixture("ORD-1001", "Pending"), true)));
    install_order_api(cfg, db);
}

fn configure_duplicate_order(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_insert_order().returning(|_| Ok((order_fixture("ORD-1001", "Pending"), false)));
    install_order_api(cfg, db);
}

fn configure_payment_placed(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_apply_payment_event()
        .withf(|event| {
            event.order_id.as_str() == "ORD-1001" &&
                event.external_payment_id == "5114911130" &&
                event.kind == AttemptKind::Success &&
                event.amount == Paisa::from(14200)
        })
        .returning(|_| Ok(PaymentEventOutcome::Placed(order_fixture("ORD-1001", "Placed"))));
    install_order_api(cfg, db);
}

fn configure_payment_duplicate(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_apply_payment_event().returning(|_| Ok(PaymentEventOutcome::Duplicate));
    install_order_api(cfg, db);
}

fn configure_payment_unknown(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_apply_payment_event()
        .returning(|event| Err(LedgerError::OrderNotFound(event.order_id)));
    install_order_api(cfg, db);
}

fn configure_payment_untouched(cfg: &mut ServiceConfig) {
    install_order_api(cfg, MockLedger::new());
}

fn configure_refund_initiated(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_apply_refund_event()
        .withf(|event| event.refund_id == "rf_889021" && event.status == RefundStatus::Pending)
        .returning(|_| Ok(RefundEventOutcome::Initiated(refund_fixture("Pending"))));
    let api = RefundApi::new(db, EventProducers::default());
    cfg.service(RefundWebhookRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn configure_refund_resolved(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_apply_refund_event()
        .withf(|event| event.refund_id == "rf_889021" && event.status == RefundStatus::Success)
        .returning(|_| {
            Ok(RefundEventOutcome::Resolved {
                refund: refund_fixture("Success"),
                order: order_fixture("ORD-1001", "Cancelled"),
            })
        });
    let api = RefundApi::new(db, EventProducers::default());
    cfg.service(RefundWebhookRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn install_order_api(cfg: &mut ServiceConfig, db: MockLedger) {
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(OrderWebhookRoute::<MockLedger>::new())
        .service(PaymentWebhookRoute::<MockLedger>::new())
        .app_data(web::Data::new(api));
}

//---------------------------------------- Fixtures ----------------------------------------------------

fn new_order_payload() -> Value {
    json!({
        "order_id": "ORD-1001",
        "restaurant_id": "rest-42",
        "customer_id": "cust-77",
        "total_price": 14200,
        "vendor_payout_amount": 11800,
        "invoice_breakout": { "item_total": 11800, "delivery_charge": 2400 },
        "created_at": "2024-05-12T12:15:00Z"
    })
}

fn success_payment_payload() -> Value {
    json!({
        "type": "PAYMENT_SUCCESS_WEBHOOK",
        "event_time": "2024-05-12T17:46:01+05:30",
        "data": {
            "order": { "order_id": "ORD-1001", "order_amount": 142.00, "order_currency": "INR" },
            "payment": {
                "cf_payment_id": "5114911130",
                "payment_status": "SUCCESS",
                "payment_amount": 142.00,
                "payment_currency": "INR",
                "payment_message": "Transaction successful",
                "payment_time": "2024-05-12T17:45:59+05:30",
                "bank_reference": "412523499002",
                "payment_method": { "upi": { "upi_id": "user@okbank" } },
                "payment_group": "upi"
            }
        }
    })
}

fn refund_update_payload() -> Value {
    json!({
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
    })
}

fn refund_fixture(status: &str) -> Refund {
    serde_json::from_value(json!({
        "id": 1,
        "refund_id": "rf_889021",
        "order_id": "ORD-1001",
        "payment_id": "5114911130",
        "amount": 14200,
        "charges": 0,
        "status": status,
        "status_description": null,
        "created_at": "2024-05-13T03:30:00Z",
        "processed_at": null
    }))
    .expect("refund fixture is valid")
}
