use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bhojan_ledger_engine::{
    db_types::{AcceptanceStatus, CancelledBy, DeliveryStatus, Order, RefundSettlementDetails, RefundStatus},
    events::EventProducers,
    state::{DeliveryEvent, TransitionError, VendorDecision},
    traits::{CancellationOutcome, LedgerError},
    OrderFlowApi,
};
use ble_common::Paisa;
use chrono::{TimeZone, Utc};
use serde_json::json;

use super::helpers::{order_fixture, post_request};
use crate::{
    endpoint_tests::mocks::MockLedger,
    routes::{DeliveryStatusRoute, VendorAcceptRoute, VendorRejectRoute},
};

#[actix_web::test]
async fn vendor_accept_marks_the_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/order/ORD-1001/accept", json!({}), configure_accept).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""acceptance_status":"Accepted""#));
}

#[actix_web::test]
async fn vendor_reject_cancels_and_refunds_in_full() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/order/ORD-1001/reject", json!({}), configure_reject).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""acceptance_status":"Rejected""#));
    assert!(body.contains(r#""order_status":"Cancelled""#));
    assert!(body.contains(r#""customer_refund_amount":14200"#));
}

#[actix_web::test]
async fn dispatch_updates_the_delivery_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/order/ORD-1001/status", json!({ "event": "Dispatch" }), configure_dispatch)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""delivery_status":"Dispatched""#));
}

#[actix_web::test]
async fn illegal_delivery_jumps_are_conflicts() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/order/ORD-1001/status", json!({ "event": "Deliver" }), configure_illegal_jump)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        r#"{"error":"The request conflicts with the ledger state. illegal delivery transition from Pending on Deliver"}"#
    );
}

//---------------------------------------- Configurations ----------------------------------------------------

fn configure_accept(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_record_vendor_decision()
        .withf(|id, decision, _| id.as_str() == "ORD-1001" && *decision == VendorDecision::Accept)
        .returning(|_, _, _| {
            Ok(CancellationOutcome { order: order_fixture("ORD-1001", "Placed"), refund_opened: false })
        });
    install_flow_api(cfg, db);
}

fn configure_reject(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_record_vendor_decision()
        .withf(|id, decision, _| id.as_str() == "ORD-1001" && *decision == VendorDecision::Reject)
        .returning(|_, _, _| Ok(CancellationOutcome { order: rejected_order_fixture(), refund_opened: true }));
    install_flow_api(cfg, db);
}

fn configure_dispatch(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_record_delivery_event()
        .withf(|id, event, _| id.as_str() == "ORD-1001" && *event == DeliveryEvent::Dispatch)
        .returning(|_, _, _| {
            let mut order = order_fixture("ORD-1001", "Placed");
            order.delivery_status = DeliveryStatus::Dispatched;
            order.delivered_at = None;
            Ok(order)
        });
    install_flow_api(cfg, db);
}

fn configure_illegal_jump(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_record_delivery_event().returning(|_, event, _| {
        Err(LedgerError::InvalidTransition(TransitionError::new("delivery", DeliveryStatus::Pending, event)))
    });
    install_flow_api(cfg, db);
}

fn install_flow_api(cfg: &mut ServiceConfig, db: MockLedger) {
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(VendorAcceptRoute::<MockLedger>::new())
        .service(VendorRejectRoute::<MockLedger>::new())
        .service(DeliveryStatusRoute::<MockLedger>::new())
        .app_data(web::Data::new(api));
}

//---------------------------------------- Fixtures ----------------------------------------------------

/// What a vendor rejection leaves behind: a cancelled order with an auto-settled full refund.
fn rejected_order_fixture() -> Order {
    let mut order = order_fixture("ORD-1001", "Cancelled");
    order.acceptance_status = AcceptanceStatus::Rejected;
    order.cancelled_by = Some(CancelledBy::Vendor);
    order.refund_status = Some(RefundStatus::Pending);
    order.invoice_breakout.refund_settlement_details = Some(RefundSettlementDetails {
        vendor_payout_amount: Paisa::from(0),
        delivery_charge_amount: Paisa::from(0),
        customer_refund_amount: Paisa::from(14_200),
        notes: None,
        settled_at: Utc.with_ymd_and_hms(2024, 5, 12, 12, 30, 0).unwrap(),
    });
    order
}
