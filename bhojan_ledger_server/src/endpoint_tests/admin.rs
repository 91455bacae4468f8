use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bhojan_ledger_engine::{
    db_types::{
        CancelledBy,
        Order,
        Payment,
        PaymentAttempt,
        Payout,
        PayoutOrderEntry,
        RefundSettlementDetails,
        RefundStatus,
    },
    events::EventProducers,
    traits::{CancellationOutcome, LedgerError},
    LedgerQueryApi,
    OrderFlowApi,
    RefundApi,
};
use ble_common::Paisa;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use super::helpers::{get_request, order_fixture, post_request};
use crate::{
    endpoint_tests::mocks::MockLedger,
    routes::{
        CancelOrderRoute,
        MarkForRefundRoute,
        OrderStatementRoute,
        OrdersSearchRoute,
        PayoutStatementRoute,
        RestaurantPayoutsRoute,
        SettleRefundRoute,
    },
};

#[actix_web::test]
async fn order_statement_includes_the_full_money_trail() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/order/ORD-1001", configure_statement).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, STATEMENT_JSON);
}

#[actix_web::test]
async fn missing_order_statement_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/order/ORD-9999", configure_no_order).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No order with id #ORD-9999"}"#);
}

#[actix_web::test]
async fn order_search_passes_the_filter_through() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request("/search/orders?customer_id=cust-77", configure_search).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with('['));
    assert!(body.contains(r#""order_id":"ORD-1001""#));
}

#[actix_web::test]
async fn marking_an_order_for_refund_parks_it() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/order/ORD-2002/mark_for_refund", json!({}), configure_mark).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""refund_status":"ApprovalPending""#));
}

#[actix_web::test]
async fn marking_a_paid_out_order_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/order/ORD-2002/mark_for_refund", json!({}), configure_mark_paid_out)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        r#"{"error":"The request conflicts with the ledger state. Order #ORD-2002 has already been settled by payout transfer pb_rest_42_00c0ffee00c0ffee"}"#
    );
}

#[actix_web::test]
async fn settling_a_refund_releases_it() {
    let _ = env_logger::try_init().ok();
    let settlement = json!({
        "vendor_payout_amount": 0,
        "delivery_charge_amount": 2400,
        "customer_refund_amount": 11800,
        "notes": "customer cancelled after dispatch"
    });
    let (status, body) =
        post_request("/order/ORD-2002/settle_refund", settlement, configure_settle).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""refund_status":"Pending""#));
    assert!(body.contains(r#""customer_refund_amount":11800"#));
}

#[actix_web::test]
async fn cancelling_an_order_reports_the_disposition() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/order/ORD-2002/cancel", json!({ "cancelled_by": "Customer" }), configure_cancel)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""order_status":"Cancelled""#));
    assert!(body.contains(r#""cancelled_by":"Customer""#));
}

#[actix_web::test]
async fn restaurant_payout_history_is_newest_first() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/payouts/rest-42", configure_payout_history).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let payouts = serde_json::from_str::<Value>(&body).expect("body is json");
    let payouts = payouts.as_array().expect("body is an array");
    assert_eq!(payouts.len(), 2);
    assert_eq!(payouts[0]["status"], "Complete");
    assert_eq!(payouts[1]["status"], "Failed");
}

#[actix_web::test]
async fn payout_statement_lists_member_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/payout/7", configure_payout_statement).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let statement = serde_json::from_str::<Value>(&body).expect("body is json");
    assert_eq!(statement["payout"]["transfer_id"], "pb_rest_42_0000000000000007");
    assert_eq!(statement["payout"]["amount_paid_to_vendor"], 23364);
    let orders = statement["orders"].as_array().expect("orders is an array");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["order_id"], "ORD-1001");
    assert_eq!(orders[0]["amount"], 11800);
}

#[actix_web::test]
async fn unknown_payout_statement_is_a_404() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/payout/99", configure_no_payout).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No payout with id 99"}"#);
}

//---------------------------------------- Configurations ----------------------------------------------------

fn configure_statement(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_fetch_order_by_order_id()
        .withf(|id| id.as_str() == "ORD-1001")
        .returning(|_| Ok(Some(order_fixture("ORD-1001", "Completed"))));
    db.expect_fetch_payment_for_order().returning(|_| Ok(Some(payment_fixture())));
    db.expect_fetch_payment_attempts().returning(|_| Ok(vec![attempt_fixture()]));
    db.expect_fetch_refunds_for_order().returning(|_| Ok(vec![]));
    install_query_api(cfg, db);
}

fn configure_no_order(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    install_query_api(cfg, db);
}

fn configure_search(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_search_orders()
        .withf(|query| query.customer_id.as_deref() == Some("cust-77") && query.order_id.is_none())
        .returning(|_| Ok(vec![order_fixture("ORD-1001", "Completed")]));
    install_query_api(cfg, db);
}

fn configure_mark(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_mark_order_for_refund().withf(|id| id.as_str() == "ORD-2002").returning(|_| {
        let mut order = order_fixture("ORD-2002", "Cancelled");
        order.cancelled_by = Some(CancelledBy::Customer);
        order.refund_status = Some(RefundStatus::ApprovalPending);
        Ok(order)
    });
    let api = RefundApi::new(db, EventProducers::default());
    cfg.service(MarkForRefundRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn configure_mark_paid_out(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_mark_order_for_refund()
        .returning(|id| Err(LedgerError::AlreadyPaidOut(id.clone(), "pb_rest_42_00c0ffee00c0ffee".to_string())));
    let api = RefundApi::new(db, EventProducers::default());
    cfg.service(MarkForRefundRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn configure_settle(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_settle_order_refund()
        .withf(|id, settlement, _| {
            id.as_str() == "ORD-2002" &&
                settlement.customer_refund_amount == Paisa::from(11_800) &&
                settlement.vendor_payout_amount == Paisa::from(0)
        })
        .returning(|_, _, _| Ok(settled_order_fixture()));
    let api = RefundApi::new(db, EventProducers::default());
    cfg.service(SettleRefundRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn configure_cancel(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_cancel_order()
        .withf(|id, by, _, _| id.as_str() == "ORD-2002" && *by == CancelledBy::Customer)
        .returning(|_, _, _, _| Ok(CancellationOutcome { order: settled_order_fixture(), refund_opened: true }));
    let api = OrderFlowApi::new(db, EventProducers::default());
    cfg.service(CancelOrderRoute::<MockLedger>::new()).app_data(web::Data::new(api));
}

fn configure_payout_history(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_fetch_payouts_for_restaurant()
        .withf(|id| id == "rest-42")
        .returning(|_| Ok(vec![payout_fixture(8, "Complete"), payout_fixture(7, "Failed")]));
    install_query_api(cfg, db);
}

fn configure_payout_statement(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_fetch_payout().withf(|id| *id == 7).returning(|_| Ok(Some(payout_fixture(7, "Complete"))));
    db.expect_fetch_payout_members().withf(|id| *id == 7).returning(|_| Ok(member_fixtures()));
    install_query_api(cfg, db);
}

fn configure_no_payout(cfg: &mut ServiceConfig) {
    let mut db = MockLedger::new();
    db.expect_fetch_payout().returning(|_| Ok(None));
    install_query_api(cfg, db);
}

fn install_query_api(cfg: &mut ServiceConfig, db: MockLedger) {
    let api = LedgerQueryApi::new(db);
    cfg.service(OrderStatementRoute::<MockLedger>::new())
        .service(OrdersSearchRoute::<MockLedger>::new())
        .service(RestaurantPayoutsRoute::<MockLedger>::new())
        .service(PayoutStatementRoute::<MockLedger>::new())
        .app_data(web::Data::new(api));
}

//---------------------------------------- Fixtures ----------------------------------------------------

fn payment_fixture() -> Payment {
    serde_json::from_value(json!({
        "id": 1,
        "order_id": "ORD-1001",
        "amount": 14200,
        "status": "Completed",
        "created_at": "2024-05-12T12:15:00Z",
        "updated_at": "2024-05-12T12:16:01Z"
    }))
    .expect("payment fixture is valid")
}

fn attempt_fixture() -> PaymentAttempt {
    serde_json::from_value(json!({
        "id": 1,
        "payment_id": 1,
        "order_id": "ORD-1001",
        "external_payment_id": "5114911130",
        "kind": "Success",
        "payment_method": "upi",
        "error_detail": null,
        "event_time": "2024-05-12T12:16:01Z",
        "received_at": "2024-05-12T12:16:02Z"
    }))
    .expect("attempt fixture is valid")
}

/// A cancelled order whose settlement split has been decided and written into the breakout.
fn settled_order_fixture() -> Order {
    let mut order = order_fixture("ORD-2002", "Cancelled");
    order.cancelled_by = Some(CancelledBy::Customer);
    order.refund_status = Some(RefundStatus::Pending);
    order.invoice_breakout.refund_settlement_details = Some(RefundSettlementDetails {
        vendor_payout_amount: Paisa::from(0),
        delivery_charge_amount: Paisa::from(2_400),
        customer_refund_amount: Paisa::from(11_800),
        notes: Some("customer cancelled after dispatch".to_string()),
        settled_at: Utc.with_ymd_and_hms(2024, 5, 12, 14, 0, 0).unwrap(),
    });
    order
}

fn payout_fixture(id: i64, status: &str) -> Payout {
    serde_json::from_value(json!({
        "id": id,
        "restaurant_id": "rest-42",
        "status": status,
        "total_order_amount": 23600,
        "transaction_charges": 236,
        "amount_paid_to_vendor": 23364,
        "transfer_id": format!("pb_rest_42_{id:016x}"),
        "created_at": "2024-05-12T20:00:00Z",
        "updated_at": "2024-05-12T20:00:05Z"
    }))
    .expect("payout fixture is valid")
}

fn member_fixtures() -> Vec<PayoutOrderEntry> {
    serde_json::from_value(json!([
        { "order_id": "ORD-1001", "amount": 11800 },
        { "order_id": "ORD-1002", "amount": 11800 }
    ]))
    .expect("member fixtures are valid")
}

const STATEMENT_JSON: &str = r#"{"order":{"id":1,"order_id":"ORD-1001","restaurant_id":"rest-42","customer_id":"cust-77","order_status":"Completed","acceptance_status":"Accepted","delivery_status":"Delivered","refund_status":null,"cancelled_by":null,"total_price":14200,"vendor_payout_amount":11800,"payout_transaction_id":null,"invoice_breakout":{"item_total":11800,"packaging_charge":0,"delivery_charge":2400,"platform_fee":0,"gst":0,"discount":0,"refund_settlement_details":null},"placed_at":"2024-05-12T12:16:01Z","delivered_at":"2024-05-12T13:02:44Z","created_at":"2024-05-12T12:15:00Z","updated_at":"2024-05-12T13:02:44Z"},"payment":{"id":1,"order_id":"ORD-1001","amount":14200,"status":"Completed","created_at":"2024-05-12T12:15:00Z","updated_at":"2024-05-12T12:16:01Z"},"attempts":[{"id":1,"payment_id":1,"order_id":"ORD-1001","external_payment_id":"5114911130","kind":"Success","payment_method":"upi","error_detail":null,"event_time":"2024-05-12T12:16:01Z","received_at":"2024-05-12T12:16:02Z"}],"refunds":[]}"#;
