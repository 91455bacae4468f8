use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use bhojan_ledger_engine::db_types::Order;
use log::debug;
use serde_json::{json, Value};

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> Result<(StatusCode, String), String> {
    let req = TestRequest::get().uri(path).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making GET request to {path}");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub async fn post_request(
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making POST request to {path}");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// An order row as the ledger would return it. Tests build these from JSON because `Order` rows
/// normally come out of the database, not a constructor.
pub fn order_fixture(order_id: &str, status: &str) -> Order {
    serde_json::from_value(json!({
        "id": 1,
        "order_id": order_id,
        "restaurant_id": "rest-42",
        "customer_id": "cust-77",
        "order_status": status,
        "acceptance_status": "Accepted",
        "delivery_status": "Delivered",
        "refund_status": null,
        "cancelled_by": null,
        "total_price": 14200,
        "vendor_payout_amount": 11800,
        "payout_transaction_id": null,
        "invoice_breakout": { "item_total": 11800, "delivery_charge": 2400 },
        "placed_at": "2024-05-12T12:16:01Z",
        "delivered_at": "2024-05-12T13:02:44Z",
        "created_at": "2024-05-12T12:15:00Z",
        "updated_at": "2024-05-12T13:02:44Z"
    }))
    .expect("order fixture is valid")
}
