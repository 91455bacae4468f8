use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bhojan_ledger_engine::{events::EventProducers, LedgerQueryApi, OrderFlowApi, RefundApi, SqliteDatabase};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::dispatcher::{create_dispatch_handlers, MessageDispatcher},
    routes::{
        health,
        CancelOrderRoute,
        DeliveryStatusRoute,
        MarkForRefundRoute,
        OrderStatementRoute,
        OrdersSearchRoute,
        PayoutStatementRoute,
        RestaurantPayoutsRoute,
        SettleRefundRoute,
        VendorAcceptRoute,
        VendorRejectRoute,
    },
    webhook_routes::{OrderWebhookRoute, PaymentWebhookRoute, RefundWebhookRoute},
    workers::{start_maintenance_worker, start_payout_worker},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let dispatcher = MessageDispatcher::new(config.dispatch_url.clone());
    let handlers = create_dispatch_handlers(dispatcher);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if config.payouts_enabled {
        start_payout_worker(&config, db.clone())?;
    } else {
        warn!("🚀️ BLS_PAYOUTS_ENABLED is off. Restaurants will not be paid until it is switched back on.");
    }
    start_maintenance_worker(&config, db.clone(), producers.clone());
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let order_flow_api =
            OrderFlowApi::new(db.clone(), producers.clone()).with_free_cancel_window(config.free_cancel_window);
        let refund_api = RefundApi::new(db.clone(), producers.clone());
        let query_api = LedgerQueryApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bls::access_log"))
            .app_data(web::Data::new(order_flow_api))
            .app_data(web::Data::new(refund_api))
            .app_data(web::Data::new(query_api));
        let webhook_scope = web::scope("/webhook")
            .service(OrderWebhookRoute::<SqliteDatabase>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
            .service(RefundWebhookRoute::<SqliteDatabase>::new());
        let admin_scope = web::scope("/food/admin")
            .service(OrderStatementRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(MarkForRefundRoute::<SqliteDatabase>::new())
            .service(SettleRefundRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(RestaurantPayoutsRoute::<SqliteDatabase>::new())
            .service(PayoutStatementRoute::<SqliteDatabase>::new());
        let vendor_scope = web::scope("/food/vendor")
            .service(VendorAcceptRoute::<SqliteDatabase>::new())
            .service(VendorRejectRoute::<SqliteDatabase>::new());
        let delivery_scope = web::scope("/food/delivery").service(DeliveryStatusRoute::<SqliteDatabase>::new());
        app.service(health).service(webhook_scope).service(admin_scope).service(vendor_scope).service(delivery_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
