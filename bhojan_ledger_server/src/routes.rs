//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use bhojan_ledger_engine::{
    db_types::{OrderId, RefundSettlement},
    order_objects::OrderQueryFilter,
    state::VendorDecision,
    traits::{LedgerDatabase, LedgerManagement},
    LedgerQueryApi,
    OrderFlowApi,
    RefundApi,
};
use log::*;
use serde_json::json;

use crate::{
    data_objects::{CancelOrderParams, DeliveryUpdateParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Admin  ----------------------------------------------------
route!(order_statement => Get "/order/{order_id}" impl LedgerManagement);
/// Everything the ledger knows about one order: the order row, its payment record, the raw
/// attempt log and any refunds.
pub async fn order_statement<B: LedgerManagement>(
    path: web::Path<OrderId>,
    api: web::Data<LedgerQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order statement for {order_id}");
    let statement = api.order_statement(&order_id).await.map_err(|e| {
        debug!("💻️ Could not fetch order statement. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    let statement = statement.ok_or_else(|| ServerError::NoRecordFound(format!("No order with id {order_id}")))?;
    Ok(HttpResponse::Ok().json(statement))
}

route!(orders_search => Get "/search/orders" impl LedgerManagement);
pub async fn orders_search<B: LedgerManagement>(
    query: web::Query<OrderQueryFilter>,
    api: web::Data<LedgerQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders search for [{query}]");
    let query = query.into_inner();
    let orders = api.search_orders(query).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(mark_for_refund => Post "/order/{order_id}/mark_for_refund" impl LedgerDatabase);
/// Opens a refund approval on a cancelled order. The order's refund status moves to
/// `ApprovalPending` and waits for an operator to decide the settlement split.
pub async fn mark_for_refund<B: LedgerDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<RefundApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST mark_for_refund for {order_id}");
    let order = api.mark_for_refund(&order_id).await.map_err(|e| {
        debug!("💻️ Could not open refund approval. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

route!(settle_refund => Post "/order/{order_id}/settle_refund" impl LedgerDatabase);
/// Records the operator's settlement split on an `ApprovalPending` order and releases the
/// refund for execution.
pub async fn settle_refund<B: LedgerDatabase>(
    path: web::Path<OrderId>,
    body: web::Json<RefundSettlement>,
    api: web::Data<RefundApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let settlement = body.into_inner();
    debug!("💻️ POST settle_refund for {order_id}. The customer gets {}", settlement.customer_refund_amount);
    let order = api.settle_refund(&order_id, settlement).await.map_err(|e| {
        debug!("💻️ Could not settle refund. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/order/{order_id}/cancel" impl LedgerDatabase);
/// Cancels an order on behalf of the party named in the body. The engine decides the refund
/// disposition: no refund for unpaid orders, an automatic full refund inside the free window or
/// for no-fault cancellations, and `ApprovalPending` otherwise.
pub async fn cancel_order<B: LedgerDatabase>(
    path: web::Path<OrderId>,
    body: web::Json<CancelOrderParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let params = body.into_inner();
    debug!("💻️ POST cancel order {order_id} by {}", params.cancelled_by);
    let outcome = api.cancel_order(&order_id, params.cancelled_by).await.map_err(|e| {
        debug!("💻️ Could not cancel order. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(outcome.order))
}

route!(restaurant_payouts => Get "/payouts/{restaurant_id}" impl LedgerManagement);
/// All payout batches for a restaurant, newest first.
pub async fn restaurant_payouts<B: LedgerManagement>(
    path: web::Path<String>,
    api: web::Data<LedgerQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let restaurant_id = path.into_inner();
    debug!("💻️ GET payouts for restaurant {restaurant_id}");
    let payouts = api.payouts_for_restaurant(&restaurant_id).await.map_err(|e| {
        debug!("💻️ Could not fetch payouts. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(payouts))
}

route!(payout_statement => Get "/payout/{payout_id}" impl LedgerManagement);
/// One payout batch together with the orders it settled and their contributions.
pub async fn payout_statement<B: LedgerManagement>(
    path: web::Path<i64>,
    api: web::Data<LedgerQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let payout_id = path.into_inner();
    debug!("💻️ GET payout statement for {payout_id}");
    let statement = api.payout_statement(payout_id).await.map_err(|e| {
        debug!("💻️ Could not fetch payout statement. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    let (payout, orders) =
        statement.ok_or_else(|| ServerError::NoRecordFound(format!("No payout with id {payout_id}")))?;
    Ok(HttpResponse::Ok().json(json!({ "payout": payout, "orders": orders })))
}

//----------------------------------------------   Vendor  ----------------------------------------------------
route!(vendor_accept => Post "/order/{order_id}/accept" impl LedgerDatabase);
/// The restaurant accepted the order and has started preparing food.
pub async fn vendor_accept<B: LedgerDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    vendor_decision(path.into_inner(), VendorDecision::Accept, api.as_ref()).await
}

route!(vendor_reject => Post "/order/{order_id}/reject" impl LedgerDatabase);
/// The restaurant turned the order down. The order cancels on the vendor's behalf and a full
/// refund to the customer is released in the same transaction.
pub async fn vendor_reject<B: LedgerDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    vendor_decision(path.into_inner(), VendorDecision::Reject, api.as_ref()).await
}

async fn vendor_decision<B: LedgerDatabase>(
    order_id: OrderId,
    decision: VendorDecision,
    api: &OrderFlowApi<B>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST vendor {decision} for {order_id}");
    let order = api.record_vendor_decision(&order_id, decision).await.map_err(|e| {
        debug!("💻️ Could not record vendor decision. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Delivery  ----------------------------------------------------
route!(delivery_status => Post "/order/{order_id}/status" impl LedgerDatabase);
/// Records a delivery service status change against the order. `Deliver` stamps the delivery
/// time but leaves the order `Placed`; the maintenance sweep finalises it to `Completed` once
/// the dispute window lapses.
pub async fn delivery_status<B: LedgerDatabase>(
    path: web::Path<OrderId>,
    body: web::Json<DeliveryUpdateParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let event = body.into_inner().event;
    debug!("💻️ POST delivery {event} for {order_id}");
    let order = api.record_delivery_event(&order_id, event).await.map_err(|e| {
        debug!("💻️ Could not record delivery event. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}
