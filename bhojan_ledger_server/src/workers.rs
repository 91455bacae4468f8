use bhojan_ledger_engine::{db_types::Order, events::EventProducers, OrderFlowApi, PayoutApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

use crate::{
    config::{PayoutService, ServerConfig},
    errors::ServerError,
    integrations::cashfree::CashfreePayoutGateway,
};

/// Starts the payout reconciliation worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
///
/// The first tick fires immediately, so any batches left unresolved by a crash are settled as
/// soon as the server is back up.
pub fn start_payout_worker(config: &ServerConfig, db: SqliteDatabase) -> Result<JoinHandle<()>, ServerError> {
    let gateway = match config.payout_service {
        PayoutService::Cashfree => CashfreePayoutGateway::new(config.cashfree_config.clone())?,
    };
    let interval = config.payout_interval;
    let gateway_timeout = config.gateway_timeout;
    Ok(tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = PayoutApi::new(db, gateway).with_gateway_timeout(gateway_timeout);
        info!("🕰️ Payout reconciliation worker started");
        loop {
            timer.tick().await;
            info!("🕰️ Running payout reconciliation");
            match api.reconcile_all().await {
                Ok(summary) => info!("🕰️ Payout reconciliation done. {summary}"),
                Err(e) => error!("🕰️ Error running payout reconciliation: {e}"),
            }
        }
    }))
}

/// Starts the order maintenance worker, which sweeps orders that were delivered long enough ago
/// from `Placed` to `Completed` so they become payable.
pub fn start_maintenance_worker(config: &ServerConfig, db: SqliteDatabase, producers: EventProducers) -> JoinHandle<()> {
    let interval = config.maintenance_interval;
    let min_age = config.complete_after;
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Order completion worker started");
        loop {
            timer.tick().await;
            match api.complete_delivered_orders(min_age).await {
                Ok(completed) if completed.is_empty() => debug!("🕰️ No delivered orders are ready to complete"),
                Ok(completed) => {
                    info!("🕰️ {} delivered orders completed", completed.len());
                    debug!("🕰️ Completed orders: {}", order_list(&completed));
                },
                Err(e) => error!("🕰️ Error running the delivered order sweep: {e}"),
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} restaurant: {}", o.id, o.order_id, o.restaurant_id))
        .collect::<Vec<String>>()
        .join(", ")
}
