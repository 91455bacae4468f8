use std::{future::Future, pin::Pin, sync::Arc};

use bhojan_ledger_engine::events::{EventHandlers, EventHooks, OrderPlacedEvent, RefundInitiatedEvent};
use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DISPATCH_EVENT_BUFFER_SIZE: usize = 25;

pub const ACTION_UPDATE_PAYMENT_DETAILS: &str = "UPDATE_PAYMENT_DETAILS";
pub const ACTION_INITIATE_REFUND: &str = "INITIATE_REFUND";
pub const EVENT_ORDER: &str = "ORDER";
pub const EVENT_REFUND: &str = "REFUND";

/// The envelope POSTed to the downstream consumer for every ledger event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchEnvelope {
    pub action: String,
    pub event: String,
    pub data: Value,
}

impl DispatchEnvelope {
    pub fn new(action: &str, event: &str, data: Value) -> Self {
        Self { action: action.to_string(), event: event.to_string(), data }
    }
}

/// Fire-and-forget delivery of ledger events to the rest of the marketplace. The ledger has
/// already committed by the time an event fires, so delivery problems are logged and swallowed;
/// downstream consumers re-sync on their own schedule.
#[derive(Clone)]
pub struct MessageDispatcher {
    client: Arc<Client>,
    url: Option<String>,
}

impl MessageDispatcher {
    pub fn new(url: Option<String>) -> Self {
        Self { client: Arc::new(Client::new()), url }
    }

    pub async fn dispatch(&self, envelope: DispatchEnvelope) {
        let Some(url) = &self.url else {
            info!("📬️ No dispatch URL is configured. {}/{} event logged and dropped.", envelope.action, envelope.event);
            return;
        };
        match self.client.post(url).json(&envelope).send().await {
            Ok(res) if res.status().is_success() => {
                debug!("📬️ Dispatched {}/{} downstream.", envelope.action, envelope.event)
            },
            Ok(res) => {
                warn!("📬️ The downstream consumer answered {} to {}/{}.", res.status(), envelope.action, envelope.event)
            },
            Err(e) => warn!("📬️ Could not dispatch {}/{}. {e}", envelope.action, envelope.event),
        }
    }
}

/// Assigns event handlers for the events downstream services care about.
///
/// 1. OrderPlacedEvent - Once a payment places an order, the vendor service is told to surface
///    it to the restaurant and the customer's payment details are refreshed.
/// 2. RefundInitiatedEvent - Once a refund settlement is released, the payment service is asked
///    to execute the customer refund through the gateway.
pub fn create_dispatch_handlers(dispatcher: MessageDispatcher) -> EventHandlers {
    let mut hooks = EventHooks::default();
    let order_dispatcher = dispatcher.clone();
    hooks.on_order_placed(move |ev: OrderPlacedEvent| {
        let order_id = ev.order.order_id.clone();
        let data = match serde_json::to_value(&ev.order) {
            Ok(data) => data,
            Err(e) => {
                error!("📬️ Could not serialize order {order_id} for dispatch. {e}");
                return no_op();
            },
        };
        debug!("📬️ Order {order_id} was placed. Notifying downstream consumers.");
        let dispatcher = order_dispatcher.clone();
        Box::pin(async move {
            dispatcher.dispatch(DispatchEnvelope::new(ACTION_UPDATE_PAYMENT_DETAILS, EVENT_ORDER, data)).await;
        })
    });
    hooks.on_refund_initiated(move |ev: RefundInitiatedEvent| {
        let order_id = ev.order.order_id.clone();
        let data = match serde_json::to_value(&ev) {
            Ok(data) => data,
            Err(e) => {
                error!("📬️ Could not serialize the refund settlement for order {order_id}. {e}");
                return no_op();
            },
        };
        debug!("📬️ Refund released for order {order_id}. Asking the payment service to execute it.");
        let dispatcher = dispatcher.clone();
        Box::pin(async move {
            dispatcher.dispatch(DispatchEnvelope::new(ACTION_INITIATE_REFUND, EVENT_REFUND, data)).await;
        })
    });
    EventHandlers::new(DISPATCH_EVENT_BUFFER_SIZE, hooks)
}

fn no_op() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async {})
}
