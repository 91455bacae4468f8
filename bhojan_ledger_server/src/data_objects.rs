use std::fmt::Display;

use bhojan_ledger_engine::{db_types::CancelledBy, state::DeliveryEvent};
use serde::{Deserialize, Serialize};

/// The body every webhook route answers with. Webhook callers only see 200s; this flag is the
/// real outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderParams {
    pub cancelled_by: CancelledBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryUpdateParams {
    pub event: DeliveryEvent,
}
