use std::fmt::Display;

use ble_common::Paisa;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PayoutGatewayError {
    #[error("The payout gateway could not be reached: {0}")]
    Unreachable(String),
    #[error("The payout gateway rejected the request: {0}")]
    Rejected(String),
    #[error("The payout gateway sent a response we could not interpret: {0}")]
    InvalidResponse(String),
}

/// The gateway's view of a transfer. `NotFound` is only ever reported by status lookups and
/// means the gateway has no record of the transfer id, i.e. the original request never landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    Pending,
    Failed,
    NotFound,
}

impl Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Success => write!(f, "Success"),
            TransferStatus::Pending => write!(f, "Pending"),
            TransferStatus::Failed => write!(f, "Failed"),
            TransferStatus::NotFound => write!(f, "NotFound"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// The beneficiary registered with the gateway. We register restaurants under their own ids.
    pub bene_id: String,
    pub amount: Paisa,
    /// Caller-chosen idempotency key for the transfer
    pub transfer_id: String,
    pub remarks: String,
}

#[derive(Debug, Clone)]
pub struct TransferDetails {
    pub transfer_id: String,
    pub status: TransferStatus,
    /// The gateway's own reference for the transfer, once it has one
    pub reference_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// The money-transfer service the payout reconciler pays restaurants through.
///
/// Implementations sit in the server crate so the engine stays free of HTTP concerns. The
/// reconciler only ever needs these three calls: check the float, fire a transfer, and look a
/// transfer up by the id *we* chose for it.
#[allow(async_fn_in_trait)]
pub trait PayoutGateway {
    /// The current balance of the platform's payout float.
    async fn account_balance(&self) -> Result<Paisa, PayoutGatewayError>;

    /// Requests a transfer. The gateway deduplicates on `transfer_id`, so replaying a request
    /// after a crash is safe.
    async fn request_transfer(&self, request: &TransferRequest) -> Result<TransferDetails, PayoutGatewayError>;

    /// Looks up a transfer by the id supplied in the original request.
    async fn transfer_details(&self, transfer_id: &str) -> Result<TransferDetails, PayoutGatewayError>;
}
