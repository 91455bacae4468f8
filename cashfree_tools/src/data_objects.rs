use ble_common::Paisa;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    helpers::{parse_rupee_amount, rupee_string},
    CashfreeApiError,
};

pub const STATUS_SUCCESS: &str = "SUCCESS";
pub const SUB_CODE_NOT_FOUND: &str = "404";

/// Every payout endpoint answers with the same envelope around an endpoint-specific payload.
/// Transport-level failures surface as HTTP errors; gateway-level failures arrive as a 2xx
/// with `status` set to something other than `SUCCESS`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeEnvelope<T> {
    pub status: String,
    #[serde(rename = "subCode")]
    pub sub_code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> CashfreeEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    pub fn is_not_found(&self) -> bool {
        self.sub_code == SUB_CODE_NOT_FOUND
    }

    /// Extracts the payload, converting a gateway-level failure into [`CashfreeApiError::QueryError`].
    pub fn into_data(self) -> Result<T, CashfreeApiError> {
        if !self.is_success() {
            let status = self.sub_code.parse::<u16>().unwrap_or_default();
            return Err(CashfreeApiError::QueryError { status, message: self.message });
        }
        self.data.ok_or_else(|| CashfreeApiError::JsonError("Response envelope carried no data".to_string()))
    }
}

/// Payload of `getBalance`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub balance: String,
    pub available_balance: String,
}

impl AccountBalance {
    /// The spendable part of the float, in minor units.
    pub fn available(&self) -> Result<Paisa, CashfreeApiError> {
        parse_rupee_amount(&self.available_balance)
    }
}

/// Body of `requestTransfer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub bene_id: String,
    pub amount: String,
    pub transfer_id: String,
    pub remarks: String,
}

impl NewTransfer {
    pub fn new<S1, S2, S3>(bene_id: S1, amount: Paisa, transfer_id: S2, remarks: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            bene_id: bene_id.into(),
            amount: rupee_string(amount),
            transfer_id: transfer_id.into(),
            remarks: remarks.into(),
        }
    }
}

/// Payload of a `requestTransfer` answer. All fields are best-effort; a transfer that is
/// still queued has no UTR yet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    pub reference_id: Option<i64>,
    pub utr: Option<String>,
    pub acknowledged: Option<i64>,
}

/// Payload of `getTransferStatus`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferStatusData {
    pub transfer: Transfer,
}

/// The gateway's record of a transfer. `status` is one of SUCCESS, PENDING, PROCESSING,
/// RECEIVED, FAILED, REJECTED or REVERSED.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub transfer_id: String,
    pub bene_id: Option<String>,
    pub amount: Option<String>,
    pub status: String,
    pub reference_id: Option<String>,
    pub utr: Option<String>,
    pub reason: Option<String>,
    pub processed_on: Option<DateTime<Utc>>,
}
