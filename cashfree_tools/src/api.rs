use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::CashfreeConfig,
    data_objects::{AccountBalance, CashfreeEnvelope, NewTransfer, Transfer, TransferReceipt, TransferStatusData},
    CashfreeApiError,
};

/// REST client for the gateway's payout endpoints. Authentication is header-based; the client
/// id and secret are installed as default headers when the client is built, so every request
/// carries them.
#[derive(Clone)]
pub struct PayoutsApi {
    config: CashfreeConfig,
    client: Arc<Client>,
}

impl PayoutsApi {
    pub fn new(config: CashfreeConfig) -> Result<Self, CashfreeApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let val = HeaderValue::from_str(config.client_id.as_str())
            .map_err(|e| CashfreeApiError::Initialization(e.to_string()))?;
        headers.insert("X-Client-Id", val);
        let val = HeaderValue::from_str(config.client_secret.reveal().as_str())
            .map_err(|e| CashfreeApiError::Initialization(e.to_string()))?;
        headers.insert("X-Client-Secret", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CashfreeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, CashfreeApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| CashfreeApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| CashfreeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| CashfreeApiError::RestResponseError(e.to_string()))?;
            Err(CashfreeApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.payout_url.trim_end_matches('/'))
    }

    /// The current state of the payout float.
    pub async fn get_balance(&self) -> Result<AccountBalance, CashfreeApiError> {
        debug!("Fetching payout account balance");
        let envelope = self
            .rest_query::<CashfreeEnvelope<AccountBalance>, ()>(Method::GET, "/payout/v1.2/getBalance", &[], None)
            .await?;
        let balance = envelope.into_data()?;
        info!("Payout balance: {} ({} available)", balance.balance, balance.available_balance);
        Ok(balance)
    }

    /// Asks the gateway to move money to a beneficiary. The gateway deduplicates on
    /// `transferId`, so retrying a request that may already have landed is safe. A rejection
    /// is reported inside the envelope, not as an `Err`.
    pub async fn request_transfer(
        &self,
        transfer: &NewTransfer,
    ) -> Result<CashfreeEnvelope<TransferReceipt>, CashfreeApiError> {
        debug!("Requesting transfer {} of ₹{} to {}", transfer.transfer_id, transfer.amount, transfer.bene_id);
        let envelope = self
            .rest_query::<CashfreeEnvelope<TransferReceipt>, &NewTransfer>(
                Method::POST,
                "/payout/v1.2/requestTransfer",
                &[],
                Some(transfer),
            )
            .await?;
        info!("Transfer {} answered: {} ({})", transfer.transfer_id, envelope.status, envelope.message);
        Ok(envelope)
    }

    /// Looks up a transfer by the id chosen when it was requested. `Ok(None)` means the
    /// gateway has no record of that id.
    pub async fn get_transfer_status(&self, transfer_id: &str) -> Result<Option<Transfer>, CashfreeApiError> {
        debug!("Fetching status of transfer {transfer_id}");
        let params = [("transferId", transfer_id)];
        let result = self
            .rest_query::<CashfreeEnvelope<TransferStatusData>, ()>(
                Method::GET,
                "/payout/v1.2/getTransferStatus",
                &params,
                None,
            )
            .await;
        match result {
            Ok(envelope) if envelope.is_not_found() => Ok(None),
            Ok(envelope) => Ok(Some(envelope.into_data()?.transfer)),
            Err(CashfreeApiError::QueryError { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
