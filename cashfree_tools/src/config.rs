use ble_common::Secret;
use log::*;

/// The gateway's sandbox environment. Production runs set `BLS_CASHFREE_PAYOUT_URL` explicitly.
pub const DEFAULT_PAYOUT_URL: &str = "https://payout-gamma.cashfree.com";

#[derive(Debug, Clone, Default)]
pub struct CashfreeConfig {
    pub payout_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

impl CashfreeConfig {
    pub fn new_from_env_or_default() -> Self {
        let payout_url = std::env::var("BLS_CASHFREE_PAYOUT_URL").unwrap_or_else(|_| {
            warn!("BLS_CASHFREE_PAYOUT_URL not set, using the gateway sandbox at {DEFAULT_PAYOUT_URL}");
            DEFAULT_PAYOUT_URL.to_string()
        });
        let client_id = std::env::var("BLS_CASHFREE_CLIENT_ID").unwrap_or_else(|_| {
            warn!("BLS_CASHFREE_CLIENT_ID not set, using (probably useless) default");
            "CF00000000000000".to_string()
        });
        let client_secret = Secret::new(std::env::var("BLS_CASHFREE_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("BLS_CASHFREE_CLIENT_SECRET not set, using (probably useless) default");
            "cfsk_ma_test_000000000000000000".to_string()
        }));
        Self { payout_url, client_id, client_secret }
    }
}
