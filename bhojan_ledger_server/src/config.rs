use std::{env, str::FromStr};

use ble_common::parse_boolean_flag;
use cashfree_tools::CashfreeConfig;
use chrono::Duration;
use log::*;

const DEFAULT_BLS_HOST: &str = "127.0.0.1";
const DEFAULT_BLS_PORT: u16 = 8460;
const DEFAULT_FREE_CANCEL_WINDOW: Duration = Duration::minutes(5);
const DEFAULT_COMPLETE_AFTER: Duration = Duration::minutes(30);
const DEFAULT_PAYOUT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(86_400);
const DEFAULT_MAINTENANCE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(300);
const DEFAULT_GATEWAY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How long after placement a paying customer can cancel and still get an automatic full
    /// refund.
    pub free_cancel_window: Duration,
    /// How long after delivery an order is left alone before the maintenance sweep finalises it
    /// to `Completed` and it becomes payable.
    pub complete_after: Duration,
    /// How often the payout reconciler visits the restaurants.
    pub payout_interval: std::time::Duration,
    /// How often delivered orders are swept to `Completed`.
    pub maintenance_interval: std::time::Duration,
    /// How long to wait on a payout gateway call before giving up and leaving the batch for the
    /// next run to resolve.
    pub gateway_timeout: std::time::Duration,
    /// Kill switch for the payout worker. Webhook ingestion keeps running when this is off, so
    /// a staging server can replay production traffic without moving money.
    pub payouts_enabled: bool,
    /// Which gateway executes restaurant payouts.
    pub payout_service: PayoutService,
    /// Cashfree payouts API configuration
    pub cashfree_config: CashfreeConfig,
    /// Where order-placed and refund-initiated events are POSTed. When unset, events are logged
    /// and dropped.
    pub dispatch_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BLS_HOST.to_string(),
            port: DEFAULT_BLS_PORT,
            database_url: String::default(),
            free_cancel_window: DEFAULT_FREE_CANCEL_WINDOW,
            complete_after: DEFAULT_COMPLETE_AFTER,
            payout_interval: DEFAULT_PAYOUT_INTERVAL,
            maintenance_interval: DEFAULT_MAINTENANCE_INTERVAL,
            gateway_timeout: DEFAULT_GATEWAY_TIMEOUT,
            payouts_enabled: true,
            payout_service: PayoutService::default(),
            cashfree_config: CashfreeConfig::default(),
            dispatch_url: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BLS_HOST").ok().unwrap_or_else(|| DEFAULT_BLS_HOST.into());
        let port = env::var("BLS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BLS_PORT. {e} Using the default, {DEFAULT_BLS_PORT}, instead."
                    );
                    DEFAULT_BLS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BLS_PORT);
        let database_url = env::var("BLS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ BLS_DATABASE_URL is not set. Please set it to the URL for the ledger database.");
            String::default()
        });
        let (free_cancel_window, complete_after) = configure_lifecycle_windows();
        let payout_interval = interval_from_env("BLS_PAYOUT_INTERVAL_SECS", DEFAULT_PAYOUT_INTERVAL);
        let maintenance_interval = interval_from_env("BLS_MAINTENANCE_INTERVAL_SECS", DEFAULT_MAINTENANCE_INTERVAL);
        let gateway_timeout = interval_from_env("BLS_GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT);
        let payouts_enabled = parse_boolean_flag(env::var("BLS_PAYOUTS_ENABLED").ok(), true);
        let payout_service = PayoutService::from_env_or_default();
        let cashfree_config = CashfreeConfig::new_from_env_or_default();
        let dispatch_url = env::var("BLS_DISPATCH_URL").ok();
        if dispatch_url.is_none() {
            info!("🪛️ BLS_DISPATCH_URL is not set. Order and refund events will be logged and dropped.");
        }
        Self {
            host,
            port,
            database_url,
            free_cancel_window,
            complete_after,
            payout_interval,
            maintenance_interval,
            gateway_timeout,
            payouts_enabled,
            payout_service,
            cashfree_config,
            dispatch_url,
        }
    }
}

//-----------------------------------------------  PayoutService  -----------------------------------------------------
/// The gateway that executes restaurant payouts. Only Cashfree is wired up today; the enum is
/// here so that a second provider slots into the configuration without touching the worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PayoutService {
    #[default]
    Cashfree,
}

impl PayoutService {
    pub fn from_env_or_default() -> Self {
        env::var("BLS_PAYOUT_SERVICE")
            .map(|s| {
                s.parse::<PayoutService>().unwrap_or_else(|_| {
                    warn!("🪛️ {s} is not a supported value for BLS_PAYOUT_SERVICE. Using CASHFREE instead.");
                    PayoutService::default()
                })
            })
            .ok()
            .unwrap_or_default()
    }
}

impl FromStr for PayoutService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASHFREE" => Ok(Self::Cashfree),
            s => Err(format!("Unknown payout service: {s}")),
        }
    }
}

fn configure_lifecycle_windows() -> (Duration, Duration) {
    let free_cancel_window = env::var("BLS_FREE_CANCEL_WINDOW_MINS")
        .map_err(|_| {
            info!(
                "🪛️ BLS_FREE_CANCEL_WINDOW_MINS is not set. Using the default value of {} mins.",
                DEFAULT_FREE_CANCEL_WINDOW.num_minutes()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::minutes)
                .map_err(|e| warn!("🪛️ Invalid configuration value for BLS_FREE_CANCEL_WINDOW_MINS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_FREE_CANCEL_WINDOW);
    let complete_after = env::var("BLS_COMPLETE_AFTER_MINS")
        .map_err(|_| {
            info!(
                "🪛️ BLS_COMPLETE_AFTER_MINS is not set. Using the default value of {} mins.",
                DEFAULT_COMPLETE_AFTER.num_minutes()
            )
        })
        .and_then(|s| {
            s.parse::<i64>()
                .map(Duration::minutes)
                .map_err(|e| warn!("🪛️ Invalid configuration value for BLS_COMPLETE_AFTER_MINS. {e}"))
        })
        .ok()
        .unwrap_or(DEFAULT_COMPLETE_AFTER);
    (free_cancel_window, complete_after)
}

fn interval_from_env(var: &str, default: std::time::Duration) -> std::time::Duration {
    env::var(var)
        .map_err(|_| info!("🪛️ {var} is not set. Using the default value of {} secs.", default.as_secs()))
        .and_then(|s| {
            s.parse::<u64>()
                .map(std::time::Duration::from_secs)
                .map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}"))
        })
        .ok()
        .unwrap_or(default)
}
