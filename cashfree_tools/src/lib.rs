mod api;
mod config;
mod error;
mod payment_webhook;
mod refund_update;

mod data_objects;
mod helpers;

pub use api::PayoutsApi;
pub use config::CashfreeConfig;
pub use data_objects::{AccountBalance, CashfreeEnvelope, NewTransfer, Transfer, TransferReceipt, TransferStatusData};
pub use error::CashfreeApiError;
pub use helpers::{paisa_from_rupee_value, parse_rupee_amount, rupee_string};
pub use payment_webhook::{
    CustomerDetails,
    PaymentErrorDetails,
    PaymentWebhook,
    PaymentWebhookData,
    PaymentWebhookType,
    WebhookOrder,
    WebhookPayment,
};
pub use refund_update::RefundUpdate;
