//! Glue between the ledger engine and the outside world: the Cashfree payouts gateway, the
//! webhook payload converters, and the downstream event dispatcher.

pub mod cashfree;
pub mod dispatcher;
