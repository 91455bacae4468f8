//! Bhojan Ledger Engine
//!
//! The ledger engine tracks every rupee that moves through the marketplace: order payments,
//! refunds on cancellations, and the nightly payouts that settle restaurants. This library
//! contains the core logic and is transport-agnostic; the HTTP surface lives in the server
//! crate.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the
//!    database directly. Instead, use the public API provided by the engine. The exception is
//!    the data types used in the database. These are defined in the `db_types` module and are
//!    public.
//! 2. The engine public API ([`OrderFlowApi`], [`RefundApi`], [`PayoutApi`],
//!    [`LedgerQueryApi`]). Specific backends need to implement the traits in the [`traits`]
//!    module in order to act as a backend for the ledger server.
//! 3. The state tables ([`mod@state`]). Every status column in the ledger moves only along the
//!    transitions defined there.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted
//! when certain actions occur within the ledger, for example when a payment places an order.
//! A simple actor framework is used so that you can easily hook into these events and perform
//! custom actions.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod state;
pub mod traits;

mod ble_api;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use ble_api::{
    ledger_query_api::LedgerQueryApi,
    order_flow_api::OrderFlowApi,
    order_objects,
    payout_api::PayoutApi,
    refund_api::RefundApi,
};
