//! # Bhojan ledger server
//! This crate hosts the HTTP surface over the ledger engine. It is responsible for:
//! * Listening for incoming webhook notifications from the ordering service and the payment
//!   gateway, and feeding them to the engine idempotently.
//! * Exposing the thin admin, vendor and delivery routes that drive the order, refund and
//!   payout state machines.
//! * Running the background workers: the nightly payout reconciler and the delivered-order
//!   completion sweep.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](crate::config) for more
//! information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/webhook/{order,payment,refund}`: Webhook intake. These always answer in the 200 range so
//!   upstream services do not retry forever; the body carries the real outcome.
//! * `/food/admin/...`: Order statements, searches, refund approvals and cancellations.
//! * `/food/vendor/...`: Restaurant accept/reject decisions.
//! * `/food/delivery/...`: Delivery status updates.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;
pub mod webhook_routes;
pub mod workers;

#[cfg(test)]
mod endpoint_tests;
