//! # Ledger backend contracts.
//!
//! This module provides the interfaces that define the contracts of the lifecycle engine's
//! database *backends*, plus the payout gateway abstraction.
//!
//! ## The ledger
//! Every order carries four independent status columns (order, acceptance, delivery, refund),
//! one payment record with an append-only attempt log, zero or more refund records, and at most
//! one live payout batch membership. The traits here are the only way engine code touches that
//! state.
//!
//! ## Traits
//! * [`LedgerDatabase`] defines the mutating operations: idempotent event ingestion, status
//!   transitions and payout batch bookkeeping. Backends implement each operation as a single
//!   atomic transaction.
//! * [`LedgerManagement`] provides read-only queries over orders, payments, refunds and payouts.
//! * [`PayoutGateway`] abstracts the money-transfer service the payout reconciler talks to.
mod data_objects;
mod ledger_database;
mod ledger_management;
mod payout_gateway;

pub use data_objects::{CancellationOutcome, PaymentEventOutcome, PayoutOutcome, PayoutRunSummary, RefundEventOutcome};
pub use ledger_database::{LedgerDatabase, LedgerError};
pub use ledger_management::{LedgerManagement, LedgerQueryError};
pub use payout_gateway::{PayoutGateway, PayoutGatewayError, TransferDetails, TransferRequest, TransferStatus};
