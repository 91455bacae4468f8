use std::fmt::Display;

use ble_common::Paisa;
use serde::{Deserialize, Serialize};

use crate::db_types::{AttemptKind, Order, Payout, Refund};

/// What a payment webhook did to the ledger.
#[derive(Debug, Clone)]
pub enum PaymentEventOutcome {
    /// A successful payment moved the order to `Placed`.
    Placed(Order),
    /// The attempt was logged but no transition fired (failures, drops, and successes against
    /// orders that are no longer pending).
    AttemptRecorded(AttemptKind),
    /// The event was a replay and the ledger is untouched.
    Duplicate,
}

/// What a refund webhook did to the ledger.
#[derive(Debug, Clone)]
pub enum RefundEventOutcome {
    /// First sight of this refund id; the refund record was created.
    Initiated(Refund),
    /// A terminal event resolved the refund and moved the order's refund status with it.
    Resolved { refund: Refund, order: Order },
    /// The event was a replay (or arrived after the refund already resolved) and the ledger is
    /// untouched.
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub order: Order,
    /// Whether this mutation opened a refund that is ready for execution, i.e. whether the
    /// refund hook should fire.
    pub refund_opened: bool,
}

/// The result of reconciling a single restaurant.
#[derive(Debug, Clone)]
pub enum PayoutOutcome {
    /// A transfer was confirmed and member orders were stamped.
    Completed { payout: Payout, orders_stamped: u64 },
    /// A batch exists but the gateway has not resolved its transfer yet. Nothing further
    /// happens for this restaurant until the next run.
    TransferPending(Payout),
    /// The gateway reported the transfer failed; the batch is closed and its orders released.
    TransferFailed(Payout),
    /// The payout float cannot cover the batch. No batch was created.
    InsufficientBalance { required: Paisa, available: Paisa },
    /// The eligible orders sum to zero or less; the balance carries forward to a later run.
    CarriedForward(Paisa),
    /// No eligible orders and no unresolved batches.
    NothingToPay,
    /// Another run holds the restaurant's payout lock.
    Locked,
    /// The gateway could not be reached to check the float; the restaurant is skipped.
    GatewayUnavailable,
}

/// Tallies for one reconciliation sweep across all restaurants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutRunSummary {
    pub restaurants: usize,
    pub completed: usize,
    pub pending: usize,
    pub failed: usize,
    pub insufficient_balance: usize,
    pub carried_forward: usize,
    pub nothing_to_pay: usize,
    pub locked: usize,
    pub gateway_unavailable: usize,
    pub errors: usize,
    pub integrity_violations: usize,
    pub orders_stamped: u64,
}

impl PayoutRunSummary {
    pub fn record(&mut self, outcome: &PayoutOutcome) {
        match outcome {
            PayoutOutcome::Completed { orders_stamped, .. } => {
                self.completed += 1;
                self.orders_stamped += orders_stamped;
            },
            PayoutOutcome::TransferPending(_) => self.pending += 1,
            PayoutOutcome::TransferFailed(_) => self.failed += 1,
            PayoutOutcome::InsufficientBalance { .. } => self.insufficient_balance += 1,
            PayoutOutcome::CarriedForward(_) => self.carried_forward += 1,
            PayoutOutcome::NothingToPay => self.nothing_to_pay += 1,
            PayoutOutcome::Locked => self.locked += 1,
            PayoutOutcome::GatewayUnavailable => self.gateway_unavailable += 1,
        }
    }
}

impl Display for PayoutRunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} restaurants: {} completed ({} orders stamped), {} pending, {} failed, {} short of balance, {} carried \
             forward, {} idle, {} locked, {} gateway outages, {} errors, {} integrity violations",
            self.restaurants,
            self.completed,
            self.orders_stamped,
            self.pending,
            self.failed,
            self.insufficient_balance,
            self.carried_forward,
            self.nothing_to_pay,
            self.locked,
            self.gateway_unavailable,
            self.errors,
            self.integrity_violations
        )
    }
}
