use std::{fmt::Debug, sync::Arc};

use ble_common::Paisa;
use chrono::Duration;
use log::*;
use tokio::time::timeout;

use crate::{
    db_types::{NewPayout, Payout},
    helpers::{new_transfer_id, Clock, SystemClock},
    traits::{
        LedgerDatabase,
        LedgerError,
        PayoutGateway,
        PayoutGatewayError,
        PayoutOutcome,
        PayoutRunSummary,
        TransferDetails,
        TransferRequest,
        TransferStatus,
    },
};

/// The platform's cut of every payout batch, in percent. Truncated towards zero when applied.
pub const TRANSACTION_CHARGE_PERCENT: i64 = 1;

pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;

/// How long a payout lock may sit before a new run assumes its owner crashed.
pub const DEFAULT_LOCK_STALE_AFTER_MINS: i64 = 60;

/// `PayoutApi` reconciles restaurant payouts: it batches payable orders, moves the money
/// through a [`PayoutGateway`], and stamps settled orders exactly once.
///
/// The reconciler is crash-safe. A batch is written in `Init` state *before* the transfer is
/// attempted, with a transfer id of our choosing. If the process dies at any point, the next
/// run finds the `Init` batch, asks the gateway what became of that transfer id, and completes
/// or fails the batch accordingly before creating new work.
pub struct PayoutApi<B, G> {
    db: B,
    gateway: G,
    clock: Arc<dyn Clock>,
    gateway_timeout: std::time::Duration,
    lock_stale_after: Duration,
}

impl<B, G> Debug for PayoutApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PayoutApi")
    }
}

impl<B, G> PayoutApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self {
            db,
            gateway,
            clock: Arc::new(SystemClock),
            gateway_timeout: std::time::Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
            lock_stale_after: Duration::minutes(DEFAULT_LOCK_STALE_AFTER_MINS),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_gateway_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.gateway_timeout = timeout;
        self
    }

    pub fn with_lock_stale_after(mut self, stale_after: Duration) -> Self {
        self.lock_stale_after = stale_after;
        self
    }
}

impl<B, G> PayoutApi<B, G>
where
    B: LedgerDatabase,
    G: PayoutGateway,
{
    /// Run a full reconciliation sweep: audit the ledger, then visit every restaurant that has
    /// payable orders or an unresolved batch.
    ///
    /// Individual restaurant failures are logged and tallied, never propagated; one bad
    /// beneficiary must not park everyone else's money.
    pub async fn reconcile_all(&self) -> Result<PayoutRunSummary, LedgerError> {
        let mut summary = PayoutRunSummary::default();
        let orphans = self.db.orphaned_payout_stamps().await?;
        for order in &orphans {
            error!(
                "🪙️ Order {} carries payout transaction id {} which matches no payout batch. The stamp was not \
                 written by this reconciler. Leaving the order untouched; it needs operator attention.",
                order.order_id,
                order.payout_transaction_id.as_deref().unwrap_or_default()
            );
        }
        summary.integrity_violations = orphans.len();
        let restaurants = self.db.restaurants_due_for_payout().await?;
        summary.restaurants = restaurants.len();
        info!("🪙️ Payout run starting. {} restaurant(s) due.", restaurants.len());
        for restaurant_id in &restaurants {
            match self.reconcile_restaurant(restaurant_id).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!("🪙️ Payout run for restaurant {restaurant_id} failed: {e}");
                    summary.errors += 1;
                },
            }
        }
        info!("🪙️ Payout run finished. {summary}");
        Ok(summary)
    }

    /// Reconcile a single restaurant under its advisory lock.
    pub async fn reconcile_restaurant(&self, restaurant_id: &str) -> Result<PayoutOutcome, LedgerError> {
        let now = self.clock.now();
        if !self.db.acquire_payout_lock(restaurant_id, self.lock_stale_after, now).await? {
            info!("🪙️ Restaurant {restaurant_id} is locked by another payout run. Skipping.");
            return Ok(PayoutOutcome::Locked);
        }
        let outcome = self.run_for_restaurant(restaurant_id).await;
        if let Err(e) = self.db.release_payout_lock(restaurant_id).await {
            error!("🪙️ Could not release payout lock for restaurant {restaurant_id}: {e}");
        }
        outcome
    }

    async fn run_for_restaurant(&self, restaurant_id: &str) -> Result<PayoutOutcome, LedgerError> {
        // Settle leftover Init batches before considering new work.
        for payout in self.db.unresolved_payouts(restaurant_id).await? {
            if let Some(outcome) = self.resolve_stale_batch(payout).await? {
                return Ok(outcome);
            }
        }
        for order_id in self.db.orders_missing_payout_amount(restaurant_id).await? {
            error!(
                "🪙️ Order {order_id} is completed but has no vendor payout amount. It is excluded from payouts and \
                 needs operator attention."
            );
        }
        let members = self.db.payable_orders(restaurant_id).await?;
        if members.is_empty() {
            debug!("🪙️ Nothing to pay for restaurant {restaurant_id}");
            return Ok(PayoutOutcome::NothingToPay);
        }
        let total = members.iter().map(|m| m.amount).sum::<Paisa>();
        if !total.is_positive() {
            warn!(
                "🪙️ Payable orders for restaurant {restaurant_id} sum to {total}. Carrying the balance forward until \
                 it turns positive."
            );
            return Ok(PayoutOutcome::CarriedForward(total));
        }
        let charges = total.percent(TRANSACTION_CHARGE_PERCENT);
        let net = total - charges;
        let available = match self.checked_gateway_call(self.gateway.account_balance(), "balance check").await {
            Some(balance) => balance,
            None => return Ok(PayoutOutcome::GatewayUnavailable),
        };
        if available < net {
            warn!(
                "🪙️ Payout float cannot cover restaurant {restaurant_id}: need {net}, have {available}. Deferring to \
                 the next run."
            );
            return Ok(PayoutOutcome::InsufficientBalance { required: net, available });
        }
        let payout = NewPayout {
            restaurant_id: restaurant_id.to_string(),
            total_order_amount: total,
            transaction_charges: charges,
            amount_paid_to_vendor: net,
            transfer_id: new_transfer_id(restaurant_id),
        };
        let payout = self.db.create_payout(payout, &members).await?;
        info!(
            "🪙️ Payout batch {} created for restaurant {restaurant_id}: {} order(s), {total} less {charges} charges \
             = {net}",
            payout.transfer_id,
            members.len()
        );
        let request = TransferRequest {
            bene_id: restaurant_id.to_string(),
            amount: net,
            transfer_id: payout.transfer_id.clone(),
            remarks: format!("Order settlement for {} order(s)", members.len()),
        };
        let details = match self.checked_gateway_call(self.gateway.request_transfer(&request), "transfer request").await
        {
            Some(details) => details,
            // The transfer may or may not have landed. The Init batch stays put and the next
            // run resolves it by transfer id.
            None => return Ok(PayoutOutcome::TransferPending(payout)),
        };
        self.apply_transfer_result(payout, &details, false).await
    }

    /// Resolve one leftover `Init` batch. `Ok(Some(outcome))` means the restaurant is done for
    /// this run; `Ok(None)` means the batch resolved and fresh work may proceed.
    async fn resolve_stale_batch(&self, payout: Payout) -> Result<Option<PayoutOutcome>, LedgerError> {
        warn!(
            "🪙️ Found unresolved payout batch {} for restaurant {} from an earlier run. Asking the gateway what \
             became of it.",
            payout.transfer_id, payout.restaurant_id
        );
        let details =
            match self.checked_gateway_call(self.gateway.transfer_details(&payout.transfer_id), "status lookup").await {
                Some(details) => details,
                None => return Ok(Some(PayoutOutcome::TransferPending(payout))),
            };
        match self.apply_transfer_result(payout, &details, true).await? {
            PayoutOutcome::TransferPending(p) => Ok(Some(PayoutOutcome::TransferPending(p))),
            // Resolved either way; the run may continue with a fresh batch.
            _ => Ok(None),
        }
    }

    /// Apply the gateway's verdict on a transfer to its batch. `resolving` marks the
    /// crash-recovery path, where `NotFound` means the original request never landed.
    async fn apply_transfer_result(
        &self,
        payout: Payout,
        details: &TransferDetails,
        resolving: bool,
    ) -> Result<PayoutOutcome, LedgerError> {
        match details.status {
            TransferStatus::Success => {
                let (payout, orders_stamped) = self.db.complete_payout(payout.id).await?;
                info!(
                    "🪙️ Transfer {} to restaurant {} succeeded. {} order(s) stamped.",
                    payout.transfer_id, payout.restaurant_id, orders_stamped
                );
                Ok(PayoutOutcome::Completed { payout, orders_stamped })
            },
            TransferStatus::Failed => {
                let payout = self.db.fail_payout(payout.id).await?;
                warn!(
                    "🪙️ Transfer {} to restaurant {} failed: {}. Its orders return to the payable pool.",
                    payout.transfer_id,
                    payout.restaurant_id,
                    details.reference_id.as_deref().unwrap_or("no reason given")
                );
                Ok(PayoutOutcome::TransferFailed(payout))
            },
            TransferStatus::NotFound if resolving => {
                let payout = self.db.fail_payout(payout.id).await?;
                warn!(
                    "🪙️ The gateway has no record of transfer {}. The crashed run never sent it. Batch marked failed.",
                    payout.transfer_id
                );
                Ok(PayoutOutcome::TransferFailed(payout))
            },
            TransferStatus::Pending | TransferStatus::NotFound => {
                debug!("🪙️ Transfer {} is still pending at the gateway", payout.transfer_id);
                Ok(PayoutOutcome::TransferPending(payout))
            },
        }
    }

    /// Run a gateway call under the configured timeout. Failures are logged and collapsed to
    /// `None`; the caller decides what a missing answer means for its batch.
    async fn checked_gateway_call<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, PayoutGatewayError>>,
        what: &str,
    ) -> Option<T> {
        match timeout(self.gateway_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!("🪙️ Payout gateway {what} failed: {e}");
                None
            },
            Err(_) => {
                warn!("🪙️ Payout gateway {what} timed out after {:?}", self.gateway_timeout);
                None
            },
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
