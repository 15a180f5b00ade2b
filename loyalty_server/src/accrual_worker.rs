//! The reconciliation worker.
//!
//! A single long-running task that walks every pending order, asks the accrual system about it, and applies the
//! verdict. Orders are processed one at a time. A failure on one order is logged and the order is simply retried on the
//! next pass; nothing short of the shutdown signal stops the worker.
use std::time::Duration;

use accrual_client::{AccrualApi, AccrualResult, AccrualSource};
use log::*;
use loyalty_engine::{
    db_types::{PendingOrder, SettlementResult},
    OrderStoreError,
    SettlementApi,
    SettlementDatabase,
    SettlementError,
    SqliteDatabase,
};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How long to sleep when there is nothing to do.
    pub idle_interval: Duration,
    /// How long to sleep between passes while orders are still pending.
    pub pass_interval: Duration,
}

#[derive(Debug, Error)]
enum ApplyError {
    #[error("{0}")]
    Store(#[from] OrderStoreError),
    #[error("{0}")]
    Settlement(#[from] SettlementError),
}

/// Tally of what happened during one pass over the pending orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub checked: usize,
    pub processing: usize,
    pub invalid: usize,
    pub credited: usize,
    pub already_settled: usize,
    pub errors: usize,
    /// Set if the pass was cut short by the accrual system's rate limit.
    pub rate_limited: Option<Duration>,
    /// Set if the pass was abandoned because the shutdown signal fired.
    pub interrupted: bool,
}

impl PassSummary {
    /// How long the worker should rest before the next pass.
    pub fn next_delay(&self, config: &WorkerConfig) -> Duration {
        match self.rate_limited {
            Some(cooldown) => cooldown,
            None if self.checked == 0 => config.idle_interval,
            None => config.pass_interval,
        }
    }
}

pub struct ReconciliationWorker<B, C> {
    settlement: SettlementApi<B>,
    source: C,
    config: WorkerConfig,
}

impl<B, C> ReconciliationWorker<B, C>
where
    B: SettlementDatabase,
    C: AccrualSource,
{
    pub fn new(db: B, source: C, config: WorkerConfig) -> Self {
        Self { settlement: SettlementApi::new(db), source, config }
    }

    /// Makes one pass over the pending orders, in registration order.
    ///
    /// A rate-limit response ends the pass immediately; the remaining orders are picked up, from the start of the
    /// list, on the next pass. Any change on `shutdown` (or its sender going away) abandons the accrual query in
    /// flight and ends the pass without touching the rest of the list.
    pub async fn run_pass(&self, shutdown: &mut watch::Receiver<bool>) -> Result<PassSummary, OrderStoreError> {
        let pending = self.settlement.pending_orders().await?;
        let mut summary = PassSummary::default();
        if pending.is_empty() {
            return Ok(summary);
        }
        debug!("🕰️ {} orders pending settlement", pending.len());
        for order in pending {
            if *shutdown.borrow() {
                summary.interrupted = true;
                break;
            }
            let fetched = tokio::select! {
                result = self.source.fetch_accrual(order.number.as_str()) => result,
                _ = shutdown.changed() => {
                    debug!("🕰️ Shutdown requested while querying order {}. Ending the pass", order.number);
                    summary.interrupted = true;
                    break;
                },
            };
            summary.checked += 1;
            match fetched {
                Ok(AccrualResult::RateLimited(cooldown)) => {
                    info!("🕰️ Accrual system is rate limiting. Pausing settlement for {cooldown:?}");
                    summary.rate_limited = Some(cooldown);
                    break;
                },
                Ok(result) => {
                    if let Err(e) = self.apply(&order, result, &mut summary).await {
                        error!("🕰️ Could not update order {}. Will retry on the next pass. {e}", order.number);
                        summary.errors += 1;
                    }
                },
                Err(e) => {
                    warn!("🕰️ Could not fetch the accrual for order {}. Will retry on the next pass. {e}", order.number);
                    summary.errors += 1;
                },
            }
        }
        Ok(summary)
    }

    async fn apply(
        &self,
        order: &PendingOrder,
        result: AccrualResult,
        summary: &mut PassSummary,
    ) -> Result<(), ApplyError> {
        match result {
            AccrualResult::Registered | AccrualResult::Processing => {
                self.settlement.mark_processing(&order.number).await?;
                summary.processing += 1;
            },
            AccrualResult::Invalid => {
                self.settlement.mark_invalid(&order.number).await?;
                summary.invalid += 1;
            },
            AccrualResult::Processed(accrual) => match self.settlement.settle(&order.number, accrual).await? {
                SettlementResult::Credited { .. } => summary.credited += 1,
                SettlementResult::AlreadySettled(_) => summary.already_settled += 1,
            },
            // Handled by the caller
            AccrualResult::RateLimited(_) => {},
        }
        Ok(())
    }

    /// Runs passes until `shutdown` carries `true` (or its sender is dropped).
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("🕰️ Reconciliation worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            let delay = match self.run_pass(&mut shutdown).await {
                Ok(summary) => {
                    if summary.checked > 0 {
                        info!(
                            "🕰️ Pass complete. {} checked, {} credited, {} invalid, {} still processing, {} errors",
                            summary.checked, summary.credited, summary.invalid, summary.processing, summary.errors
                        );
                    }
                    if summary.interrupted {
                        break;
                    }
                    summary.next_delay(&self.config)
                },
                Err(e) => {
                    error!("🕰️ Could not read the pending orders. {e}");
                    self.config.idle_interval
                },
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {},
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
            }
        }
        info!("🕰️ Reconciliation worker stopped");
    }
}

/// Starts the reconciliation worker on the current (actix) runtime. The returned handle completes once `shutdown`
/// fires.
pub fn start_reconciliation_worker(
    db: SqliteDatabase,
    accrual: AccrualApi,
    config: WorkerConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let worker = ReconciliationWorker::new(db, accrual, config);
    actix_web::rt::spawn(worker.run(shutdown))
}
