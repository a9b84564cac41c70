use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use trava_core::batch::CheckParams;
use trava_core::provider::{FlightAvailabilityProvider, HotelAvailabilityProvider};
use trava_core::repository::{BatchRepository, FailedCheckRepository, PackageRepository};

/// Background sweep over failed availability checks and expired search
/// artifacts. Both operations continue past individual record failures.
pub struct RetrySupervisor {
    failed_checks: Arc<dyn FailedCheckRepository>,
    flights: Arc<dyn FlightAvailabilityProvider>,
    hotels: Arc<dyn HotelAvailabilityProvider>,
    batches: Arc<dyn BatchRepository>,
    packages: Arc<dyn PackageRepository>,
    max_retry_count: Option<u32>,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct RetryOutcome {
    pub recovered: usize,
    pub still_failing: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct PurgeOutcome {
    pub batches_removed: usize,
}

impl RetrySupervisor {
    pub fn new(
        failed_checks: Arc<dyn FailedCheckRepository>,
        flights: Arc<dyn FlightAvailabilityProvider>,
        hotels: Arc<dyn HotelAvailabilityProvider>,
        batches: Arc<dyn BatchRepository>,
        packages: Arc<dyn PackageRepository>,
        max_retry_count: Option<u32>,
    ) -> Self {
        Self {
            failed_checks,
            flights,
            hotels,
            batches,
            packages,
            max_retry_count,
        }
    }

    /// Re-run one fresh availability check per failed record. A record
    /// is deleted on success, kept with an incremented counter on
    /// another failure, and skipped when past the configured cap or
    /// already claimed by another pass.
    pub async fn retry_all_failed(&self) -> RetryOutcome {
        let mut outcome = RetryOutcome::default();

        let records = match self.failed_checks.list_all().await {
            Ok(records) => records,
            Err(e) => {
                error!("could not list failed checks: {}", e);
                return outcome;
            }
        };

        for record in records {
            if let Some(cap) = self.max_retry_count {
                if record.retry_count >= cap {
                    warn!(
                        record_id = %record.id,
                        retry_count = record.retry_count,
                        "retry cap reached, leaving record for manual handling"
                    );
                    outcome.skipped += 1;
                    continue;
                }
            }

            match self.failed_checks.claim(record.id).await {
                Ok(true) => {}
                Ok(false) => {
                    outcome.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(record_id = %record.id, "could not claim record: {}", e);
                    outcome.skipped += 1;
                    continue;
                }
            }

            let result = match &record.params {
                CheckParams::Flight(params) => self.flights.check(params).await.map(|_| ()),
                CheckParams::Hotel(params) => self.hotels.check(params).await.map(|_| ()),
            };

            match result {
                Ok(()) => match self.failed_checks.delete(record.id).await {
                    Ok(()) => {
                        info!(record_id = %record.id, task_id = %record.task_id, "retry succeeded");
                        outcome.recovered += 1;
                    }
                    Err(e) => {
                        error!(record_id = %record.id, "could not delete recovered record: {}", e);
                        // The record stays; release the claim so the next
                        // pass can pick it up again.
                        if let Err(e) = self.failed_checks.release(record.id).await {
                            error!(record_id = %record.id, "could not release claim: {}", e);
                        }
                        outcome.still_failing += 1;
                    }
                },
                Err(e) => {
                    if let Err(e) = self
                        .failed_checks
                        .record_attempt(record.id, &e.to_string())
                        .await
                    {
                        error!(record_id = %record.id, "could not record retry attempt: {}", e);
                    }
                    if let Err(e) = self.failed_checks.release(record.id).await {
                        error!(record_id = %record.id, "could not release claim: {}", e);
                    }
                    outcome.still_failing += 1;
                }
            }
        }

        info!(
            recovered = outcome.recovered,
            still_failing = outcome.still_failing,
            skipped = outcome.skipped,
            "retry pass finished"
        );
        outcome
    }

    /// Delete batches (and their packages) that have been terminal for
    /// longer than the retention window. Pending batches and recently
    /// finished ones are never touched.
    pub async fn purge_expired_searches(&self, retention: Duration) -> PurgeOutcome {
        let cutoff = Utc::now() - retention;

        let purged = match self.batches.delete_terminal_before(cutoff).await {
            Ok(ids) => ids,
            Err(e) => {
                error!("could not purge expired batches: {}", e);
                return PurgeOutcome::default();
            }
        };

        for batch_id in &purged {
            if let Err(e) = self.packages.delete_for_batch(*batch_id).await {
                error!(%batch_id, "could not delete packages for purged batch: {}", e);
            }
        }

        if !purged.is_empty() {
            info!(count = purged.len(), "purged expired search batches");
        }
        PurgeOutcome {
            batches_removed: purged.len(),
        }
    }
}
