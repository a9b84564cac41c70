use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use trava_core::batch::{
    BatchTransition, CheckParams, CheckResult, FailedAvailabilityCheck, SearchBatch, TaskOutcome,
    TaskSpec,
};
use trava_core::events::{NotificationSink, SearchEvent};
use trava_core::provider::{FlightAvailabilityProvider, HotelAvailabilityProvider};
use trava_core::repository::{BatchRepository, FailedCheckRepository};
use trava_core::search::{PackageSearchRequest, ValidationError};
use trava_search::LiveSearchAggregator;

/// Fans one search request out into independent availability checks and
/// drives the batch to its terminal state as results come back.
pub struct BatchOrchestrator {
    batches: Arc<dyn BatchRepository>,
    failed_checks: Arc<dyn FailedCheckRepository>,
    flights: Arc<dyn FlightAvailabilityProvider>,
    hotels: Arc<dyn HotelAvailabilityProvider>,
    aggregator: Arc<LiveSearchAggregator>,
    sink: Arc<dyn NotificationSink>,
}

impl BatchOrchestrator {
    pub fn new(
        batches: Arc<dyn BatchRepository>,
        failed_checks: Arc<dyn FailedCheckRepository>,
        flights: Arc<dyn FlightAvailabilityProvider>,
        hotels: Arc<dyn HotelAvailabilityProvider>,
        aggregator: Arc<LiveSearchAggregator>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            batches,
            failed_checks,
            flights,
            hotels,
            aggregator,
            sink,
        }
    }

    /// Validate the request, persist a pending batch and dispatch one
    /// task per required check. Does not wait for any check to finish.
    pub async fn start_batch(
        self: &Arc<Self>,
        request: PackageSearchRequest,
    ) -> Result<Uuid, StartBatchError> {
        request.validate(Utc::now().date_naive())?;

        let specs = SearchBatch::plan(&request);
        let task_ids = specs.iter().map(|s| s.task_id.clone()).collect();
        let batch = SearchBatch::new(request, task_ids);
        let batch_id = batch.id;

        self.batches
            .insert_batch(&batch)
            .await
            .map_err(StartBatchError::Storage)?;
        info!(%batch_id, tasks = specs.len(), "search batch started");

        for spec in specs {
            let orchestrator = Arc::clone(self);
            tokio::spawn(async move {
                orchestrator.run_check(batch_id, spec).await;
            });
        }
        Ok(batch_id)
    }

    async fn run_check(self: Arc<Self>, batch_id: Uuid, spec: TaskSpec) {
        let outcome = match &spec.params {
            CheckParams::Flight(params) => match self.flights.check(params).await {
                Ok(legs) => TaskOutcome::Succeeded(CheckResult::Flights {
                    direction: params.direction,
                    legs,
                }),
                Err(e) => TaskOutcome::Failed {
                    params: spec.params.clone(),
                    reason: e.to_string(),
                },
            },
            CheckParams::Hotel(params) => match self.hotels.check(params).await {
                Ok(stays) => TaskOutcome::Succeeded(CheckResult::Hotels { stays }),
                Err(e) => TaskOutcome::Failed {
                    params: spec.params.clone(),
                    reason: e.to_string(),
                },
            },
        };

        if let Err(e) = self
            .report_task_result(batch_id, &spec.task_id, outcome)
            .await
        {
            error!(%batch_id, task_id = %spec.task_id, "failed to report task result: {}", e);
        }
    }

    /// Record one task result. Safe to call concurrently from
    /// independent workers; the repository guarantees the terminal
    /// transition is observed by exactly one caller, and reports for an
    /// already-terminal batch are logged no-ops.
    pub async fn report_task_result(
        &self,
        batch_id: Uuid,
        task_id: &str,
        outcome: TaskOutcome,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let effects = outcome.clone();
        let report = self
            .batches
            .record_task_result(batch_id, task_id, outcome)
            .await?;

        match report.transition {
            BatchTransition::AlreadyTerminal => {
                info!(%batch_id, task_id, "ignoring result for terminal batch");
                return Ok(());
            }
            BatchTransition::UnknownTask => {
                warn!(%batch_id, task_id, "result for unknown task");
                return Ok(());
            }
            _ => {}
        }

        match &effects {
            TaskOutcome::Failed { params, reason } => {
                warn!(%batch_id, task_id, "availability check failed: {}", reason);
                let record =
                    FailedAvailabilityCheck::new(batch_id, task_id, params.clone(), reason.clone());
                if let Err(e) = self.failed_checks.insert(&record).await {
                    error!(%batch_id, task_id, "could not persist failed check: {}", e);
                }
            }
            TaskOutcome::Succeeded(CheckResult::Flights { legs, .. }) => {
                // Stream flights to live subscribers before the batch
                // converges.
                self.sink.publish(SearchEvent::FlightUpdated {
                    batch_id,
                    flights: legs.clone(),
                });
            }
            TaskOutcome::Succeeded(_) => {}
        }

        match report.transition {
            BatchTransition::Completed => {
                info!(%batch_id, "batch complete, aggregating");
                self.aggregator
                    .on_batch_complete(batch_id, report.results)
                    .await?;
            }
            BatchTransition::Failed => {
                self.aggregator
                    .on_batch_failed(batch_id, "All availability checks failed.")
                    .await?;
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartBatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}
