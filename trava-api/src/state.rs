use std::sync::Arc;

use tokio::sync::broadcast;

use trava_core::events::{NotificationSink, SearchEvent};
use trava_core::provider::{FlightAvailabilityProvider, HotelAvailabilityProvider};
use trava_core::repository::BatchRepository;
use trava_jobs::{BatchOrchestrator, RetrySupervisor};
use trava_search::{LiveSearchAggregator, PackageComposer};
use trava_store::{
    BroadcastSink, InMemoryBatchRepository, InMemoryFailedCheckRepository,
    InMemoryPackageRepository, SearchRules,
};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub aggregator: Arc<LiveSearchAggregator>,
    pub supervisor: Arc<RetrySupervisor>,
    pub batches: Arc<dyn BatchRepository>,
    pub sse_tx: broadcast::Sender<SearchEvent>,
}

impl AppState {
    /// Wire the full pipeline over the in-memory store with the given
    /// availability providers.
    pub fn in_memory(
        rules: SearchRules,
        flights: Arc<dyn FlightAvailabilityProvider>,
        hotels: Arc<dyn HotelAvailabilityProvider>,
    ) -> Self {
        let batches = Arc::new(InMemoryBatchRepository::new());
        let failed_checks = Arc::new(InMemoryFailedCheckRepository::new());
        let packages = Arc::new(InMemoryPackageRepository::new());

        let sink = Arc::new(BroadcastSink::new(256));
        let sse_tx = sink.sender();

        let composer = PackageComposer::new(rules.commission(), rules.commission_policy);
        let aggregator = Arc::new(LiveSearchAggregator::new(
            composer,
            batches.clone(),
            packages.clone(),
            sink.clone() as Arc<dyn NotificationSink>,
            rules.min_stay(),
        ));
        let orchestrator = Arc::new(BatchOrchestrator::new(
            batches.clone(),
            failed_checks.clone(),
            flights.clone(),
            hotels.clone(),
            aggregator.clone(),
            sink as Arc<dyn NotificationSink>,
        ));
        let supervisor = Arc::new(RetrySupervisor::new(
            failed_checks,
            flights,
            hotels,
            batches.clone(),
            packages,
            rules.max_retry_count,
        ));

        Self {
            orchestrator,
            aggregator,
            supervisor,
            batches,
            sse_tx,
        }
    }
}
