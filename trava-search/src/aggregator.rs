use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use trava_core::batch::CheckResult;
use trava_core::events::{NotificationSink, SearchEvent};
use trava_core::flight::{FlightDirection, FlightItinerary, FlightLeg};
use trava_core::hotel::HotelStay;
use trava_core::repository::{BatchRepository, PackagePage, PackageRepository};
use trava_core::search::Occupancy;

use crate::composer::PackageComposer;

/// Consumes converged batch results, composes packages and notifies
/// live subscribers. Also serves the poll-style paginated read-back.
pub struct LiveSearchAggregator {
    composer: PackageComposer,
    batches: Arc<dyn BatchRepository>,
    packages: Arc<dyn PackageRepository>,
    sink: Arc<dyn NotificationSink>,
    min_stay: Duration,
}

impl LiveSearchAggregator {
    pub fn new(
        composer: PackageComposer,
        batches: Arc<dyn BatchRepository>,
        packages: Arc<dyn PackageRepository>,
        sink: Arc<dyn NotificationSink>,
        min_stay: Duration,
    ) -> Self {
        Self {
            composer,
            batches,
            packages,
            sink,
            min_stay,
        }
    }

    /// Merge the succeeded results of a completed batch into packages.
    /// Emits `search.completed`, or `search.failed` when nothing could
    /// be composed.
    pub async fn on_batch_complete(
        &self,
        batch_id: Uuid,
        results: Vec<CheckResult>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let batch = self
            .batches
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| format!("unknown batch {batch_id}"))?;
        let occupancy = Occupancy::combined(&batch.request.rooms);

        let mut outbound: Vec<FlightLeg> = Vec::new();
        let mut inbound: Vec<FlightLeg> = Vec::new();
        let mut stays: Vec<HotelStay> = Vec::new();
        for result in results {
            match result {
                CheckResult::Flights { direction, legs } => match direction {
                    FlightDirection::Outbound => outbound.extend(legs),
                    FlightDirection::Inbound => inbound.extend(legs),
                },
                CheckResult::Hotels { stays: s } => stays.extend(s),
            }
        }

        let mut packages = Vec::new();
        for out_leg in &outbound {
            for in_leg in &inbound {
                let itinerary = match FlightItinerary::pair(
                    out_leg.clone(),
                    in_leg.clone(),
                    occupancy,
                    None,
                    self.min_stay,
                ) {
                    Ok(itinerary) => itinerary,
                    Err(e) => {
                        debug!(%batch_id, "skipping leg pairing: {}", e);
                        continue;
                    }
                };
                for stay in &stays {
                    match self.composer.compose(itinerary.clone(), stay.clone(), None) {
                        Ok(package) => packages.push(package),
                        Err(e) => {
                            warn!(%batch_id, hotel_id = %stay.hotel_id, "skipping pairing: {}", e);
                        }
                    }
                }
            }
        }

        if packages.is_empty() {
            info!(%batch_id, "batch completed but no package could be composed");
            self.sink.publish(SearchEvent::SearchFailed {
                batch_id,
                message: "No packages available for this search.".to_string(),
            });
            return Ok(());
        }

        // Completed with at least one package, so min/max exist.
        let min = packages.iter().map(|p| p.total_price).min().unwrap_or_default();
        let max = packages.iter().map(|p| p.total_price).max().unwrap_or_default();

        self.packages.save_packages(batch_id, &packages).await?;
        info!(%batch_id, count = packages.len(), %min, %max, "search aggregated");

        self.sink.publish(SearchEvent::SearchCompleted {
            batch_id,
            packages,
            min,
            max,
        });
        Ok(())
    }

    /// A batch where every task failed.
    pub async fn on_batch_failed(
        &self,
        batch_id: Uuid,
        reason: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        warn!(%batch_id, "search failed: {}", reason);
        self.sink.publish(SearchEvent::SearchFailed {
            batch_id,
            message: reason.to_string(),
        });
        Ok(())
    }

    /// Paginated read-back for clients that poll instead of subscribing.
    pub async fn results_page(
        &self,
        batch_id: Uuid,
        page: usize,
        per_page: usize,
    ) -> Result<PackagePage, Box<dyn std::error::Error + Send + Sync>> {
        self.packages.list_packages(batch_id, page, per_page).await
    }
}
