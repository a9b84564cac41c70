use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::batch::{BatchReport, FailedAvailabilityCheck, SearchBatch, TaskOutcome};
use crate::package::Package;

/// Repository trait for search-batch state
#[async_trait]
pub trait BatchRepository: Send + Sync {
    async fn insert_batch(
        &self,
        batch: &SearchBatch,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get_batch(
        &self,
        id: Uuid,
    ) -> Result<Option<SearchBatch>, Box<dyn std::error::Error + Send + Sync>>;

    /// Record one task result. Implementations must apply the status
    /// update and the terminal transition atomically, so that exactly
    /// one caller observes `Completed`/`Failed` even when the last two
    /// reports race.
    async fn record_task_result(
        &self,
        batch_id: Uuid,
        task_id: &str,
        outcome: TaskOutcome,
    ) -> Result<BatchReport, Box<dyn std::error::Error + Send + Sync>>;

    /// Delete batches that entered a terminal state before `cutoff`.
    /// Returns the ids of the purged batches.
    async fn delete_terminal_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>>;
}

/// One page of aggregated packages for poll-style read-back.
#[derive(Debug, Clone, Serialize)]
pub struct PackagePage {
    pub packages: Vec<Package>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Repository trait for composed packages
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn save_packages(
        &self,
        batch_id: Uuid,
        packages: &[Package],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_packages(
        &self,
        batch_id: Uuid,
        page: usize,
        per_page: usize,
    ) -> Result<PackagePage, Box<dyn std::error::Error + Send + Sync>>;

    async fn delete_for_batch(
        &self,
        batch_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for failed-check records
#[async_trait]
pub trait FailedCheckRepository: Send + Sync {
    async fn insert(
        &self,
        record: &FailedAvailabilityCheck,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn list_all(
        &self,
    ) -> Result<Vec<FailedAvailabilityCheck>, Box<dyn std::error::Error + Send + Sync>>;

    /// Take the single-owner retry lock for a record. Returns false when
    /// another retry pass already holds it.
    async fn claim(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn release(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Increment the retry counter after another failed attempt.
    async fn record_attempt(
        &self,
        id: Uuid,
        reason: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
