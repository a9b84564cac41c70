use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use trava_core::batch::{
    BatchReport, BatchTransition, CheckResult, FailedAvailabilityCheck, SearchBatch, TaskOutcome,
};
use trava_core::package::Package;
use trava_core::repository::{
    BatchRepository, FailedCheckRepository, PackagePage, PackageRepository,
};

struct BatchEntry {
    batch: SearchBatch,
    results: Vec<CheckResult>,
}

/// In-memory realization of the batch persistence boundary. The task
/// update and the terminal transition happen under one write lock, so
/// concurrent last-task reports see exactly one `Completed`/`Failed`.
pub struct InMemoryBatchRepository {
    inner: RwLock<HashMap<Uuid, BatchEntry>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn insert_batch(
        &self,
        batch: &SearchBatch,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.write().await.insert(
            batch.id,
            BatchEntry {
                batch: batch.clone(),
                results: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get_batch(
        &self,
        id: Uuid,
    ) -> Result<Option<SearchBatch>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.read().await.get(&id).map(|e| e.batch.clone()))
    }

    async fn record_task_result(
        &self,
        batch_id: Uuid,
        task_id: &str,
        outcome: TaskOutcome,
    ) -> Result<BatchReport, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .get_mut(&batch_id)
            .ok_or_else(|| format!("unknown batch {batch_id}"))?;

        let succeeded = matches!(outcome, TaskOutcome::Succeeded(_));
        let transition = entry.batch.apply_result(task_id, succeeded);

        match transition {
            BatchTransition::AlreadyTerminal | BatchTransition::UnknownTask => {
                return Ok(BatchReport {
                    transition,
                    results: Vec::new(),
                });
            }
            _ => {}
        }

        if let TaskOutcome::Succeeded(result) = outcome {
            entry.results.push(result);
        }

        let results = if transition == BatchTransition::Completed {
            entry.results.clone()
        } else {
            Vec::new()
        };
        Ok(BatchReport {
            transition,
            results,
        })
    }

    async fn delete_terminal_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.write().await;
        let expired: Vec<Uuid> = inner
            .iter()
            .filter(|(_, entry)| {
                entry.batch.is_terminal()
                    && entry
                        .batch
                        .finished_at
                        .map(|t| t < cutoff)
                        .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            inner.remove(id);
        }
        Ok(expired)
    }
}

/// In-memory package store keyed by batch id.
pub struct InMemoryPackageRepository {
    inner: RwLock<HashMap<Uuid, Vec<Package>>>,
}

impl InMemoryPackageRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPackageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PackageRepository for InMemoryPackageRepository {
    async fn save_packages(
        &self,
        batch_id: Uuid,
        packages: &[Package],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner
            .write()
            .await
            .entry(batch_id)
            .or_default()
            .extend_from_slice(packages);
        Ok(())
    }

    async fn list_packages(
        &self,
        batch_id: Uuid,
        page: usize,
        per_page: usize,
    ) -> Result<PackagePage, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.read().await;
        let all = inner.get(&batch_id).cloned().unwrap_or_default();
        let page = page.max(1);
        let per_page = per_page.max(1);
        let packages = all
            .iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect();
        Ok(PackagePage {
            packages,
            total: all.len(),
            page,
            per_page,
        })
    }

    async fn delete_for_batch(
        &self,
        batch_id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.write().await.remove(&batch_id);
        Ok(())
    }
}

#[derive(Default)]
struct FailedCheckState {
    records: HashMap<Uuid, FailedAvailabilityCheck>,
    claimed: HashSet<Uuid>,
}

/// In-memory failed-check store with a single-owner claim per record,
/// so two concurrent retry passes never re-dispatch the same check.
pub struct InMemoryFailedCheckRepository {
    inner: RwLock<FailedCheckState>,
}

impl InMemoryFailedCheckRepository {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(FailedCheckState::default()),
        }
    }
}

impl Default for InMemoryFailedCheckRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailedCheckRepository for InMemoryFailedCheckRepository {
    async fn insert(
        &self,
        record: &FailedAvailabilityCheck,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner
            .write()
            .await
            .records
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn list_all(
        &self,
    ) -> Result<Vec<FailedAvailabilityCheck>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn claim(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.inner.write().await;
        if !state.records.contains_key(&id) {
            return Ok(false);
        }
        Ok(state.claimed.insert(id))
    }

    async fn release(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.write().await.claimed.remove(&id);
        Ok(())
    }

    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.inner.write().await;
        state.records.remove(&id);
        state.claimed.remove(&id);
        Ok(())
    }

    async fn record_attempt(
        &self,
        id: Uuid,
        reason: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.inner.write().await;
        let record = state
            .records
            .get_mut(&id)
            .ok_or_else(|| format!("unknown failed check {id}"))?;
        record.retry_count += 1;
        record.reason = reason.to_string();
        record.last_attempt_at = Utc::now();
        Ok(())
    }
}
