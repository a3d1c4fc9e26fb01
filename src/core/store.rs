// src/core/store.rs

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;

use crate::core::models::ScanJob;
use crate::errors::ScanError;

/// Persistence collaborator for scan jobs.
///
/// The engine only relies on these three operations; whether they are
/// backed by a document database or an in-process map is not part of the
/// contract. Implementations must keep terminal records immutable: once a
/// stored job is `completed` or `failed`, `update` must refuse to
/// overwrite it.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: ScanJob) -> Result<(), ScanError>;
    async fn get(&self, id: &str) -> Result<Option<ScanJob>, ScanError>;
    async fn update(&self, job: ScanJob) -> Result<(), ScanError>;
}

/// In-memory job store over a concurrent map. Each job record is owned by
/// its single orchestrating task, so per-key contention is not expected;
/// the map makes many concurrent jobs safe system-wide.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<String, ScanJob>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: ScanJob) -> Result<(), ScanError> {
        if self.jobs.contains_key(&job.id) {
            return Err(ScanError::Store(format!("duplicate job id {}", job.id)));
        }
        self.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<ScanJob>, ScanError> {
        Ok(self.jobs.get(id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, job: ScanJob) -> Result<(), ScanError> {
        match self.jobs.get_mut(&job.id) {
            Some(mut entry) => {
                if entry.status.is_terminal() {
                    warn!(scan_id = %job.id, status = ?entry.status, "Refusing to overwrite terminal job record.");
                    return Err(ScanError::Store(format!(
                        "job {} already reached a terminal state",
                        job.id
                    )));
                }
                *entry = job;
                Ok(())
            }
            None => Err(ScanError::Store(format!("unknown job id {}", job.id))),
        }
    }
}
