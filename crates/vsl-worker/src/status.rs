//! The status-update interface and an in-memory store.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use vsl_models::{GenerationJob, InvalidTransition, JobId, JobStatus};

/// Errors from status updates.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("unknown job: {0}")]
    UnknownJob(JobId),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Where the orchestrator reports status transitions.
///
/// Only the orchestrator mutates status, and only through this interface;
/// the store enforces the state machine's guards.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn mark_processing(&self, id: &JobId) -> Result<(), StatusError>;

    async fn mark_completed(
        &self,
        id: &JobId,
        video_path: &Path,
        filename: &str,
    ) -> Result<(), StatusError>;

    async fn mark_failed(&self, id: &JobId, message: &str) -> Result<(), StatusError>;
}

/// Per-batch status counts, consumable by a polling client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    pub total: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl BatchStats {
    /// Whether every job has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.pending == 0 && self.processing == 0
    }
}

/// In-memory job store for batch runs and polling.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    jobs: RwLock<HashMap<JobId, GenerationJob>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job before the batch starts.
    pub async fn insert(&self, job: GenerationJob) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    /// Snapshot of one job.
    pub async fn get(&self, id: &JobId) -> Option<GenerationJob> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Snapshot of every job.
    pub async fn snapshot(&self) -> Vec<GenerationJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Status counts across the batch.
    pub async fn stats(&self) -> BatchStats {
        let jobs = self.jobs.read().await;
        let mut stats = BatchStats {
            total: jobs.len(),
            ..Default::default()
        };
        for job in jobs.values() {
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing { .. } => stats.processing += 1,
                JobStatus::Completed { .. } => stats.completed += 1,
                JobStatus::Failed { .. } => stats.failed += 1,
            }
        }
        stats
    }

    async fn update<F>(&self, id: &JobId, apply: F) -> Result<(), StatusError>
    where
        F: FnOnce(&mut GenerationJob) -> Result<(), InvalidTransition>,
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StatusError::UnknownJob(id.clone()))?;
        apply(job).map_err(StatusError::from)
    }
}

#[async_trait]
impl StatusSink for InMemoryStatusStore {
    async fn mark_processing(&self, id: &JobId) -> Result<(), StatusError> {
        self.update(id, |job| job.start()).await
    }

    async fn mark_completed(
        &self,
        id: &JobId,
        video_path: &Path,
        filename: &str,
    ) -> Result<(), StatusError> {
        let path = video_path.to_string_lossy().to_string();
        self.update(id, move |job| job.complete(path, filename.to_string()))
            .await
    }

    async fn mark_failed(&self, id: &JobId, message: &str) -> Result<(), StatusError> {
        self.update(id, move |job| job.fail(message.to_string()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_store_transitions() {
        let store = InMemoryStatusStore::new();
        let job = GenerationJob::new("example.com");
        let id = job.id.clone();
        store.insert(job).await;

        store.mark_processing(&id).await.unwrap();
        assert!(matches!(
            store.get(&id).await.unwrap().status,
            JobStatus::Processing { .. }
        ));

        store
            .mark_completed(&id, &PathBuf::from("/outputs/vsl.mp4"), "vsl.mp4")
            .await
            .unwrap();
        assert!(store.get(&id).await.unwrap().status.is_terminal());
    }

    #[tokio::test]
    async fn test_terminal_state_rejects_updates() {
        let store = InMemoryStatusStore::new();
        let job = GenerationJob::new("example.com");
        let id = job.id.clone();
        store.insert(job).await;

        store.mark_processing(&id).await.unwrap();
        store.mark_failed(&id, "no route to host").await.unwrap();

        let err = store.mark_processing(&id).await.unwrap_err();
        assert!(matches!(err, StatusError::Transition(_)));
        // The failure record is untouched.
        match store.get(&id).await.unwrap().status {
            JobStatus::Failed { message, .. } => assert_eq!(message, "no route to host"),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let store = InMemoryStatusStore::new();
        let err = store.mark_processing(&JobId::new()).await.unwrap_err();
        assert!(matches!(err, StatusError::UnknownJob(_)));
    }

    #[tokio::test]
    async fn test_stats() {
        let store = InMemoryStatusStore::new();
        let a = GenerationJob::new("a.com");
        let b = GenerationJob::new("b.com");
        let id_a = a.id.clone();
        store.insert(a).await;
        store.insert(b).await;

        let stats = store.stats().await;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 2);
        assert!(!stats.is_settled());

        store.mark_processing(&id_a).await.unwrap();
        store.mark_failed(&id_a, "boom").await.unwrap();
        let stats = store.stats().await;
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.failed, 1);
    }
}
