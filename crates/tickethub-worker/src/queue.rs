//! Job queue abstraction for enqueuing and dequeuing background jobs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tickethub_core::error::AppError;
use tickethub_core::types::id::JobId;
use tickethub_entity::job::{CreateJob, Job, JobPriority, JobStatus};
use tickethub_entity::traits::JobStore;

/// Parameters for creating a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreateParams {
    /// Type of job (e.g. `"ticket_created"`).
    pub job_type: String,
    /// Queue name (e.g. `"notifications"`, `"alerts"`, `"maintenance"`).
    pub queue: String,
    /// Priority level.
    pub priority: JobPriority,
    /// Job payload as JSON.
    pub payload: serde_json::Value,
    /// Maximum attempts before the job is left failed.
    pub max_attempts: i32,
    /// User whose action enqueued the job, when known.
    pub created_by: Option<Uuid>,
}

/// Job queue for enqueuing and dequeuing work.
#[derive(Clone)]
pub struct JobQueue {
    /// Job persistence.
    store: Arc<dyn JobStore>,
    /// Worker identifier for claiming jobs.
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(store: Arc<dyn JobStore>, worker_id: String) -> Self {
        Self { store, worker_id }
    }

    /// Enqueue a new job.
    pub async fn enqueue(&self, params: JobCreateParams) -> Result<Job, AppError> {
        let job = self
            .store
            .create(&CreateJob {
                job_type: params.job_type,
                queue: params.queue,
                priority: params.priority,
                payload: params.payload,
                max_attempts: params.max_attempts,
                created_by: params.created_by,
            })
            .await?;

        tracing::debug!(
            job_id = %job.id,
            job_type = %job.job_type,
            queue = %job.queue,
            priority = %job.priority,
            "Enqueued job"
        );

        Ok(job)
    }

    /// Dequeue the next available job from the given queues, first match
    /// wins.
    pub async fn dequeue(&self, queues: &[&str]) -> Result<Option<Job>, AppError> {
        for queue in queues {
            let job = self.store.claim_next(queue, &self.worker_id).await?;

            if let Some(job) = job {
                tracing::debug!(
                    job_id = %job.id,
                    job_type = %job.job_type,
                    queue = %job.queue,
                    "Dequeued job"
                );
                return Ok(Some(job));
            }
        }

        Ok(None)
    }

    /// Mark a job as completed successfully.
    pub async fn complete(
        &self,
        job_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        self.store
            .mark_completed(JobId::from_uuid(job_id), result)
            .await?;
        tracing::debug!(job_id = %job_id, "Job completed");
        Ok(())
    }

    /// Mark a job as failed.
    pub async fn fail(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.store.mark_failed(JobId::from_uuid(job_id), error).await?;
        tracing::debug!(job_id = %job_id, error = %error, "Job failed");
        Ok(())
    }

    /// Reset a failed job to pending for retry.
    pub async fn retry(&self, job_id: Uuid) -> Result<(), AppError> {
        self.store.retry(JobId::from_uuid(job_id)).await?;
        tracing::debug!(job_id = %job_id, "Job scheduled for retry");
        Ok(())
    }

    /// Get queue statistics.
    pub async fn stats(&self) -> Result<QueueStats, AppError> {
        let pending = self.store.count_by_status(JobStatus::Pending).await?;
        let running = self.store.count_by_status(JobStatus::Running).await?;
        let failed = self.store.count_by_status(JobStatus::Failed).await?;

        Ok(QueueStats {
            pending,
            running,
            failed,
            worker_id: self.worker_id.clone(),
        })
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of pending jobs.
    pub pending: i64,
    /// Number of running jobs.
    pub running: i64,
    /// Number of failed jobs.
    pub failed: i64,
    /// Current worker identifier.
    pub worker_id: String,
}
