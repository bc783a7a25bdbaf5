//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use tickethub_core::error::AppError;
use tickethub_entity::job::JobPriority;

use crate::queue::{JobCreateParams, JobQueue};

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Job queue for enqueuing scheduled work.
    queue: Arc<JobQueue>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(queue: Arc<JobQueue>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, queue })
    }

    /// Register all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        // Notification cleanup — daily at 2 AM
        self.register_maintenance("notification_cleanup", "0 0 2 * * *")
            .await?;
        // Job table cleanup — daily at 3 AM
        self.register_maintenance("job_cleanup", "0 0 3 * * *").await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Register a maintenance job on the given cron expression.
    async fn register_maintenance(
        &self,
        task: &'static str,
        schedule: &str,
    ) -> Result<(), AppError> {
        let queue = Arc::clone(&self.queue);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            Box::pin(async move {
                tracing::debug!(task = task, "Scheduling maintenance job");
                let params = JobCreateParams {
                    job_type: task.to_string(),
                    queue: "maintenance".to_string(),
                    priority: JobPriority::Low,
                    payload: serde_json::json!({ "task": task }),
                    max_attempts: 1,
                    created_by: None,
                };
                if let Err(e) = queue.enqueue(params).await {
                    tracing::error!(task = task, error = %e, "Failed to enqueue maintenance job");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create '{task}' schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add '{task}' schedule: {e}")))?;

        tracing::info!(task = task, schedule = schedule, "Registered maintenance task");
        Ok(())
    }
}
