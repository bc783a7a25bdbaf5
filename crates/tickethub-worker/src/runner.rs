//! Worker runner: the main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use tickethub_core::config::worker::WorkerConfig;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Queues polled by default, highest urgency first.
const DEFAULT_QUEUES: &[&str] = &["alerts", "notifications", "maintenance"];

/// Main worker runner that polls queues and executes jobs.
pub struct WorkerRunner {
    /// Job queue for polling.
    queue: Arc<JobQueue>,
    /// Job executor for dispatching.
    executor: Arc<JobExecutor>,
    /// Worker configuration.
    config: WorkerConfig,
    /// Worker identifier.
    worker_id: String,
    /// Queues to poll (in priority order).
    queues: Vec<String>,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id,
            queues: DEFAULT_QUEUES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the queues to poll.
    pub fn with_queues(mut self, queues: Vec<String>) -> Self {
        self.queues = queues;
        self
    }

    /// Start the worker runner; runs until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            worker_id = %self.worker_id,
            concurrency = self.config.concurrency,
            poll_interval_secs = self.config.poll_interval_seconds,
            queues = ?self.queues,
            "Worker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.config.concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!(worker_id = %self.worker_id, "Worker received shutdown signal");
                        break;
                    }
                }
                _ = self.poll_and_execute(&semaphore) => {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                tracing::info!(worker_id = %self.worker_id, "Worker shutting down");
                                break;
                            }
                        }
                        _ = time::sleep(poll_interval) => {}
                    }
                }
            }
        }

        tracing::info!(
            worker_id = %self.worker_id,
            "Worker waiting for in-flight jobs to complete"
        );

        let max_permits = self.config.concurrency as u32;
        let _ = tokio::time::timeout(Duration::from_secs(30), semaphore.acquire_many(max_permits))
            .await;

        tracing::info!(worker_id = %self.worker_id, "Worker shut down complete");
    }

    /// Poll for a job and execute it if available.
    async fn poll_and_execute(&self, semaphore: &Arc<tokio::sync::Semaphore>) {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::trace!("All worker slots occupied, waiting");
                return;
            }
        };

        let queue_refs: Vec<&str> = self.queues.iter().map(|s| s.as_str()).collect();

        match self.queue.dequeue(&queue_refs).await {
            Ok(Some(job)) => {
                let queue = Arc::clone(&self.queue);
                let executor = Arc::clone(&self.executor);
                let job_id = job.id;
                let can_retry = job.can_retry();

                tokio::spawn(async move {
                    let _permit = permit;

                    match executor.execute(&job).await {
                        Ok(result) => {
                            if let Err(e) = queue.complete(job_id, result).await {
                                tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as completed");
                            }
                            tracing::info!(job_id = %job_id, "Job completed successfully");
                        }
                        Err(JobExecutionError::Transient(msg)) => {
                            tracing::warn!(job_id = %job_id, error = %msg, "Job failed (transient)");
                            let outcome = if can_retry {
                                queue.retry(job_id).await
                            } else {
                                queue.fail(job_id, &msg).await
                            };
                            if let Err(e) = outcome {
                                tracing::error!(job_id = %job_id, error = %e, "Failed to update job state");
                            }
                        }
                        Err(JobExecutionError::Permanent(msg)) => {
                            tracing::error!(job_id = %job_id, error = %msg, "Job failed permanently");
                            if let Err(e) = queue.fail(job_id, &msg).await {
                                tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as failed");
                            }
                        }
                        Err(JobExecutionError::Internal(err)) => {
                            let msg = err.to_string();
                            tracing::error!(job_id = %job_id, error = %msg, "Job internal error");
                            if let Err(e) = queue.fail(job_id, &msg).await {
                                tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as failed");
                            }
                        }
                    }
                });
            }
            Ok(None) => {
                drop(permit);
                tracing::trace!("No jobs available in queues");
            }
            Err(e) => {
                drop(permit);
                tracing::error!(error = %e, "Failed to dequeue job");
            }
        }
    }
}
