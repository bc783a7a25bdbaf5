//! Queue and inbox maintenance jobs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

use tickethub_entity::job::Job;
use tickethub_entity::traits::{JobStore, NotificationStore};

use crate::executor::{JobExecutionError, JobHandler};

/// Prunes expired in-app notifications and per-user inbox overflow.
pub struct NotificationCleanupHandler {
    store: Arc<dyn NotificationStore>,
    /// Max age in days before cleanup.
    cleanup_after_days: i64,
    /// Max stored per user.
    max_stored_per_user: i64,
}

impl NotificationCleanupHandler {
    /// Create a new cleanup handler.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        cleanup_after_days: i64,
        max_stored_per_user: i64,
    ) -> Self {
        Self {
            store,
            cleanup_after_days,
            max_stored_per_user,
        }
    }
}

#[async_trait]
impl JobHandler for NotificationCleanupHandler {
    fn job_type(&self) -> &str {
        "notification_cleanup"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        tracing::info!(
            cutoff_days = self.cleanup_after_days,
            "Running notification cleanup"
        );

        let cutoff = Utc::now() - Duration::days(self.cleanup_after_days);

        let expired_count = self.store.delete_expired(cutoff).await.map_err(|e| {
            JobExecutionError::Transient(format!("Notification cleanup failed: {e}"))
        })?;

        let overflow_count = self
            .store
            .trim_per_user(self.max_stored_per_user)
            .await
            .map_err(|e| {
                JobExecutionError::Transient(format!("Notification per-user trim failed: {e}"))
            })?;

        tracing::info!(
            expired_removed = expired_count,
            overflow_removed = overflow_count,
            "Notification cleanup complete"
        );

        Ok(Some(serde_json::json!({
            "task": "notification_cleanup",
            "expired_removed": expired_count,
            "overflow_removed": overflow_count,
        })))
    }
}

/// Prunes old terminal rows from the job table.
pub struct JobCleanupHandler {
    store: Arc<dyn JobStore>,
    /// Days to retain terminal jobs.
    retain_days: i64,
}

impl JobCleanupHandler {
    /// Create a new job-table cleanup handler.
    pub fn new(store: Arc<dyn JobStore>, retain_days: i64) -> Self {
        Self { store, retain_days }
    }
}

#[async_trait]
impl JobHandler for JobCleanupHandler {
    fn job_type(&self) -> &str {
        "job_cleanup"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(self.retain_days);

        let removed = self
            .store
            .delete_terminal_before(cutoff)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Job cleanup failed: {e}")))?;

        tracing::info!(removed = removed, retain_days = self.retain_days, "Job cleanup complete");

        Ok(Some(serde_json::json!({
            "task": "job_cleanup",
            "removed": removed,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::fixtures::queued_job;
    use chrono::DateTime;
    use std::sync::Mutex;

    use tickethub_core::result::AppResult;
    use tickethub_entity::notification::Notification;

    struct CountingNotificationStore {
        expired: u64,
        trimmed: u64,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl NotificationStore for CountingNotificationStore {
        async fn insert(&self, _notification: &Notification) -> AppResult<()> {
            Ok(())
        }

        async fn delete_expired(&self, _cutoff: DateTime<Utc>) -> AppResult<u64> {
            self.calls.lock().unwrap().push("delete_expired");
            Ok(self.expired)
        }

        async fn trim_per_user(&self, _max_per_user: i64) -> AppResult<u64> {
            self.calls.lock().unwrap().push("trim_per_user");
            Ok(self.trimmed)
        }
    }

    #[tokio::test]
    async fn test_notification_cleanup_reports_counts() {
        let store = Arc::new(CountingNotificationStore {
            expired: 12,
            trimmed: 3,
            calls: Mutex::new(Vec::new()),
        });
        let handler = NotificationCleanupHandler::new(Arc::clone(&store) as _, 30, 1000);

        let job = queued_job("notification_cleanup", serde_json::json!({}));
        let result = handler.execute(&job).await.unwrap().unwrap();

        assert_eq!(result["expired_removed"], 12);
        assert_eq!(result["overflow_removed"], 3);
        assert_eq!(
            *store.calls.lock().unwrap(),
            ["delete_expired", "trim_per_user"]
        );
    }
}
