//! TicketHub Notifier — notification fan-out worker.
//!
//! Main entry point that wires all crates together and runs the worker
//! until shutdown. Ticket events are enqueued by the upstream web
//! application; this process claims them, resolves recipients, and
//! delivers notifications.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use tickethub_core::config::AppConfig;
use tickethub_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TICKETHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Notifier error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TicketHub Notifier v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = tickethub_database::DatabasePool::connect(&config.database).await?;
    db.health_check().await?;
    tickethub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(tickethub_database::repositories::user::UserRepository::new(
        db.pool().clone(),
    ));
    let ticket_repo = Arc::new(
        tickethub_database::repositories::ticket::TicketRepository::new(db.pool().clone()),
    );
    let notification_repo = Arc::new(
        tickethub_database::repositories::notification::NotificationRepository::new(
            db.pool().clone(),
        ),
    );
    let job_repo = Arc::new(tickethub_database::repositories::job::JobRepository::new(
        db.pool().clone(),
    ));

    // ── Step 3: Delivery channels ────────────────────────────────
    let email_channel = Arc::new(tickethub_notify::channels::EmailRelayChannel::new(
        config.notifier.mail.clone(),
    ));
    let in_app_channel = Arc::new(tickethub_notify::channels::InAppChannel::new(
        Arc::clone(&notification_repo) as _,
        config.notifier.in_app.clone(),
    ));
    let channel = Arc::new(tickethub_notify::channels::CompositeChannel::new(vec![
        email_channel,
        in_app_channel,
    ]));

    // ── Step 4: Fan-out core ─────────────────────────────────────
    let resolver = tickethub_notify::RecipientResolver::new(Arc::clone(&user_repo) as _);
    let dispatcher = tickethub_notify::NotificationDispatcher::new(
        channel,
        Duration::from_secs(config.notifier.delivery_timeout_seconds),
    );
    let fanout = Arc::new(tickethub_worker::jobs::FanoutContext::new(
        Arc::clone(&ticket_repo) as _,
        resolver,
        dispatcher,
    ));

    // ── Step 5: Job executor ─────────────────────────────────────
    let mut executor = tickethub_worker::executor::JobExecutor::new();
    executor.register(Arc::new(
        tickethub_worker::jobs::ticket_created::TicketCreatedHandler::new(Arc::clone(&fanout)),
    ));
    executor.register(Arc::new(
        tickethub_worker::jobs::ticket_created::TicketCreatedAdminAlertHandler::new(Arc::clone(
            &fanout,
        )),
    ));
    executor.register(Arc::new(
        tickethub_worker::jobs::ticket_assigned::TicketAssignedHandler::new(Arc::clone(&fanout)),
    ));
    executor.register(Arc::new(
        tickethub_worker::jobs::ticket_commented::TicketCommentedHandler::new(Arc::clone(&fanout)),
    ));
    executor.register(Arc::new(
        tickethub_worker::jobs::ticket_status_changed::TicketStatusChangedHandler::new(
            Arc::clone(&fanout),
        ),
    ));
    executor.register(Arc::new(
        tickethub_worker::jobs::cleanup::NotificationCleanupHandler::new(
            Arc::clone(&notification_repo) as _,
            i64::from(config.notifier.in_app.cleanup_after_days),
            config.notifier.in_app.max_stored_per_user as i64,
        ),
    ));
    executor.register(Arc::new(tickethub_worker::jobs::cleanup::JobCleanupHandler::new(
        Arc::clone(&job_repo) as _,
        30,
    )));
    let executor = Arc::new(executor);

    // ── Step 6: Queue, cron, runner ──────────────────────────────
    let worker_id = format!("notifier-{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let queue = Arc::new(tickethub_worker::queue::JobQueue::new(
        Arc::clone(&job_repo) as _,
        worker_id.clone(),
    ));

    let stats = queue.stats().await?;
    tracing::info!(
        pending = stats.pending,
        running = stats.running,
        failed = stats.failed,
        "Queue state at startup"
    );

    let mut cron = tickethub_worker::cron::CronScheduler::new(Arc::clone(&queue)).await?;
    cron.register_default_tasks().await?;
    cron.start().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = tickethub_worker::WorkerRunner::new(
        Arc::clone(&queue),
        executor,
        config.worker.clone(),
        worker_id,
    );
    let runner_handle = tokio::spawn(async move {
        runner.run(shutdown_rx).await;
    });

    tracing::info!("TicketHub Notifier running");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);
    cron.shutdown().await?;

    let _ = tokio::time::timeout(Duration::from_secs(35), runner_handle).await;
    db.close().await;

    tracing::info!("TicketHub Notifier shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
