//! Background job processing for TicketHub Notifier.
//!
//! This crate provides:
//! - A worker runner that polls for and executes queued jobs
//! - A deferred scheduler that enqueues ticket events without ever
//!   blocking the caller's request path
//! - A job executor that dispatches jobs to the correct handler
//! - The ticket event fan-out jobs and queue maintenance jobs
//! - A cron scheduler for periodic maintenance tasks

pub mod cron;
pub mod deferred;
pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;

pub use deferred::DeferredScheduler;
pub use runner::WorkerRunner;
