//! # tickethub-core
//!
//! Core crate for TicketHub Notifier. Contains configuration schemas,
//! typed identifiers, ticket events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TicketHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
