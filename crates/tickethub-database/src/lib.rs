//! # tickethub-database
//!
//! PostgreSQL database connection management and concrete repository
//! implementations of the TicketHub collaborator seams.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
