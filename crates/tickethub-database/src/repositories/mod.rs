//! Concrete repository implementations.

pub mod job;
pub mod notification;
pub mod ticket;
pub mod user;
