//! Database access layer
//!
//! Plain reads and writes return `BoxError`; operations that check business rules
//! inside a transaction return `ServiceResult` so a rule violation rolls back.

pub mod reservations;
pub mod tables;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
