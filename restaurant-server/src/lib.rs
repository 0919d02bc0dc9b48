//! restaurant-server: reservation and table management API
//!
//! - Reservations: create, edit, status transitions, listing by date, phone search
//! - Tables: create, edit, seat a reservation, finish (un-seat), delete
//!
//! PostgreSQL via sqlx; axum for HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod state;
pub mod validation;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
