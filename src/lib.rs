//! Zentry server library
//!
//! Session handling, registration intake and the global-admin surface of
//! the Zentry residential management app, exported for the server binary
//! and its tests.

pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppSettings;
pub use error::AppError;
