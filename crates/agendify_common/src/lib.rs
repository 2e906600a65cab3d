// --- File: crates/agendify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Domain records
pub mod services; // Store and side-effect abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, external_service_error, not_found, validation_error, AgendifyError,
    Context, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{handle_json_result, map_json_error, IntoHttpResponse};

pub use services::{AppointmentQuery, BookingSideEffect, BoxFuture, SchedulingStore, StoreError};
