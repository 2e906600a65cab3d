// --- File: crates/agendify_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Agendify errors.
///
/// Each crate keeps its own domain error and implements `From<DomainError> for AgendifyError`
/// at the HTTP boundary.
#[derive(Error, Debug)]
pub enum AgendifyError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The remote store answered with an error
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// The remote store could not be reached, or a check required for a write could not run
    #[error("Service unavailable: {0}")]
    UnavailableError(String),

    /// Error occurred due to a conflict (e.g. overlapping appointment)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AgendifyError {
    fn status_code(&self) -> u16 {
        match self {
            AgendifyError::ParseError(_) => 400,
            AgendifyError::ConfigError(_) => 500,
            AgendifyError::ValidationError(_) => 400,
            AgendifyError::ExternalServiceError { .. } => 502,
            AgendifyError::UnavailableError(_) => 503,
            AgendifyError::ConflictError(_) => 409,
            AgendifyError::NotFoundError(_) => 404,
            AgendifyError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, AgendifyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, AgendifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, AgendifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| AgendifyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, AgendifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| AgendifyError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<serde_json::Error> for AgendifyError {
    fn from(err: serde_json::Error) -> Self {
        AgendifyError::ParseError(err.to_string())
    }
}

impl From<crate::services::StoreError> for AgendifyError {
    fn from(err: crate::services::StoreError) -> Self {
        use crate::services::StoreError;
        match err {
            StoreError::NotFound(what) => AgendifyError::NotFoundError(what),
            StoreError::Unavailable(message) => AgendifyError::UnavailableError(message),
            StoreError::Request(e) => AgendifyError::UnavailableError(e.to_string()),
            other => external_service_error("store", other),
        }
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> AgendifyError {
    AgendifyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> AgendifyError {
    AgendifyError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> AgendifyError {
    AgendifyError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> AgendifyError {
    AgendifyError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> AgendifyError {
    AgendifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(validation_error("x").status_code(), 400);
        assert_eq!(not_found("x").status_code(), 404);
        assert_eq!(conflict("x").status_code(), 409);
        assert_eq!(external_service_error("store", "boom").status_code(), 502);
        assert_eq!(AgendifyError::UnavailableError("x".into()).status_code(), 503);
    }

    #[test]
    fn test_store_error_mapping() {
        let err: AgendifyError = StoreError::NotFound("appointment 1".into()).into();
        assert!(matches!(err, AgendifyError::NotFoundError(_)));

        let err: AgendifyError = StoreError::Api {
            status: 400,
            message: "bad filter".into(),
        }
        .into();
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        let err = result.context("writing log").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: writing log: disk");
    }
}
