// --- File: crates/agendify_booking/src/error.rs ---

use agendify_common::models::AppointmentStatus;
use agendify_common::services::StoreError;
use agendify_common::{conflict, not_found, validation_error, AgendifyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::booking::{MissingField, OccurrenceConflict, UnavailableOccurrence};
use crate::recurrence::RecurrenceError;
use crate::working_hours::WorkingHoursError;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Missing information: {}", MissingList(.0))]
    MissingInformation(Vec<MissingField>),
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),
    #[error("Invalid recurrence: {0}")]
    Recurrence(#[from] RecurrenceError),
    #[error("{} occurrence(s) outside the professional's availability: {}", .0.len(), UnavailableList(.0))]
    Unavailable(Vec<UnavailableOccurrence>),
    #[error("Unknown specialty {0}")]
    UnknownSpecialty(Uuid),
    #[error("{} occurrence(s) conflict with existing appointments:\n{}", .0.len(), ConflictList(.0))]
    Conflicts(Vec<OccurrenceConflict>),
    #[error("Conflict check could not run: {0}")]
    ConflictCheckUnavailable(String),
    #[error("Appointment {0} not found")]
    AppointmentNotFound(Uuid),
    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("Invalid working hours: {0}")]
    WorkingHours(#[from] WorkingHoursError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct MissingList<'a>(&'a [MissingField]);

impl fmt::Display for MissingList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|field| field.as_str()).collect();
        f.write_str(&names.join(", "))
    }
}

struct UnavailableList<'a>(&'a [UnavailableOccurrence]);

impl fmt::Display for UnavailableList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .0
            .iter()
            .map(|o| format!("occurrence {} on {} is {}", o.index + 1, o.date, o.reason))
            .collect();
        f.write_str(&lines.join("; "))
    }
}

struct ConflictList<'a>(&'a [OccurrenceConflict]);

impl fmt::Display for ConflictList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, occurrence) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "occurrence {} ({}):", occurrence.index + 1, occurrence.start.to_rfc3339())?;
            for line in &occurrence.details {
                write!(f, "\n{line}")?;
            }
        }
        Ok(())
    }
}

/// Error body of the booking endpoint. Extends the common
/// `{"error": {"message", "code"}}` shape with the missing fields, the
/// occurrences outside availability and the per-occurrence conflicts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingErrorBody {
    pub message: String,
    pub code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<UnavailableOccurrence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<OccurrenceConflict>,
}

impl BookingErrorBody {
    pub fn from_error(err: BookingError) -> Self {
        let mut body = Self {
            message: String::new(),
            code: 0,
            missing: Vec::new(),
            unavailable: Vec::new(),
            conflicts: Vec::new(),
        };
        match &err {
            BookingError::MissingInformation(fields) => body.missing = fields.clone(),
            BookingError::Unavailable(occurrences) => body.unavailable = occurrences.clone(),
            BookingError::Conflicts(conflicts) => body.conflicts = conflicts.clone(),
            _ => {}
        }
        let err: AgendifyError = err.into();
        body.message = err.to_string();
        body.code = agendify_common::HttpStatusCode::status_code(&err);
        body
    }
}

impl From<BookingError> for AgendifyError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MissingInformation(_)
            | BookingError::InvalidSlot(_)
            | BookingError::Unavailable(_)
            | BookingError::Recurrence(_)
            | BookingError::WorkingHours(_) => validation_error(err),
            BookingError::UnknownSpecialty(_) | BookingError::AppointmentNotFound(_) => {
                not_found(err)
            }
            BookingError::Conflicts(_) | BookingError::InvalidTransition { .. } => conflict(err),
            BookingError::ConflictCheckUnavailable(message) => {
                AgendifyError::UnavailableError(message)
            }
            BookingError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendify_common::HttpStatusCode;

    #[test]
    fn test_http_categories() {
        let missing: AgendifyError =
            BookingError::MissingInformation(vec![MissingField::Slot]).into();
        assert_eq!(missing.status_code(), 400);
        assert!(missing.to_string().contains("slot"));

        let day_off: AgendifyError = BookingError::Unavailable(Vec::new()).into();
        assert_eq!(day_off.status_code(), 400);

        let conflicts: AgendifyError = BookingError::Conflicts(Vec::new()).into();
        assert_eq!(conflicts.status_code(), 409);

        let transition: AgendifyError = BookingError::InvalidTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Canceled,
        }
        .into();
        assert_eq!(transition.status_code(), 409);

        let unavailable: AgendifyError =
            BookingError::ConflictCheckUnavailable("timeout".into()).into();
        assert_eq!(unavailable.status_code(), 503);

        let missing_row: AgendifyError = BookingError::AppointmentNotFound(Uuid::nil()).into();
        assert_eq!(missing_row.status_code(), 404);
    }
}
