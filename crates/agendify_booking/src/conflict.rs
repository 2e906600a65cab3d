// --- File: crates/agendify_booking/src/conflict.rs ---
//! Overlap detection against the existing appointments of a professional.

use agendify_common::models::{intervals_overlap, Appointment, AppointmentStatus};
use agendify_common::services::{AppointmentQuery, SchedulingStore};
use agendify_config::ConflictPolicy;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::BookingError;

/// Shown instead of the client name when the row has none.
pub const UNKNOWN_CLIENT: &str = "unknown";
/// Format of the localized start time in conflict details.
pub const DETAIL_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConflictQuery {
    pub professional_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The appointment being edited; never conflicts with itself.
    #[serde(default)]
    pub exclude_appointment_id: Option<Uuid>,
}

impl ConflictQuery {
    fn store_query(&self) -> AppointmentQuery {
        AppointmentQuery {
            professional_id: self.professional_id,
            window_start: self.start,
            window_end: self.end,
            exclude_appointment_id: self.exclude_appointment_id,
        }
    }

    /// The authoritative overlap test for one candidate row.
    pub fn is_conflicting(&self, appointment: &Appointment) -> bool {
        appointment.professional_id == self.professional_id
            && appointment.status != AppointmentStatus::Canceled
            && Some(appointment.id) != self.exclude_appointment_id
            && intervals_overlap(appointment.start_time, appointment.end_time, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConflictReport {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
}

impl ConflictReport {
    pub fn none() -> Self {
        Self::default()
    }

    /// Keeps the rows that overlap `query` and are not excluded or canceled.
    pub fn from_candidates(query: &ConflictQuery, candidates: Vec<Appointment>) -> Self {
        let conflicting_appointments: Vec<Appointment> = candidates
            .into_iter()
            .filter(|appointment| query.is_conflicting(appointment))
            .collect();
        Self {
            has_conflict: !conflicting_appointments.is_empty(),
            conflicting_appointments,
        }
    }

    /// One line per conflict: `• <client> - <dd/mm/YYYY HH:MM>` in `tz`.
    pub fn detail_lines(&self, tz: Tz) -> Vec<String> {
        self.conflicting_appointments
            .iter()
            .map(|appointment| {
                format!(
                    "• {} - {}",
                    appointment.client_name.as_deref().unwrap_or(UNKNOWN_CLIENT),
                    appointment
                        .start_time
                        .with_timezone(&tz)
                        .format(DETAIL_TIME_FORMAT)
                )
            })
            .collect()
    }

    pub fn details(&self, tz: Tz) -> String {
        self.detail_lines(tz).join("\n")
    }
}

pub struct ConflictChecker {
    store: Arc<dyn SchedulingStore>,
    policy: ConflictPolicy,
}

impl ConflictChecker {
    pub fn new(store: Arc<dyn SchedulingStore>, policy: ConflictPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Checks `query` against the professional's non-canceled appointments.
    ///
    /// When the lookup fails, `FailClosed` returns
    /// [`BookingError::ConflictCheckUnavailable`]; `FailOpen` logs and reports no conflict.
    pub async fn check(&self, query: ConflictQuery) -> Result<ConflictReport, BookingError> {
        if query.end <= query.start {
            return Err(BookingError::InvalidSlot(format!(
                "end {} is not after start {}",
                query.end, query.start
            )));
        }

        match self.store.query_appointments(query.store_query()).await {
            Ok(candidates) => {
                let report = ConflictReport::from_candidates(&query, candidates);
                debug!(
                    "Conflict check for {} [{} - {}): {} conflict(s)",
                    query.professional_id,
                    query.start,
                    query.end,
                    report.conflicting_appointments.len()
                );
                Ok(report)
            }
            Err(e) => match self.policy {
                ConflictPolicy::FailClosed => {
                    error!(
                        "Conflict check failed for {}, blocking booking: {}",
                        query.professional_id, e
                    );
                    Err(BookingError::ConflictCheckUnavailable(e.to_string()))
                }
                ConflictPolicy::FailOpen => {
                    warn!(
                        "Conflict check failed for {}, assuming no conflict: {}",
                        query.professional_id, e
                    );
                    Ok(ConflictReport::none())
                }
            },
        }
    }
}
