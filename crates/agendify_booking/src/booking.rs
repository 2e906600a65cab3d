// --- File: crates/agendify_booking/src/booking.rs ---
//! Booking submission: validation, recurrence expansion, per-occurrence
//! availability and conflict checks, all-or-nothing insertion and follow-up
//! side effects.

use agendify_common::models::{Appointment, AppointmentDraft, AppointmentStatus, Slot};
use agendify_common::services::{BookingSideEffect, SchedulingStore};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::conflict::{ConflictChecker, ConflictQuery};
use crate::error::BookingError;
use crate::recurrence::{Occurrence, RecurrenceRule};
use crate::settings::BookingSettings;
use crate::working_days::WorkingDayResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Specialty,
    Professional,
    Calendar,
    Date,
    Slot,
    Client,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingField::Specialty => "specialty",
            MissingField::Professional => "professional",
            MissingField::Calendar => "calendar",
            MissingField::Date => "date",
            MissingField::Slot => "slot",
            MissingField::Client => "client",
        }
    }
}

/// What the booking wizard (or the dashboard) collected.
/// Every piece is optional until confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingRequest {
    #[serde(default)]
    pub specialty_id: Option<Uuid>,
    #[serde(default)]
    pub professional_id: Option<Uuid>,
    #[serde(default)]
    pub calendar_id: Option<Uuid>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub slot: Option<Slot>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
}

/// A request with every required piece present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub specialty_id: Uuid,
    pub professional_id: Uuid,
    pub calendar_id: Uuid,
    pub date: NaiveDate,
    pub slot: Slot,
    pub client_id: Uuid,
    pub notes: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
}

impl BookingRequest {
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let checks = [
            (self.specialty_id.is_none(), MissingField::Specialty),
            (self.professional_id.is_none(), MissingField::Professional),
            (self.calendar_id.is_none(), MissingField::Calendar),
            (self.date.is_none(), MissingField::Date),
            (self.slot.is_none(), MissingField::Slot),
            (self.client_id.is_none(), MissingField::Client),
        ];
        checks
            .into_iter()
            .filter_map(|(missing, field)| missing.then_some(field))
            .collect()
    }

    pub fn validate(&self, settings: &BookingSettings) -> Result<ValidatedBooking, BookingError> {
        let (
            Some(specialty_id),
            Some(professional_id),
            Some(calendar_id),
            Some(date),
            Some(slot),
            Some(client_id),
        ) = (
            self.specialty_id,
            self.professional_id,
            self.calendar_id,
            self.date,
            self.slot,
            self.client_id,
        )
        else {
            return Err(BookingError::MissingInformation(self.missing_fields()));
        };

        if slot.end <= slot.start {
            return Err(BookingError::InvalidSlot(
                "slot end must be after its start".to_string(),
            ));
        }
        let slot_date = slot.start.with_timezone(&settings.time_zone).date_naive();
        if slot_date != date {
            return Err(BookingError::InvalidSlot(format!(
                "slot starts on {slot_date}, not on the selected date {date}"
            )));
        }

        Ok(ValidatedBooking {
            specialty_id,
            professional_id,
            calendar_id,
            date,
            slot,
            client_id,
            notes: self.notes.clone().filter(|n| !n.trim().is_empty()),
            recurrence: self.recurrence,
        })
    }
}

/// One occurrence of the request that overlaps existing appointments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OccurrenceConflict {
    /// Zero-based position in the series.
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub conflicting_appointments: Vec<Appointment>,
    /// Human-readable lines, one per conflicting appointment.
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The professional does not work on that weekday.
    DayOff,
    /// Past the last date of the booking horizon.
    BeyondHorizon,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::DayOff => f.write_str("not a working day"),
            UnavailableReason::BeyondHorizon => f.write_str("beyond the booking horizon"),
        }
    }
}

/// One occurrence of the request on a date the professional cannot take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnavailableOccurrence {
    /// Zero-based position in the series.
    pub index: usize,
    /// Calendar date of the occurrence in the calendar time zone.
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: UnavailableReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingOutcome {
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub series_id: Option<Uuid>,
    /// Side effects that failed after the appointments were stored.
    #[serde(default)]
    pub warnings: Vec<String>,
}

pub struct BookingService {
    store: Arc<dyn SchedulingStore>,
    checker: Arc<ConflictChecker>,
    resolver: Arc<WorkingDayResolver>,
    side_effects: Vec<Arc<dyn BookingSideEffect>>,
    settings: BookingSettings,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn SchedulingStore>,
        checker: Arc<ConflictChecker>,
        resolver: Arc<WorkingDayResolver>,
        side_effects: Vec<Arc<dyn BookingSideEffect>>,
        settings: BookingSettings,
    ) -> Self {
        Self {
            store,
            checker,
            resolver,
            side_effects,
            settings,
        }
    }

    /// Occurrences the request expands to, validated against the recurrence limits.
    pub fn occurrences(&self, booking: &ValidatedBooking) -> Result<Vec<Occurrence>, BookingError> {
        match booking.recurrence {
            Some(rule) => Ok(rule.expand(
                booking.slot.start,
                booking.slot.end,
                self.settings.time_zone,
                self.settings.max_occurrences,
            )?),
            None => Ok(vec![Occurrence {
                start: booking.slot.start,
                end: booking.slot.end,
            }]),
        }
    }

    /// Occurrences on a day off of the professional or past the horizon that
    /// starts on today's date. A failed working-day lookup makes every
    /// occurrence a day off.
    pub async fn find_unavailable(
        &self,
        professional_id: Uuid,
        occurrences: &[Occurrence],
        now: DateTime<Utc>,
    ) -> Vec<UnavailableOccurrence> {
        let working_days = self.resolver.resolve(Some(professional_id)).await;
        let today = self.settings.today(now);
        let last_day = today
            .checked_add_signed(Duration::days(self.settings.horizon_days - 1))
            .unwrap_or(NaiveDate::MAX);

        occurrences
            .iter()
            .enumerate()
            .filter_map(|(index, occurrence)| {
                let date = occurrence
                    .start
                    .with_timezone(&self.settings.time_zone)
                    .date_naive();
                let reason = if !working_days.is_working_day(date) {
                    UnavailableReason::DayOff
                } else if date > last_day {
                    UnavailableReason::BeyondHorizon
                } else {
                    return None;
                };
                Some(UnavailableOccurrence {
                    index,
                    date,
                    start: occurrence.start,
                    end: occurrence.end,
                    reason,
                })
            })
            .collect()
    }

    /// Checks every occurrence; returns the ones that conflict.
    pub async fn find_conflicts(
        &self,
        professional_id: Uuid,
        occurrences: &[Occurrence],
    ) -> Result<Vec<OccurrenceConflict>, BookingError> {
        let mut conflicts = Vec::new();
        for (index, occurrence) in occurrences.iter().enumerate() {
            let report = self
                .checker
                .check(ConflictQuery {
                    professional_id,
                    start: occurrence.start,
                    end: occurrence.end,
                    exclude_appointment_id: None,
                })
                .await?;
            if report.has_conflict {
                conflicts.push(OccurrenceConflict {
                    index,
                    start: occurrence.start,
                    end: occurrence.end,
                    details: report.detail_lines(self.settings.time_zone),
                    conflicting_appointments: report.conflicting_appointments,
                });
            }
        }
        Ok(conflicts)
    }

    /// Books the request as of `now`.
    ///
    /// The slot must not have started yet and must last exactly the specialty
    /// duration. Every occurrence must fall on a working day within the
    /// horizon and be free of conflicts, otherwise nothing is stored.
    pub async fn book(
        &self,
        request: BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<BookingOutcome, BookingError> {
        let booking = request.validate(&self.settings)?;
        if booking.slot.start < now {
            return Err(BookingError::InvalidSlot(format!(
                "slot starting {} has already begun",
                booking.slot.start.to_rfc3339()
            )));
        }

        let Some(specialty) = self.store.get_specialty(booking.specialty_id).await? else {
            return Err(BookingError::UnknownSpecialty(booking.specialty_id));
        };
        let length = booking.slot.end - booking.slot.start;
        if length != Duration::minutes(specialty.duration_minutes) {
            return Err(BookingError::InvalidSlot(format!(
                "slot lasts {} min but {} takes {} min",
                length.num_minutes(),
                specialty.name,
                specialty.duration_minutes
            )));
        }

        let occurrences = self.occurrences(&booking)?;
        let unavailable = self
            .find_unavailable(booking.professional_id, &occurrences, now)
            .await;
        if !unavailable.is_empty() {
            warn!(
                "Booking for professional {} rejected: {} of {} occurrence(s) outside availability",
                booking.professional_id,
                unavailable.len(),
                occurrences.len()
            );
            return Err(BookingError::Unavailable(unavailable));
        }

        let conflicts = self
            .find_conflicts(booking.professional_id, &occurrences)
            .await?;
        if !conflicts.is_empty() {
            warn!(
                "Booking for professional {} rejected: {} of {} occurrence(s) conflict",
                booking.professional_id,
                conflicts.len(),
                occurrences.len()
            );
            return Err(BookingError::Conflicts(conflicts));
        }

        let series_id = booking.recurrence.map(|_| Uuid::new_v4());
        let drafts: Vec<AppointmentDraft> = occurrences
            .iter()
            .map(|occurrence| AppointmentDraft {
                professional_id: booking.professional_id,
                specialty_id: booking.specialty_id,
                client_id: booking.client_id,
                calendar_id: booking.calendar_id,
                start_time: occurrence.start,
                end_time: occurrence.end,
                status: AppointmentStatus::Pending,
                notes: booking.notes.clone(),
                series_id,
            })
            .collect();

        let appointments = self.store.insert_appointments(drafts).await?;
        info!(
            "Booked {} appointment(s) for professional {} starting {}",
            appointments.len(),
            booking.professional_id,
            booking.slot.start
        );

        let warnings = self.run_side_effects(&appointments).await;
        Ok(BookingOutcome {
            appointments,
            series_id,
            warnings,
        })
    }

    async fn run_side_effects(&self, appointments: &[Appointment]) -> Vec<String> {
        let mut warnings = Vec::new();
        for effect in &self.side_effects {
            if let Err(e) = effect.run(appointments).await {
                warn!("Side effect '{}' failed after booking: {}", effect.name(), e);
                warnings.push(format!("{} failed: {}", effect.name(), e));
            }
        }
        warnings
    }
}
