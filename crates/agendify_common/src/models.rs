// --- File: crates/agendify_common/src/models.rs ---

// Domain records shared by the store implementations and the booking core.
// Field names follow the column names of the hosted database (snake_case).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Day of week as stored by the database: 0 = Sunday .. 6 = Saturday.
pub type DayOfWeek = u8;

/// Returns the database day-of-week number of a calendar date.
pub fn day_of_week(date: NaiveDate) -> DayOfWeek {
    date.weekday().num_days_from_sunday() as DayOfWeek
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Professional {
    pub id: Uuid,
    pub name: String,
    pub calendar_id: Uuid,
}

/// Weekly availability record of a professional.
///
/// There is exactly one record per weekday; `is_working_day = false`
/// (or a missing record) means no appointments on that weekday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WorkingDay {
    pub professional_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub is_working_day: bool,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
    /// Appointment length in minutes; fixes the slot length.
    pub duration_minutes: i64,
    /// Price in the smallest currency unit.
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    /// `pending → confirmed → completed`, `pending | confirmed → canceled`.
    /// Completed and canceled are terminal.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending, Canceled) | (Confirmed, Canceled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Canceled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "canceled" | "cancelled" => Ok(AppointmentStatus::Canceled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub specialty_id: Uuid,
    pub client_id: Uuid,
    pub calendar_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    /// Joined from the clients table when available.
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Shared by all occurrences of one recurring booking.
    #[serde(default)]
    pub series_id: Option<Uuid>,
}

impl Appointment {
    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        intervals_overlap(self.start_time, self.end_time, start, end)
    }
}

/// `[s1, e1)` and `[s2, e2)` overlap iff `s1 < e2 && s2 < e1`.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// An appointment ready to be inserted; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentDraft {
    pub professional_id: Uuid,
    pub specialty_id: Uuid,
    pub client_id: Uuid,
    pub calendar_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<Uuid>,
}

/// A candidate bookable window, computed by the store; never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Slot {
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-08T12:00:00Z"))]
    #[serde(alias = "start_time")]
    pub start: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(example = "2024-01-08T12:30:00Z"))]
    #[serde(alias = "end_time")]
    pub end: DateTime<Utc>,
}

/// Explicit option shape for select and multi-select inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl From<&Professional> for SelectOption {
    fn from(professional: &Professional) -> Self {
        SelectOption {
            value: professional.id.to_string(),
            label: professional.name.clone(),
        }
    }
}

impl From<&Specialty> for SelectOption {
    fn from(specialty: &Specialty) -> Self {
        SelectOption {
            value: specialty.id.to_string(),
            label: format!("{} ({} min)", specialty.name, specialty.duration_minutes),
        }
    }
}

impl From<AppointmentStatus> for SelectOption {
    fn from(status: AppointmentStatus) -> Self {
        let label = match status {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Canceled => "Canceled",
        };
        SelectOption {
            value: status.as_str().to_string(),
            label: label.to_string(),
        }
    }
}
