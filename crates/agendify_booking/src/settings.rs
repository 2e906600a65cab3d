// --- File: crates/agendify_booking/src/settings.rs ---

use agendify_common::{config_error, AgendifyError};
use agendify_config::{BookingConfig, ConflictPolicy, MAX_HORIZON_DAYS};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Resolved booking configuration shared by the booking services.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookingSettings {
    pub time_zone: Tz,
    pub horizon_days: i64,
    pub conflict_policy: ConflictPolicy,
    pub max_occurrences: u32,
}

impl BookingSettings {
    pub fn from_config(config: &BookingConfig) -> Result<Self, AgendifyError> {
        let name = config.time_zone_name();
        let time_zone = Tz::from_str(name)
            .map_err(|_| config_error(format!("unknown time zone '{name}'")))?;
        let horizon_days = config.horizon_days();
        if !(1..=MAX_HORIZON_DAYS).contains(&horizon_days) {
            return Err(config_error(format!(
                "booking.horizon_days must be between 1 and {MAX_HORIZON_DAYS}, got {horizon_days}"
            )));
        }
        Ok(Self {
            time_zone,
            horizon_days,
            conflict_policy: config.conflict_policy,
            max_occurrences: config.max_occurrences(),
        })
    }

    /// Calendar date of `now` in the calendar time zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.time_zone).date_naive()
    }
}

/// Source of the current instant for the booking routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(instant) => *instant,
        }
    }
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::America::Sao_Paulo,
            horizon_days: agendify_config::DEFAULT_HORIZON_DAYS,
            conflict_policy: ConflictPolicy::FailClosed,
            max_occurrences: agendify_config::DEFAULT_MAX_OCCURRENCES,
        }
    }
}
