// --- File: crates/agendify_booking/src/working_hours.rs ---
//! Saving the weekly working hours of a professional.

use agendify_common::models::{DayOfWeek, WorkingDay};
use agendify_common::services::SchedulingStore;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::BookingError;
use crate::invalidation::WorkingHoursBus;

/// One weekday row of the working-hours form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WorkingDayInput {
    pub day_of_week: DayOfWeek,
    pub is_working_day: bool,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkingHoursError {
    #[error("expected one record per weekday (7), got {0}")]
    WrongDayCount(usize),
    #[error("weekday {0} is outside 0..=6")]
    InvalidDay(DayOfWeek),
    #[error("weekday {0} appears more than once")]
    DuplicateDay(DayOfWeek),
    #[error("weekday {0} is a working day but lacks a start or end time")]
    IncompleteHours(DayOfWeek),
    #[error("weekday {day}: start {start} is not before end {end}")]
    InvalidHours {
        day: DayOfWeek,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// Checks the form rows and turns them into records ordered by weekday.
pub fn validate_week(
    professional_id: Uuid,
    inputs: &[WorkingDayInput],
) -> Result<Vec<WorkingDay>, WorkingHoursError> {
    if inputs.len() != 7 {
        return Err(WorkingHoursError::WrongDayCount(inputs.len()));
    }

    let mut seen = BTreeSet::new();
    for input in inputs {
        if input.day_of_week > 6 {
            return Err(WorkingHoursError::InvalidDay(input.day_of_week));
        }
        if !seen.insert(input.day_of_week) {
            return Err(WorkingHoursError::DuplicateDay(input.day_of_week));
        }
        if input.is_working_day {
            match (input.start_time, input.end_time) {
                (Some(start), Some(end)) if start >= end => {
                    return Err(WorkingHoursError::InvalidHours {
                        day: input.day_of_week,
                        start,
                        end,
                    })
                }
                (Some(_), Some(_)) => {}
                _ => return Err(WorkingHoursError::IncompleteHours(input.day_of_week)),
            }
        }
    }

    let mut records: Vec<WorkingDay> = inputs
        .iter()
        .map(|input| WorkingDay {
            professional_id,
            day_of_week: input.day_of_week,
            is_working_day: input.is_working_day,
            start_time: input.start_time.filter(|_| input.is_working_day),
            end_time: input.end_time.filter(|_| input.is_working_day),
        })
        .collect();
    records.sort_by_key(|r| r.day_of_week);
    Ok(records)
}

pub struct WorkingHoursEditor {
    store: Arc<dyn SchedulingStore>,
    bus: WorkingHoursBus,
}

impl WorkingHoursEditor {
    pub fn new(store: Arc<dyn SchedulingStore>, bus: WorkingHoursBus) -> Self {
        Self { store, bus }
    }

    /// Persists the week and announces the change to subscribers of this professional.
    pub async fn save(
        &self,
        professional_id: Uuid,
        inputs: Vec<WorkingDayInput>,
    ) -> Result<Vec<WorkingDay>, BookingError> {
        let records = validate_week(professional_id, &inputs)?;
        let saved = self
            .store
            .replace_working_days(professional_id, records)
            .await?;
        info!(
            "Working hours saved for {} ({} working day(s))",
            professional_id,
            saved.iter().filter(|d| d.is_working_day).count()
        );
        self.bus.publish(professional_id);
        Ok(saved)
    }
}
