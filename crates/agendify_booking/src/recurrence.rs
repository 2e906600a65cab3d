// --- File: crates/agendify_booking/src/recurrence.rs ---
//! Expansion of a recurring booking into its occurrences.
//!
//! Occurrences keep the wall-clock start time of the first occurrence in the
//! calendar time zone. Monthly steps are counted from the first occurrence,
//! so a series starting on the 31st lands on the last day of shorter months
//! and returns to the 31st afterwards.

use chrono::{DateTime, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Stop condition of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceEnd {
    /// Last local date an occurrence may fall on (inclusive).
    Until(NaiveDate),
    /// Exact number of occurrences, the first one included.
    Count(u32),
}

fn default_interval() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    pub end: RecurrenceEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("interval must be at least 1")]
    ZeroInterval,
    #[error("occurrence count must be at least 1")]
    ZeroCount,
    #[error("end date {until} is before the first occurrence on {first}")]
    UntilBeforeStart { until: NaiveDate, first: NaiveDate },
    #[error("series would exceed {max} occurrences")]
    TooManyOccurrences { max: u32 },
    #[error("appointment end must be after its start")]
    EmptyInterval,
    #[error("local time {0} does not exist in the calendar time zone")]
    NonexistentLocalTime(NaiveDateTime),
    #[error("occurrences of the series overlap each other")]
    OverlappingOccurrences,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, interval: u32, end: RecurrenceEnd) -> Self {
        Self {
            frequency,
            interval,
            end,
        }
    }

    pub fn weekly_count(count: u32) -> Self {
        Self::new(Frequency::Weekly, 1, RecurrenceEnd::Count(count))
    }

    fn step_date(&self, first: NaiveDate, index: u32) -> Option<NaiveDate> {
        let steps = index.checked_mul(self.interval)?;
        match self.frequency {
            Frequency::Daily => first.checked_add_signed(Duration::days(i64::from(steps))),
            Frequency::Weekly => first.checked_add_signed(Duration::weeks(i64::from(steps))),
            Frequency::Monthly => first.checked_add_months(Months::new(steps)),
        }
    }

    /// Expands the series whose first occurrence is `[start, end)`.
    ///
    /// Fails instead of truncating when the series would have more than
    /// `max_occurrences` occurrences.
    pub fn expand(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        tz: Tz,
        max_occurrences: u32,
    ) -> Result<Vec<Occurrence>, RecurrenceError> {
        if self.interval == 0 {
            return Err(RecurrenceError::ZeroInterval);
        }
        if end <= start {
            return Err(RecurrenceError::EmptyInterval);
        }

        let local_start = start.with_timezone(&tz).naive_local();
        let first_date = local_start.date();
        let wall_clock = local_start.time();
        let length = end - start;

        let count = match self.end {
            RecurrenceEnd::Count(0) => return Err(RecurrenceError::ZeroCount),
            RecurrenceEnd::Count(n) if n > max_occurrences => {
                return Err(RecurrenceError::TooManyOccurrences {
                    max: max_occurrences,
                })
            }
            RecurrenceEnd::Count(n) => Some(n),
            RecurrenceEnd::Until(until) if until < first_date => {
                return Err(RecurrenceError::UntilBeforeStart {
                    until,
                    first: first_date,
                })
            }
            RecurrenceEnd::Until(_) => None,
        };

        let mut occurrences = Vec::new();
        for index in 0u32.. {
            if count.is_some_and(|n| index >= n) {
                break;
            }
            let Some(date) = self.step_date(first_date, index) else {
                break;
            };
            if let RecurrenceEnd::Until(until) = self.end {
                if date > until {
                    break;
                }
            }
            if occurrences.len() as u32 >= max_occurrences {
                return Err(RecurrenceError::TooManyOccurrences {
                    max: max_occurrences,
                });
            }

            let local = date.and_time(wall_clock);
            let occurrence_start = match tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => dt,
                LocalResult::Ambiguous(earliest, _) => earliest,
                LocalResult::None => return Err(RecurrenceError::NonexistentLocalTime(local)),
            }
            .with_timezone(&Utc);
            occurrences.push(Occurrence {
                start: occurrence_start,
                end: occurrence_start + length,
            });
        }
        if occurrences_overlap(&occurrences) {
            return Err(RecurrenceError::OverlappingOccurrences);
        }
        Ok(occurrences)
    }
}

/// True if any two occurrences overlap.
pub fn occurrences_overlap(occurrences: &[Occurrence]) -> bool {
    let mut sorted: Vec<&Occurrence> = occurrences.iter().collect();
    sorted.sort_by_key(|o| o.start);
    sorted.windows(2).any(|pair| pair[1].start < pair[0].end)
}
