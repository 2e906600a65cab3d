// --- File: crates/agendify_booking/src/lib.rs ---
// Declare modules within this crate
pub mod booking;
pub mod conflict;
#[cfg(test)]
mod conflict_test;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod invalidation;
#[cfg(test)]
mod logic_proptest;
pub mod recurrence;
pub mod routes;
pub mod settings;
pub mod slots;
pub mod status;
pub mod wizard;
pub mod working_days;
#[cfg(test)]
mod working_days_test;
pub mod working_hours;

pub use booking::{
    BookingOutcome, BookingRequest, BookingService, MissingField, UnavailableOccurrence,
    UnavailableReason,
};
pub use conflict::{ConflictChecker, ConflictQuery, ConflictReport};
pub use error::BookingError;
pub use handlers::BookingState;
pub use invalidation::{WorkingHoursBus, WorkingHoursChanged};
pub use settings::{BookingSettings, Clock};
pub use slots::{SlotBoard, SlotFetch, SlotGenerator, SlotSelection};
pub use working_days::{WorkingDayResolver, WorkingDaySet};
