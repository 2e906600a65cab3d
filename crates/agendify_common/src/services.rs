// --- File: crates/agendify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The hosted backend (database, generated REST, RPC and edge functions) is
//! consumed through these traits. This keeps the booking core independent of
//! the concrete transport and lets tests run against the in-memory store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentDraft, AppointmentStatus, Slot, Specialty, WorkingDay,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors raised at the store boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Store returned an error: status={status}, message='{message}'")]
    Api { status: u16, message: String },
    #[error("Failed to parse store response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Filter for appointment lookups used by the conflict check.
///
/// Stores apply it as
/// `status != canceled AND id != exclude AND start < window_end AND end > window_start`.
/// Callers re-apply the half-open overlap predicate on the rows they get back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentQuery {
    pub professional_id: Uuid,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub exclude_appointment_id: Option<Uuid>,
}

/// Operations the booking core needs from the hosted backend.
pub trait SchedulingStore: Send + Sync {
    /// Working-day records of a professional with `is_working_day = true`.
    fn working_days(&self, professional_id: Uuid) -> BoxFuture<'_, Vec<WorkingDay>, StoreError>;

    /// Replaces the weekly working hours of a professional (one record per weekday).
    fn replace_working_days(
        &self,
        professional_id: Uuid,
        records: Vec<WorkingDay>,
    ) -> BoxFuture<'_, Vec<WorkingDay>, StoreError>;

    /// Server-computed free slots for one day. Already excludes booked
    /// intervals and respects the working hours of that weekday.
    fn available_slots(
        &self,
        professional_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Slot>, StoreError>;

    /// Non-canceled appointments overlapping the window of `query`.
    fn query_appointments(
        &self,
        query: AppointmentQuery,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError>;

    /// Inserts all drafts as one batch and returns the stored rows.
    fn insert_appointments(
        &self,
        drafts: Vec<AppointmentDraft>,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError>;

    fn get_appointment(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, StoreError>;

    fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, Appointment, StoreError>;

    fn get_specialty(&self, id: Uuid) -> BoxFuture<'_, Option<Specialty>, StoreError>;
}

/// Follow-up action run after appointments were inserted
/// (confirmation email, WhatsApp message, calendar sync).
///
/// Failures never roll back the booking; they surface as warnings.
pub trait BookingSideEffect: Send + Sync {
    /// Short name used in logs and warnings.
    fn name(&self) -> &str;

    fn run<'a>(&'a self, appointments: &'a [Appointment]) -> BoxFuture<'a, (), StoreError>;
}
