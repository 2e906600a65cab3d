// File: crates/agendify_booking/src/handlers.rs
use agendify_common::models::{Appointment, AppointmentStatus, DayOfWeek, Slot, WorkingDay};
use agendify_common::services::{BookingSideEffect, SchedulingStore};
use agendify_common::{handle_json_result, map_json_error, AgendifyError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::booking::{BookingOutcome, BookingRequest, BookingService};
use crate::conflict::{ConflictChecker, ConflictQuery};
use crate::error::{BookingError, BookingErrorBody};
use crate::invalidation::WorkingHoursBus;
use crate::settings::{BookingSettings, Clock};
use crate::slots::{SlotGenerator, SlotSelection};
use crate::status::StatusService;
use crate::working_days::WorkingDayResolver;
use crate::working_hours::{WorkingDayInput, WorkingHoursEditor};

/// Shared state of the booking routes.
pub struct BookingState {
    pub settings: BookingSettings,
    /// "Now" for candidate dates, slots and bookings.
    pub clock: Clock,
    pub bus: WorkingHoursBus,
    pub resolver: Arc<WorkingDayResolver>,
    pub slots: SlotGenerator,
    pub checker: Arc<ConflictChecker>,
    pub booking: BookingService,
    pub status: StatusService,
    pub editor: WorkingHoursEditor,
}

impl BookingState {
    pub fn new(
        settings: BookingSettings,
        store: Arc<dyn SchedulingStore>,
        side_effects: Vec<Arc<dyn BookingSideEffect>>,
    ) -> Self {
        let bus = WorkingHoursBus::new();
        let checker = Arc::new(ConflictChecker::new(
            store.clone(),
            settings.conflict_policy,
        ));
        let resolver = Arc::new(WorkingDayResolver::new(store.clone(), &bus));
        Self {
            settings,
            clock: Clock::System,
            slots: SlotGenerator::new(store.clone(), settings.time_zone),
            booking: BookingService::new(
                store.clone(),
                checker.clone(),
                resolver.clone(),
                side_effects,
                settings,
            ),
            status: StatusService::new(store.clone()),
            editor: WorkingHoursEditor::new(store, bus.clone()),
            resolver,
            checker,
            bus,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WorkingDaysResponse {
    pub professional_id: Uuid,
    /// Weekday numbers, 0 = Sunday.
    pub days: Vec<DayOfWeek>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CandidateDatesResponse {
    pub professional_id: Uuid,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WorkingHoursRequest {
    pub days: Vec<WorkingDayInput>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConflictCheckResponse {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
    /// One line per conflict, empty when there is none.
    pub details: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusUpdateRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: String,
}

/// Weekdays the professional accepts appointments on. Empty when the lookup fails.
#[axum::debug_handler]
pub async fn get_working_days_handler(
    State(state): State<Arc<BookingState>>,
    Path(professional_id): Path<Uuid>,
) -> Json<WorkingDaysResponse> {
    let set = state.resolver.resolve(Some(professional_id)).await;
    Json(WorkingDaysResponse {
        professional_id,
        days: set.days(),
    })
}

/// Working dates from today (calendar time zone) to the end of the horizon.
#[axum::debug_handler]
pub async fn get_candidate_dates_handler(
    State(state): State<Arc<BookingState>>,
    Path(professional_id): Path<Uuid>,
) -> Json<CandidateDatesResponse> {
    let today = state.settings.today(state.clock.now());
    let dates = state
        .resolver
        .candidate_dates(Some(professional_id), today, state.settings.horizon_days)
        .await;
    Json(CandidateDatesResponse {
        professional_id,
        dates,
    })
}

#[axum::debug_handler]
pub async fn put_working_hours_handler(
    State(state): State<Arc<BookingState>>,
    Path(professional_id): Path<Uuid>,
    Json(payload): Json<WorkingHoursRequest>,
) -> Result<Json<Vec<WorkingDay>>, Response> {
    map_json_error(
        state.editor.save(professional_id, payload.days).await,
        AgendifyError::from,
    )
}

/// Open slots for one day. Store failures yield an empty list.
#[axum::debug_handler]
pub async fn get_slots_handler(
    State(state): State<Arc<BookingState>>,
    Query(selection): Query<SlotSelection>,
) -> Json<SlotsResponse> {
    let slots = state.slots.generate(selection, state.clock.now()).await;
    Json(SlotsResponse {
        date: selection.date,
        slots,
    })
}

#[axum::debug_handler]
pub async fn check_conflicts_handler(
    State(state): State<Arc<BookingState>>,
    Json(query): Json<ConflictQuery>,
) -> Result<Json<ConflictCheckResponse>, Response> {
    let result = state
        .checker
        .check(query)
        .await
        .map(|report| ConflictCheckResponse {
            has_conflict: report.has_conflict,
            details: report.details(state.settings.time_zone),
            conflicting_appointments: report.conflicting_appointments,
        })
        .map_err(AgendifyError::from);
    handle_json_result(result)
}

/// Books one appointment or a recurring series.
#[axum::debug_handler]
pub async fn book_appointment_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<BookingRequest>,
) -> Response {
    match state.booking.book(request, state.clock.now()).await {
        Ok(outcome) => (StatusCode::CREATED, Json::<BookingOutcome>(outcome)).into_response(),
        Err(err) => booking_error_response(err),
    }
}

#[axum::debug_handler]
pub async fn update_status_handler(
    State(state): State<Arc<BookingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Appointment>, Response> {
    map_json_error(
        state.status.transition(appointment_id, payload.status).await,
        AgendifyError::from,
    )
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Booking errors keep the common `{"error": {...}}` envelope and add the
/// missing fields and per-occurrence conflicts.
fn booking_error_response(err: BookingError) -> Response {
    let body = BookingErrorBody::from_error(err);
    info!("Booking rejected ({}): {}", body.code, body.message);
    let status = StatusCode::from_u16(body.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(serde_json::json!({ "error": body }))).into_response()
}
