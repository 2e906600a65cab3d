// File: crates/agendify_booking/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::booking::{
    BookingOutcome, BookingRequest, MissingField, OccurrenceConflict, UnavailableOccurrence,
    UnavailableReason,
};
use crate::conflict::ConflictQuery;
use crate::error::BookingErrorBody;
use crate::handlers::{
    CandidateDatesResponse, ConflictCheckResponse, HealthResponse, SlotsResponse,
    StatusUpdateRequest, WorkingDaysResponse, WorkingHoursRequest,
};
use crate::recurrence::{Frequency, RecurrenceEnd, RecurrenceRule};
use crate::working_hours::WorkingDayInput;
use agendify_common::models::{Appointment, AppointmentStatus, Slot, WorkingDay};

#[utoipa::path(
    get,
    path = "/professionals/{professional_id}/working-days",
    params(
        ("professional_id" = uuid::Uuid, Path, description = "Professional ID")
    ),
    responses(
        (status = 200, description = "Weekdays with appointments (0 = Sunday); empty if unknown or on lookup failure", body = WorkingDaysResponse,
         example = json!({
             "professional_id": "5b7c1a8e-2f0e-4c8e-9d3a-7a1f0c2b9e11",
             "days": [1, 3, 5]
         })
        )
    ),
    tag = "Availability"
)]
fn doc_get_working_days_handler() {}

#[utoipa::path(
    get,
    path = "/professionals/{professional_id}/candidate-dates",
    params(
        ("professional_id" = uuid::Uuid, Path, description = "Professional ID")
    ),
    responses(
        (status = 200, description = "Selectable dates from today (calendar time zone) within the booking horizon", body = CandidateDatesResponse)
    ),
    tag = "Availability"
)]
fn doc_get_candidate_dates_handler() {}

#[utoipa::path(
    put,
    path = "/professionals/{professional_id}/working-hours",
    params(
        ("professional_id" = uuid::Uuid, Path, description = "Professional ID")
    ),
    request_body(content = WorkingHoursRequest, example = json!({
        "days": [
            {"day_of_week": 0, "is_working_day": false},
            {"day_of_week": 1, "is_working_day": true, "start_time": "09:00:00", "end_time": "17:00:00"},
            {"day_of_week": 2, "is_working_day": false},
            {"day_of_week": 3, "is_working_day": true, "start_time": "09:00:00", "end_time": "17:00:00"},
            {"day_of_week": 4, "is_working_day": false},
            {"day_of_week": 5, "is_working_day": true, "start_time": "09:00:00", "end_time": "13:00:00"},
            {"day_of_week": 6, "is_working_day": false}
        ]
    })),
    responses(
        (status = 200, description = "Saved working-day records", body = Vec<WorkingDay>),
        (status = 400, description = "Not exactly one valid record per weekday")
    ),
    tag = "Availability"
)]
fn doc_put_working_hours_handler() {}

#[utoipa::path(
    get,
    path = "/slots",
    params(
        ("professional_id" = uuid::Uuid, Query, description = "Professional ID"),
        ("specialty_id" = uuid::Uuid, Query, description = "Specialty ID, fixes the slot length"),
        ("date" = String, Query, description = "Day in YYYY-MM-DD format", example = "2024-01-08", format = "date")
    ),
    responses(
        (status = 200, description = "Open slots; elapsed slots of today are removed", body = SlotsResponse,
         example = json!({
             "date": "2024-01-08",
             "slots": [
                 {"start": "2024-01-08T12:00:00Z", "end": "2024-01-08T12:30:00Z"},
                 {"start": "2024-01-08T12:30:00Z", "end": "2024-01-08T13:00:00Z"}
             ]
         })
        )
    ),
    tag = "Availability"
)]
fn doc_get_slots_handler() {}

#[utoipa::path(
    post,
    path = "/appointments/conflicts",
    request_body(content = ConflictQuery, example = json!({
        "professional_id": "5b7c1a8e-2f0e-4c8e-9d3a-7a1f0c2b9e11",
        "start": "2024-01-08T12:00:00Z",
        "end": "2024-01-08T12:30:00Z",
        "exclude_appointment_id": null
    })),
    responses(
        (status = 200, description = "Conflict report", body = ConflictCheckResponse),
        (status = 400, description = "End is not after start"),
        (status = 503, description = "Conflict lookup failed and the policy is fail-closed")
    ),
    tag = "Appointments"
)]
fn doc_check_conflicts_handler() {}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body(content = BookingRequest, example = json!({
        "specialty_id": "0e6f3c1d-7b2a-4a57-8f8e-3c5d2a1b4e77",
        "professional_id": "5b7c1a8e-2f0e-4c8e-9d3a-7a1f0c2b9e11",
        "calendar_id": "a9d2f4e6-1c3b-4d5e-8f7a-6b5c4d3e2f10",
        "date": "2024-01-08",
        "slot": {"start": "2024-01-08T12:00:00Z", "end": "2024-01-08T12:30:00Z"},
        "client_id": "c3b2a1f0-9e8d-4c7b-a6f5-e4d3c2b1a098",
        "recurrence": {"frequency": "weekly", "interval": 1, "end": {"count": 3}}
    })),
    responses(
        (status = 201, description = "Appointments stored; failed side effects are listed as warnings", body = BookingOutcome),
        (status = 400, description = "Missing information, invalid slot or recurrence, or occurrences on days off or past the horizon", body = BookingErrorBody),
        (status = 404, description = "Unknown specialty", body = BookingErrorBody),
        (status = 409, description = "One or more occurrences conflict; nothing was stored", body = BookingErrorBody),
        (status = 503, description = "Conflict check could not run", body = BookingErrorBody)
    ),
    tag = "Appointments"
)]
fn doc_book_appointment_handler() {}

#[utoipa::path(
    patch,
    path = "/appointments/{appointment_id}/status",
    params(
        ("appointment_id" = uuid::Uuid, Path, description = "Appointment ID")
    ),
    request_body(content = StatusUpdateRequest, example = json!({"status": "confirmed"})),
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    tag = "Appointments"
)]
fn doc_update_status_handler() {}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
fn doc_health_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_working_days_handler,
        doc_get_candidate_dates_handler,
        doc_put_working_hours_handler,
        doc_get_slots_handler,
        doc_check_conflicts_handler,
        doc_book_appointment_handler,
        doc_update_status_handler,
        doc_health_handler
    ),
    components(
        schemas(
            Appointment,
            AppointmentStatus,
            Slot,
            WorkingDay,
            WorkingDayInput,
            WorkingDaysResponse,
            CandidateDatesResponse,
            WorkingHoursRequest,
            SlotsResponse,
            ConflictQuery,
            ConflictCheckResponse,
            BookingRequest,
            BookingOutcome,
            BookingErrorBody,
            MissingField,
            OccurrenceConflict,
            UnavailableOccurrence,
            UnavailableReason,
            RecurrenceRule,
            RecurrenceEnd,
            Frequency,
            StatusUpdateRequest,
            HealthResponse
        )
    ),
    tags(
        (name = "Availability", description = "Working days, candidate dates and slots"),
        (name = "Appointments", description = "Conflict checks, booking and status changes"),
        (name = "Health", description = "Liveness")
    ),
    servers(
        (url = "/api", description = "Agendify booking API")
    )
)]
pub struct BookingApiDoc;
