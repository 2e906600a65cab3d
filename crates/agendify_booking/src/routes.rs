// --- File: crates/agendify_booking/src/routes.rs ---

use crate::handlers::{
    book_appointment_handler, check_conflicts_handler, get_candidate_dates_handler,
    get_slots_handler, get_working_days_handler, health_handler, put_working_hours_handler,
    update_status_handler, BookingState,
};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all booking routes, to be nested under `/api`.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/professionals/{professional_id}/working-days",
            get(get_working_days_handler),
        )
        .route(
            "/professionals/{professional_id}/candidate-dates",
            get(get_candidate_dates_handler),
        )
        .route(
            "/professionals/{professional_id}/working-hours",
            put(put_working_hours_handler),
        )
        .route("/slots", get(get_slots_handler))
        .route("/appointments", post(book_appointment_handler))
        .route("/appointments/conflicts", post(check_conflicts_handler))
        .route(
            "/appointments/{appointment_id}/status",
            patch(update_status_handler),
        )
        .with_state(state)
}
