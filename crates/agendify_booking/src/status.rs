// --- File: crates/agendify_booking/src/status.rs ---

use agendify_common::models::{Appointment, AppointmentStatus};
use agendify_common::services::SchedulingStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::BookingError;

/// Applies user-driven status changes, enforcing
/// `pending → confirmed → completed` and `pending | confirmed → canceled`.
pub struct StatusService {
    store: Arc<dyn SchedulingStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    pub async fn transition(
        &self,
        appointment_id: Uuid,
        next: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        let current = self
            .store
            .get_appointment(appointment_id)
            .await?
            .ok_or(BookingError::AppointmentNotFound(appointment_id))?;

        if !current.status.can_transition_to(next) {
            return Err(BookingError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        let updated = self
            .store
            .update_appointment_status(appointment_id, next)
            .await?;
        info!(
            "Appointment {} moved from {} to {}",
            appointment_id, current.status, updated.status
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendify_store::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn store_with(status: AppointmentStatus) -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        let id = Uuid::new_v4();
        store.seed_appointment(Appointment {
            id,
            professional_id: Uuid::new_v4(),
            specialty_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            calendar_id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 1, 8, 9, 30, 0).unwrap(),
            status,
            client_name: None,
            notes: None,
            series_id: None,
        });
        (store, id)
    }

    #[tokio::test]
    async fn test_legal_path_to_completed() {
        let (store, id) = store_with(AppointmentStatus::Pending);
        let service = StatusService::new(store);

        let confirmed = service.transition(id, AppointmentStatus::Confirmed).await.unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        let completed = service.transition(id, AppointmentStatus::Completed).await.unwrap();
        assert_eq!(completed.status, AppointmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_terminal_states_reject_changes() {
        let (store, id) = store_with(AppointmentStatus::Canceled);
        let service = StatusService::new(store.clone());
        let result = service.transition(id, AppointmentStatus::Pending).await;
        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition {
                from: AppointmentStatus::Canceled,
                to: AppointmentStatus::Pending
            })
        ));
        assert_eq!(store.appointments()[0].status, AppointmentStatus::Canceled);
    }

    #[tokio::test]
    async fn test_skipping_confirmation_is_rejected() {
        let (store, id) = store_with(AppointmentStatus::Pending);
        let service = StatusService::new(store);
        let result = service.transition(id, AppointmentStatus::Completed).await;
        assert!(matches!(result, Err(BookingError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_unknown_appointment() {
        let (store, _) = store_with(AppointmentStatus::Pending);
        let service = StatusService::new(store);
        let missing = Uuid::new_v4();
        let result = service.transition(missing, AppointmentStatus::Canceled).await;
        assert!(matches!(result, Err(BookingError::AppointmentNotFound(id)) if id == missing));
    }
}
