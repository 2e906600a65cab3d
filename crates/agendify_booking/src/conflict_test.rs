// --- File: crates/agendify_booking/src/conflict_test.rs ---
#[cfg(test)]
mod tests {
    use crate::conflict::{ConflictChecker, ConflictQuery, ConflictReport};
    use crate::error::BookingError;
    use agendify_common::models::{Appointment, AppointmentStatus};
    use agendify_config::ConflictPolicy;
    use agendify_store::InMemoryStore;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, h, m, 0).unwrap()
    }

    fn booked(
        professional_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: AppointmentStatus,
        client_name: Option<&str>,
    ) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            professional_id,
            specialty_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            calendar_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            status,
            client_name: client_name.map(str::to_string),
            notes: None,
            series_id: None,
        }
    }

    fn query(professional_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> ConflictQuery {
        ConflictQuery {
            professional_id,
            start,
            end,
            exclude_appointment_id: None,
        }
    }

    fn checker_with(appointments: Vec<Appointment>) -> (Arc<InMemoryStore>, ConflictChecker) {
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        for appointment in appointments {
            store.seed_appointment(appointment);
        }
        let checker = ConflictChecker::new(store.clone(), ConflictPolicy::FailClosed);
        (store, checker)
    }

    #[tokio::test]
    async fn test_overlapping_interval_conflicts() {
        let professional_id = Uuid::new_v4();
        let (_, checker) = checker_with(vec![booked(
            professional_id,
            at(10, 0),
            at(10, 30),
            AppointmentStatus::Confirmed,
            Some("Ana"),
        )]);

        let report = checker
            .check(query(professional_id, at(10, 15), at(10, 45)))
            .await
            .unwrap();
        assert!(report.has_conflict);
        assert_eq!(report.conflicting_appointments.len(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_does_not_conflict() {
        let professional_id = Uuid::new_v4();
        let (_, checker) = checker_with(vec![booked(
            professional_id,
            at(10, 0),
            at(10, 30),
            AppointmentStatus::Pending,
            None,
        )]);

        let report = checker
            .check(query(professional_id, at(10, 30), at(11, 0)))
            .await
            .unwrap();
        assert!(!report.has_conflict);
        let report = checker
            .check(query(professional_id, at(9, 30), at(10, 0)))
            .await
            .unwrap();
        assert!(!report.has_conflict);
    }

    #[tokio::test]
    async fn test_canceled_and_foreign_appointments_are_ignored() {
        let professional_id = Uuid::new_v4();
        let (_, checker) = checker_with(vec![
            booked(professional_id, at(10, 0), at(10, 30), AppointmentStatus::Canceled, None),
            booked(Uuid::new_v4(), at(10, 0), at(10, 30), AppointmentStatus::Confirmed, None),
        ]);
        let report = checker
            .check(query(professional_id, at(10, 0), at(10, 30)))
            .await
            .unwrap();
        assert!(!report.has_conflict);
    }

    #[tokio::test]
    async fn test_excluded_appointment_is_not_a_self_conflict() {
        let professional_id = Uuid::new_v4();
        let existing = booked(professional_id, at(10, 0), at(10, 30), AppointmentStatus::Confirmed, None);
        let (_, checker) = checker_with(vec![existing.clone()]);

        let report = checker
            .check(ConflictQuery {
                exclude_appointment_id: Some(existing.id),
                ..query(professional_id, at(10, 0), at(10, 30))
            })
            .await
            .unwrap();
        assert!(!report.has_conflict);
    }

    #[test]
    fn test_rows_returned_by_the_store_are_refiltered() {
        // Rows outside the window, canceled or excluded are dropped even if a
        // store hands them back.
        let professional_id = Uuid::new_v4();
        let excluded = booked(professional_id, at(10, 0), at(10, 30), AppointmentStatus::Pending, None);
        let overlapping = booked(professional_id, at(9, 45), at(10, 15), AppointmentStatus::Confirmed, None);
        let conflict_query = ConflictQuery {
            exclude_appointment_id: Some(excluded.id),
            ..query(professional_id, at(10, 0), at(10, 30))
        };
        let report = ConflictReport::from_candidates(
            &conflict_query,
            vec![
                booked(professional_id, at(8, 0), at(8, 30), AppointmentStatus::Confirmed, None),
                booked(professional_id, at(10, 30), at(11, 0), AppointmentStatus::Confirmed, None),
                booked(professional_id, at(10, 0), at(10, 30), AppointmentStatus::Canceled, None),
                excluded,
                overlapping.clone(),
            ],
        );
        assert!(report.has_conflict);
        assert_eq!(report.conflicting_appointments, vec![overlapping]);
    }

    #[tokio::test]
    async fn test_fail_closed_blocks_on_store_error() {
        let (store, checker) = checker_with(Vec::new());
        store.set_unavailable(true);
        let result = checker
            .check(query(Uuid::new_v4(), at(10, 0), at(10, 30)))
            .await;
        assert!(matches!(result, Err(BookingError::ConflictCheckUnavailable(_))));
    }

    #[tokio::test]
    async fn test_fail_open_reports_no_conflict_on_store_error() {
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        store.set_unavailable(true);
        let checker = ConflictChecker::new(store, ConflictPolicy::FailOpen);
        let report = checker
            .check(query(Uuid::new_v4(), at(10, 0), at(10, 30)))
            .await
            .unwrap();
        assert!(!report.has_conflict);
    }

    #[tokio::test]
    async fn test_empty_interval_is_rejected() {
        let (_, checker) = checker_with(Vec::new());
        let result = checker
            .check(query(Uuid::new_v4(), at(10, 0), at(10, 0)))
            .await;
        assert!(matches!(result, Err(BookingError::InvalidSlot(_))));
    }

    #[test]
    fn test_details_are_localized() {
        let professional_id = Uuid::new_v4();
        let report = ConflictReport {
            has_conflict: true,
            conflicting_appointments: vec![
                booked(professional_id, at(13, 0), at(13, 30), AppointmentStatus::Confirmed, Some("Maria")),
                booked(professional_id, at(14, 0), at(14, 30), AppointmentStatus::Pending, None),
            ],
        };
        assert_eq!(
            report.details(chrono_tz::America::Sao_Paulo),
            "• Maria - 08/01/2024 10:00\n• unknown - 08/01/2024 11:00"
        );
    }
}
