// --- File: crates/agendify_store/src/memory.rs ---
//! In-memory scheduling store.
//!
//! Used by tests and by the backend when no hosted store is configured. Its
//! `available_slots` follows the contract of the hosted `get_available_slots`
//! procedure: working hours of the requested weekday, slots of the specialty
//! duration, booked (non-canceled) intervals subtracted.

use agendify_common::models::{
    day_of_week, Appointment, AppointmentDraft, AppointmentStatus, Slot, Specialty, WorkingDay,
};
use agendify_common::services::{AppointmentQuery, BoxFuture, SchedulingStore, StoreError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Working hours assumed when a working day carries no explicit times.
pub const DEFAULT_DAY_START: (u32, u32) = (8, 0);
pub const DEFAULT_DAY_END: (u32, u32) = (18, 0);

#[derive(Default)]
struct StoreState {
    working_days: HashMap<Uuid, Vec<WorkingDay>>,
    specialties: HashMap<Uuid, Specialty>,
    clients: HashMap<Uuid, String>,
    appointments: Vec<Appointment>,
}

/// Mutex-backed store keeping everything in process memory.
pub struct InMemoryStore {
    time_zone: Tz,
    state: Mutex<StoreState>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            state: Mutex::new(StoreState::default()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn add_specialty(&self, specialty: Specialty) {
        self.lock().specialties.insert(specialty.id, specialty);
    }

    pub fn add_client(&self, id: Uuid, name: &str) {
        self.lock().clients.insert(id, name.to_string());
    }

    pub fn set_working_days(&self, professional_id: Uuid, records: Vec<WorkingDay>) {
        self.lock().working_days.insert(professional_id, records);
    }

    /// Inserts an appointment as-is, bypassing every check.
    pub fn seed_appointment(&self, appointment: Appointment) {
        self.lock().appointments.push(appointment);
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.lock().appointments.clone()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        // A poisoned lock only means a panicking test thread; the data is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }

    fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        self.time_zone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn compute_slots(
        &self,
        professional_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, StoreError> {
        let state = self.lock();
        let specialty = state
            .specialties
            .get(&specialty_id)
            .ok_or_else(|| StoreError::NotFound(format!("specialty {specialty_id}")))?;

        let weekday = day_of_week(date);
        let Some(working_day) = state
            .working_days
            .get(&professional_id)
            .and_then(|days| days.iter().find(|d| d.day_of_week == weekday && d.is_working_day))
        else {
            return Ok(Vec::new());
        };

        let work_start = working_day
            .start_time
            .or_else(|| NaiveTime::from_hms_opt(DEFAULT_DAY_START.0, DEFAULT_DAY_START.1, 0))
            .unwrap_or_default();
        let work_end = working_day
            .end_time
            .or_else(|| NaiveTime::from_hms_opt(DEFAULT_DAY_END.0, DEFAULT_DAY_END.1, 0))
            .unwrap_or_default();
        let (Some(day_start), Some(day_end)) = (
            self.local_instant(date, work_start),
            self.local_instant(date, work_end),
        ) else {
            return Ok(Vec::new());
        };

        let busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = state
            .appointments
            .iter()
            .filter(|a| a.professional_id == professional_id)
            .filter(|a| a.status != AppointmentStatus::Canceled)
            .filter(|a| a.overlaps(day_start, day_end))
            .map(|a| (a.start_time, a.end_time))
            .collect();

        Ok(calculate_open_slots(
            day_start,
            day_end,
            &busy,
            Duration::minutes(specialty.duration_minutes),
        ))
    }
}

/// Splits `[day_start, day_end)` into consecutive slots of `duration`,
/// skipping every slot that overlaps a busy interval.
///
/// On an overlap the cursor jumps to the end of the busy interval, so slots
/// after a booking start right where the booking ends.
pub fn calculate_open_slots(
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    busy_periods: &[(DateTime<Utc>, DateTime<Utc>)],
    duration: Duration,
) -> Vec<Slot> {
    fn merge_busy_periods(
        busy: &[(DateTime<Utc>, DateTime<Utc>)],
    ) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let mut sorted = busy.to_vec();
        sorted.sort_by_key(|(start, _)| *start);
        let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(sorted.len());
        for (start, end) in sorted {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        merged
    }

    if duration <= Duration::zero() {
        return Vec::new();
    }

    let merged_busy = merge_busy_periods(busy_periods);
    let mut slots = Vec::new();
    let mut current = day_start;

    while current < day_end {
        let Some(slot_end) = current.checked_add_signed(duration) else {
            break;
        };
        if slot_end > day_end {
            break;
        }

        match merged_busy
            .iter()
            .find(|(busy_start, busy_end)| current < *busy_end && slot_end > *busy_start)
        {
            Some((_, busy_end)) => {
                current = (*busy_end).max(current + Duration::minutes(1));
            }
            None => {
                slots.push(Slot {
                    start: current,
                    end: slot_end,
                });
                current = slot_end;
            }
        }
    }
    slots
}

impl SchedulingStore for InMemoryStore {
    fn working_days(&self, professional_id: Uuid) -> BoxFuture<'_, Vec<WorkingDay>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let state = self.lock();
            Ok(state
                .working_days
                .get(&professional_id)
                .map(|days| days.iter().filter(|d| d.is_working_day).cloned().collect())
                .unwrap_or_default())
        })
    }

    fn replace_working_days(
        &self,
        professional_id: Uuid,
        records: Vec<WorkingDay>,
    ) -> BoxFuture<'_, Vec<WorkingDay>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            self.lock()
                .working_days
                .insert(professional_id, records.clone());
            Ok(records)
        })
    }

    fn available_slots(
        &self,
        professional_id: Uuid,
        specialty_id: Uuid,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Slot>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let slots = self.compute_slots(professional_id, specialty_id, date)?;
            debug!(
                "In-memory slots for {} on {}: {} found",
                professional_id,
                date,
                slots.len()
            );
            Ok(slots)
        })
    }

    fn query_appointments(
        &self,
        query: AppointmentQuery,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let state = self.lock();
            Ok(state
                .appointments
                .iter()
                .filter(|a| a.professional_id == query.professional_id)
                .filter(|a| a.status != AppointmentStatus::Canceled)
                .filter(|a| Some(a.id) != query.exclude_appointment_id)
                .filter(|a| a.start_time < query.window_end && a.end_time > query.window_start)
                .cloned()
                .collect())
        })
    }

    fn insert_appointments(
        &self,
        drafts: Vec<AppointmentDraft>,
    ) -> BoxFuture<'_, Vec<Appointment>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut state = self.lock();
            let inserted: Vec<Appointment> = drafts
                .into_iter()
                .map(|draft| Appointment {
                    id: Uuid::new_v4(),
                    client_name: state.clients.get(&draft.client_id).cloned(),
                    professional_id: draft.professional_id,
                    specialty_id: draft.specialty_id,
                    client_id: draft.client_id,
                    calendar_id: draft.calendar_id,
                    start_time: draft.start_time,
                    end_time: draft.end_time,
                    status: draft.status,
                    notes: draft.notes,
                    series_id: draft.series_id,
                })
                .collect();
            state.appointments.extend(inserted.iter().cloned());
            Ok(inserted)
        })
    }

    fn get_appointment(&self, id: Uuid) -> BoxFuture<'_, Option<Appointment>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self.lock().appointments.iter().find(|a| a.id == id).cloned())
        })
    }

    fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BoxFuture<'_, Appointment, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            let mut state = self.lock();
            let appointment = state
                .appointments
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("appointment {id}")))?;
            appointment.status = status;
            Ok(appointment.clone())
        })
    }

    fn get_specialty(&self, id: Uuid) -> BoxFuture<'_, Option<Specialty>, StoreError> {
        Box::pin(async move {
            self.check_available()?;
            Ok(self.lock().specialties.get(&id).cloned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, h, m, 0).unwrap()
    }

    fn store_with_monday(professional_id: Uuid, specialty_id: Uuid) -> InMemoryStore {
        let store = InMemoryStore::new(chrono_tz::UTC);
        store.add_specialty(Specialty {
            id: specialty_id,
            name: "Consultation".to_string(),
            duration_minutes: 30,
            price: None,
        });
        store.set_working_days(
            professional_id,
            vec![WorkingDay {
                professional_id,
                day_of_week: 1,
                is_working_day: true,
                start_time: NaiveTime::from_hms_opt(9, 0, 0),
                end_time: NaiveTime::from_hms_opt(11, 0, 0),
            }],
        );
        store
    }

    fn appointment(professional_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            professional_id,
            specialty_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            calendar_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            status,
            client_name: None,
            notes: None,
            series_id: None,
        }
    }

    #[test]
    fn test_open_slots_without_busy_periods() {
        let slots = calculate_open_slots(utc(9, 0), utc(11, 0), &[], Duration::minutes(30));
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![utc(9, 0), utc(9, 30), utc(10, 0), utc(10, 30)]);
    }

    #[test]
    fn test_open_slots_skip_merged_busy_periods() {
        let busy = vec![(utc(9, 30), utc(9, 50)), (utc(9, 45), utc(10, 0))];
        let slots = calculate_open_slots(utc(9, 0), utc(11, 0), &busy, Duration::minutes(30));
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![utc(9, 0), utc(10, 0), utc(10, 30)]);
    }

    #[test]
    fn test_open_slots_never_exceed_day_end() {
        let slots = calculate_open_slots(utc(9, 0), utc(10, 15), &[], Duration::minutes(30));
        assert!(slots.iter().all(|s| s.end <= utc(10, 15)));
        assert_eq!(slots.len(), 2);
    }

    #[tokio::test]
    async fn test_available_slots_respect_bookings_and_weekday() {
        let professional_id = Uuid::new_v4();
        let specialty_id = Uuid::new_v4();
        let store = store_with_monday(professional_id, specialty_id);
        store.seed_appointment(appointment(professional_id, utc(9, 0), utc(9, 30), AppointmentStatus::Confirmed));
        store.seed_appointment(appointment(professional_id, utc(10, 0), utc(10, 30), AppointmentStatus::Canceled));

        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let slots = store.available_slots(professional_id, specialty_id, monday).await.unwrap();
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![utc(9, 30), utc(10, 0), utc(10, 30)]);

        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let slots = store.available_slots(professional_id, specialty_id, tuesday).await.unwrap();
        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn test_query_excludes_canceled_and_excluded_id() {
        let professional_id = Uuid::new_v4();
        let store = InMemoryStore::new(chrono_tz::UTC);
        let kept = appointment(professional_id, utc(9, 0), utc(9, 30), AppointmentStatus::Pending);
        let excluded = appointment(professional_id, utc(9, 0), utc(9, 30), AppointmentStatus::Confirmed);
        store.seed_appointment(kept.clone());
        store.seed_appointment(excluded.clone());
        store.seed_appointment(appointment(professional_id, utc(9, 0), utc(9, 30), AppointmentStatus::Canceled));
        store.seed_appointment(appointment(Uuid::new_v4(), utc(9, 0), utc(9, 30), AppointmentStatus::Pending));

        let rows = store
            .query_appointments(AppointmentQuery {
                professional_id,
                window_start: utc(9, 0),
                window_end: utc(9, 30),
                exclude_appointment_id: Some(excluded.id),
            })
            .await
            .unwrap();
        assert_eq!(rows, vec![kept]);
    }

    #[tokio::test]
    async fn test_query_returns_only_overlapping_rows() {
        let professional_id = Uuid::new_v4();
        let store = InMemoryStore::new(chrono_tz::UTC);
        let overlapping = appointment(professional_id, utc(9, 45), utc(10, 15), AppointmentStatus::Confirmed);
        store.seed_appointment(overlapping.clone());
        store.seed_appointment(appointment(professional_id, utc(8, 0), utc(8, 30), AppointmentStatus::Confirmed));
        store.seed_appointment(appointment(professional_id, utc(10, 30), utc(11, 0), AppointmentStatus::Confirmed));
        // Back-to-back neighbours do not overlap.
        store.seed_appointment(appointment(professional_id, utc(9, 0), utc(9, 30), AppointmentStatus::Confirmed));
        store.seed_appointment(appointment(professional_id, utc(10, 30), utc(12, 0), AppointmentStatus::Pending));

        let rows = store
            .query_appointments(AppointmentQuery {
                professional_id,
                window_start: utc(9, 30),
                window_end: utc(10, 30),
                exclude_appointment_id: None,
            })
            .await
            .unwrap();
        assert_eq!(rows, vec![overlapping]);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = InMemoryStore::new(chrono_tz::UTC);
        store.set_unavailable(true);
        assert!(matches!(
            store.working_days(Uuid::new_v4()).await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.working_days(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_of_unknown_appointment() {
        let store = InMemoryStore::new(chrono_tz::UTC);
        let result = store
            .update_appointment_status(Uuid::new_v4(), AppointmentStatus::Confirmed)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
