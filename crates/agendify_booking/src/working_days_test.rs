// --- File: crates/agendify_booking/src/working_days_test.rs ---
#[cfg(test)]
mod tests {
    use crate::invalidation::WorkingHoursBus;
    use crate::working_days::{WorkingDayResolver, WorkingDaySet};
    use agendify_common::models::WorkingDay;
    use agendify_store::InMemoryStore;
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn record(professional_id: Uuid, day: u8, working: bool) -> WorkingDay {
        WorkingDay {
            professional_id,
            day_of_week: day,
            is_working_day: working,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(17, 0, 0),
        }
    }

    fn mon_wed_fri(professional_id: Uuid) -> Vec<WorkingDay> {
        (0..=6)
            .map(|day| record(professional_id, day, matches!(day, 1 | 3 | 5)))
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_records_keeps_only_working_days() {
        let set = WorkingDaySet::from_records(&mon_wed_fri(Uuid::new_v4()));
        assert_eq!(set.days(), vec![1, 3, 5]);
        assert!(set.is_working_day(date(2024, 1, 8)));
        assert!(!set.is_working_day(date(2024, 1, 9)));
    }

    #[test]
    fn test_candidate_dates_for_mon_wed_fri_from_sunday() {
        let set = WorkingDaySet::from_records(&mon_wed_fri(Uuid::new_v4()));
        let dates = set.candidate_dates(date(2024, 1, 7), 60);

        assert!(dates.contains(&date(2024, 1, 8)));
        assert!(dates.contains(&date(2024, 1, 10)));
        assert!(!dates.contains(&date(2024, 1, 9)));
        assert!(!dates.contains(&date(2024, 1, 7)));
        assert_eq!(dates.first(), Some(&date(2024, 1, 8)));
    }

    #[test]
    fn test_candidate_dates_stay_within_horizon() {
        let set = WorkingDaySet::from_records(
            &(0..=6)
                .map(|day| record(Uuid::nil(), day, true))
                .collect::<Vec<_>>(),
        );
        let today = date(2024, 1, 7);
        let dates = set.candidate_dates(today, 60);
        assert_eq!(dates.len(), 60);
        assert_eq!(dates.first(), Some(&today));
        assert_eq!(dates.last(), Some(&date(2024, 3, 6)));
    }

    #[test]
    fn test_candidate_dates_clamp_oversized_horizon() {
        let every_day: Vec<WorkingDay> = (0..=6).map(|day| record(Uuid::nil(), day, true)).collect();
        let set = WorkingDaySet::from_records(&every_day);
        let dates = set.candidate_dates(date(2024, 1, 7), i64::MAX);
        assert_eq!(dates.len(), agendify_config::MAX_HORIZON_DAYS as usize);
    }

    #[test]
    fn test_empty_set_has_no_candidates() {
        assert!(WorkingDaySet::empty()
            .candidate_dates(date(2024, 1, 7), 60)
            .is_empty());
    }

    #[tokio::test]
    async fn test_resolver_without_professional_is_empty() {
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        let resolver = WorkingDayResolver::new(store, &WorkingHoursBus::new());
        assert!(resolver.resolve(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_resolver_fails_closed_on_store_error() {
        let professional_id = Uuid::new_v4();
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        store.set_working_days(professional_id, mon_wed_fri(professional_id));
        store.set_unavailable(true);

        let resolver = WorkingDayResolver::new(store.clone(), &WorkingHoursBus::new());
        assert!(resolver.resolve(Some(professional_id)).await.is_empty());

        // Failures are not cached.
        store.set_unavailable(false);
        assert_eq!(
            resolver.resolve(Some(professional_id)).await.days(),
            vec![1, 3, 5]
        );
    }

    #[tokio::test]
    async fn test_resolver_rederives_after_scoped_invalidation() {
        let professional_id = Uuid::new_v4();
        let other_id = Uuid::new_v4();
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        store.set_working_days(professional_id, mon_wed_fri(professional_id));
        store.set_working_days(other_id, mon_wed_fri(other_id));

        let bus = WorkingHoursBus::new();
        let resolver = WorkingDayResolver::new(store.clone(), &bus);
        assert_eq!(resolver.resolve(Some(professional_id)).await.days(), vec![1, 3, 5]);
        assert_eq!(resolver.resolve(Some(other_id)).await.days(), vec![1, 3, 5]);

        // Change both in the store, but announce only one.
        store.set_working_days(professional_id, vec![record(professional_id, 2, true)]);
        store.set_working_days(other_id, vec![record(other_id, 4, true)]);
        bus.publish(professional_id);

        assert_eq!(resolver.resolve(Some(professional_id)).await.days(), vec![2]);
        assert_eq!(resolver.resolve(Some(other_id)).await.days(), vec![1, 3, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolver_cache_evicts_oldest_when_full() {
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            store.set_working_days(*id, mon_wed_fri(*id));
        }

        let resolver = WorkingDayResolver::with_limits(
            store.clone(),
            &WorkingHoursBus::new(),
            2,
            Duration::from_secs(300),
        );
        for id in &ids {
            resolver.resolve(Some(*id)).await;
            assert!(resolver.cached_len() <= 2);
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        assert_eq!(resolver.cached_len(), 2);

        // The evicted professional is fetched again, unannounced edits included.
        store.set_working_days(ids[0], vec![record(ids[0], 2, true)]);
        assert_eq!(resolver.resolve(Some(ids[0])).await.days(), vec![2]);
        assert_eq!(resolver.cached_len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolver_cache_entries_expire() {
        let professional_id = Uuid::new_v4();
        let store = Arc::new(InMemoryStore::new(chrono_tz::UTC));
        store.set_working_days(professional_id, mon_wed_fri(professional_id));

        let resolver = WorkingDayResolver::with_limits(
            store.clone(),
            &WorkingHoursBus::new(),
            16,
            Duration::from_secs(60),
        );
        assert_eq!(resolver.resolve(Some(professional_id)).await.days(), vec![1, 3, 5]);

        store.set_working_days(professional_id, vec![record(professional_id, 4, true)]);
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(resolver.resolve(Some(professional_id)).await.days(), vec![1, 3, 5]);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(resolver.resolve(Some(professional_id)).await.days(), vec![4]);
    }
}
