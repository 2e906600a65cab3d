#[cfg(test)]
mod tests {
    use crate::recurrence::{Frequency, RecurrenceEnd, RecurrenceRule};
    use crate::slots::filter_elapsed;
    use crate::working_days::WorkingDaySet;
    use agendify_common::models::{day_of_week, intervals_overlap, Slot, WorkingDay};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()
    }

    // Interval starting `start` minutes after base, lasting `len` minutes
    fn interval(start: i64, len: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let s = base() + Duration::minutes(start);
        (s, s + Duration::minutes(len))
    }

    fn week_records(mask: u8) -> Vec<WorkingDay> {
        (0..=6u8)
            .map(|day| WorkingDay {
                professional_id: Uuid::nil(),
                day_of_week: day,
                is_working_day: mask & (1 << day) != 0,
                start_time: None,
                end_time: None,
            })
            .collect()
    }

    proptest! {
        // Overlap is symmetric and matches the half-open definition
        #[test]
        fn test_overlap_symmetric(
            a_start in 0..1440i64, a_len in 1..240i64,
            b_start in 0..1440i64, b_len in 1..240i64,
        ) {
            let (s1, e1) = interval(a_start, a_len);
            let (s2, e2) = interval(b_start, b_len);
            prop_assert_eq!(intervals_overlap(s1, e1, s2, e2), intervals_overlap(s2, e2, s1, e1));
            prop_assert_eq!(intervals_overlap(s1, e1, s2, e2), s1 < e2 && s2 < e1);
            // Back-to-back never overlaps
            prop_assert!(!intervals_overlap(s1, e1, e1, e1 + Duration::minutes(b_len)));
        }

        // Candidate dates stay in [today, today + horizon) and fall on working days
        #[test]
        fn test_candidate_dates_within_horizon(
            mask in 0u8..128,
            day_offset in 0i64..730,
            horizon in 1i64..120,
        ) {
            let set = WorkingDaySet::from_records(&week_records(mask));
            let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(day_offset);
            let dates = set.candidate_dates(today, horizon);

            for date in &dates {
                prop_assert!(*date >= today);
                prop_assert!(*date < today + Duration::days(horizon));
                prop_assert!(mask & (1 << day_of_week(*date)) != 0);
            }
            // Every working day of the horizon is offered
            let expected = (0..horizon)
                .map(|i| today + Duration::days(i))
                .filter(|d| mask & (1 << day_of_week(*d)) != 0)
                .count();
            prop_assert_eq!(dates.len(), expected);
        }

        // Count-bounded series have exactly `count` occurrences, evenly spaced
        #[test]
        fn test_recurrence_count_is_exact(
            count in 1u32..50,
            interval_steps in 1u32..4,
            weekly in any::<bool>(),
            start_minute in 0i64..1380,
        ) {
            let frequency = if weekly { Frequency::Weekly } else { Frequency::Daily };
            let rule = RecurrenceRule::new(frequency, interval_steps, RecurrenceEnd::Count(count));
            let (start, end) = interval(start_minute, 30);
            let occurrences = rule.expand(start, end, chrono_tz::UTC, 200).unwrap();

            prop_assert_eq!(occurrences.len() as u32, count);
            prop_assert_eq!(occurrences[0].start, start);
            let step = (if weekly { 7 } else { 1 }) * i64::from(interval_steps);
            for pair in occurrences.windows(2) {
                prop_assert_eq!(pair[1].start - pair[0].start, Duration::days(step));
                prop_assert_eq!(pair[1].end - pair[1].start, Duration::minutes(30));
            }
        }

        // Slots of today never start before now; other days are untouched
        #[test]
        fn test_filter_elapsed_today_only(
            starts in proptest::collection::vec(0i64..1440, 0..20),
            now_minute in 0i64..1440,
            same_day in any::<bool>(),
        ) {
            let slots: Vec<Slot> = starts
                .iter()
                .map(|m| {
                    let (start, end) = interval(*m, 30);
                    Slot { start, end }
                })
                .collect();
            let date = base().date_naive();
            let now = if same_day {
                base() + Duration::minutes(now_minute)
            } else {
                base() - Duration::days(1) + Duration::minutes(now_minute)
            };

            let kept = filter_elapsed(slots.clone(), date, now, chrono_tz::UTC);
            if same_day {
                prop_assert!(kept.iter().all(|s| s.start >= now));
                prop_assert_eq!(kept.len(), slots.iter().filter(|s| s.start >= now).count());
            } else {
                prop_assert_eq!(kept, slots);
            }
        }
    }
}
