// --- File: crates/agendify_booking/src/working_days.rs ---
//! Weekdays on which a professional accepts appointments, and the candidate
//! dates they produce within the booking horizon.

use agendify_common::models::{day_of_week, DayOfWeek, WorkingDay};
use agendify_common::services::SchedulingStore;
use agendify_config::MAX_HORIZON_DAYS;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::invalidation::{WorkingHoursBus, WorkingHoursChanged};

/// Set of weekday numbers (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingDaySet {
    days: BTreeSet<DayOfWeek>,
}

impl WorkingDaySet {
    /// The set used when no professional is selected, or when the lookup failed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Keeps the weekdays of records flagged as working days.
    pub fn from_records(records: &[WorkingDay]) -> Self {
        Self {
            days: records
                .iter()
                .filter(|r| r.is_working_day && r.day_of_week <= 6)
                .map(|r| r.day_of_week)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> Vec<DayOfWeek> {
        self.days.iter().copied().collect()
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.days.contains(&day_of_week(date))
    }

    /// Dates `today + i` for `i` in `[0, horizon_days)` that fall on a working day.
    /// The horizon is clamped to `MAX_HORIZON_DAYS`.
    pub fn candidate_dates(&self, today: NaiveDate, horizon_days: i64) -> Vec<NaiveDate> {
        if self.days.is_empty() {
            return Vec::new();
        }
        (0..horizon_days.clamp(0, MAX_HORIZON_DAYS))
            .map_while(|offset| today.checked_add_signed(Duration::days(offset)))
            .filter(|date| self.is_working_day(*date))
            .collect()
    }
}

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;
pub const DEFAULT_CACHE_TTL: std::time::Duration = std::time::Duration::from_secs(300);

struct CachedSet {
    set: WorkingDaySet,
    fetched_at: Instant,
}

/// Looks up working-day sets through the store and caches them per professional.
///
/// Lookups fail closed: a store error yields the empty set and is not cached.
/// Cached sets are dropped when the [`WorkingHoursBus`] announces a change
/// for their professional; pending announcements are applied before every lookup.
/// Entries also expire after the cache TTL, and the cache holds at most
/// `capacity` professionals, evicting the oldest entry first.
pub struct WorkingDayResolver {
    store: Arc<dyn SchedulingStore>,
    cache: Mutex<HashMap<Uuid, CachedSet>>,
    invalidations: Mutex<broadcast::Receiver<WorkingHoursChanged>>,
    capacity: usize,
    ttl: std::time::Duration,
}

impl WorkingDayResolver {
    pub fn new(store: Arc<dyn SchedulingStore>, bus: &WorkingHoursBus) -> Self {
        Self::with_limits(store, bus, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }

    pub fn with_limits(
        store: Arc<dyn SchedulingStore>,
        bus: &WorkingHoursBus,
        capacity: usize,
        ttl: std::time::Duration,
    ) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
            invalidations: Mutex::new(bus.subscribe_all()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub async fn resolve(&self, professional_id: Option<Uuid>) -> WorkingDaySet {
        let Some(professional_id) = professional_id else {
            return WorkingDaySet::empty();
        };

        self.apply_invalidations();
        if let Some(cached) = self.cached(professional_id) {
            return cached;
        }

        match self.store.working_days(professional_id).await {
            Ok(records) => {
                let set = WorkingDaySet::from_records(&records);
                debug!(
                    "Working days for {}: {:?}",
                    professional_id,
                    set.days()
                );
                self.remember(professional_id, set.clone());
                set
            }
            Err(e) => {
                error!(
                    "Failed to fetch working days for {}: {}",
                    professional_id, e
                );
                WorkingDaySet::empty()
            }
        }
    }

    pub async fn candidate_dates(
        &self,
        professional_id: Option<Uuid>,
        today: NaiveDate,
        horizon_days: i64,
    ) -> Vec<NaiveDate> {
        self.resolve(professional_id)
            .await
            .candidate_dates(today, horizon_days)
    }

    pub fn invalidate(&self, professional_id: Uuid) {
        if self.cache_lock().remove(&professional_id).is_some() {
            info!("Working-day cache dropped for {}", professional_id);
        }
    }

    /// Number of professionals currently cached.
    pub fn cached_len(&self) -> usize {
        self.cache_lock().len()
    }

    fn cached(&self, professional_id: Uuid) -> Option<WorkingDaySet> {
        let mut cache = self.cache_lock();
        let entry = cache.get(&professional_id)?;
        if entry.fetched_at.elapsed() < self.ttl {
            return Some(entry.set.clone());
        }
        cache.remove(&professional_id);
        None
    }

    fn remember(&self, professional_id: Uuid, set: WorkingDaySet) {
        let mut cache = self.cache_lock();
        if cache.len() >= self.capacity && !cache.contains_key(&professional_id) {
            let ttl = self.ttl;
            cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
            if cache.len() >= self.capacity {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.fetched_at)
                    .map(|(id, _)| *id);
                if let Some(oldest) = oldest {
                    debug!("Working-day cache full, evicting {}", oldest);
                    cache.remove(&oldest);
                }
            }
        }
        cache.insert(
            professional_id,
            CachedSet {
                set,
                fetched_at: Instant::now(),
            },
        );
    }

    fn apply_invalidations(&self) {
        let mut receiver = self
            .invalidations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        loop {
            match receiver.try_recv() {
                Ok(event) => self.invalidate(event.professional_id),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    // Lost events may concern any professional.
                    self.cache_lock().clear();
                }
                Err(_) => break,
            }
        }
    }

    fn cache_lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, CachedSet>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
