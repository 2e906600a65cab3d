// --- File: crates/agendify_booking/src/slots.rs ---
//! Bookable time windows for a (professional, specialty, date) selection.
//!
//! Interval computation is done by the store; this module only drops the
//! elapsed windows of today and guards against stale responses.

use agendify_common::models::Slot;
use agendify_common::services::SchedulingStore;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct SlotSelection {
    pub professional_id: Uuid,
    pub specialty_id: Uuid,
    /// Calendar day in YYYY-MM-DD format.
    pub date: NaiveDate,
}

/// Drops slots of today that start before `now`. Slots of any other date
/// are kept regardless of their time of day.
pub fn filter_elapsed(slots: Vec<Slot>, date: NaiveDate, now: DateTime<Utc>, tz: Tz) -> Vec<Slot> {
    let today = now.with_timezone(&tz).date_naive();
    if date != today {
        return slots;
    }
    slots.into_iter().filter(|slot| slot.start >= now).collect()
}

pub struct SlotGenerator {
    store: Arc<dyn SchedulingStore>,
    time_zone: Tz,
}

impl SlotGenerator {
    pub fn new(store: Arc<dyn SchedulingStore>, time_zone: Tz) -> Self {
        Self { store, time_zone }
    }

    /// Store slots for `selection`, in store order, without elapsed ones.
    /// A failed lookup is logged and yields no slots.
    pub async fn generate(&self, selection: SlotSelection, now: DateTime<Utc>) -> Vec<Slot> {
        let slots = match self
            .store
            .available_slots(
                selection.professional_id,
                selection.specialty_id,
                selection.date,
            )
            .await
        {
            Ok(slots) => slots,
            Err(e) => {
                error!(
                    "Failed to fetch slots for professional {} on {}: {}",
                    selection.professional_id, selection.date, e
                );
                return Vec::new();
            }
        };

        let total = slots.len();
        let slots = filter_elapsed(slots, selection.date, now, self.time_zone);
        debug!(
            "Slots for {} on {}: {} returned, {} still open",
            selection.professional_id,
            selection.date,
            total,
            slots.len()
        );
        slots
    }

    /// Fetches slots on behalf of `board`, publishing them only if no newer
    /// request was started on the board in the meantime.
    pub async fn fetch_into(
        &self,
        board: &SlotBoard,
        selection: SlotSelection,
        now: DateTime<Utc>,
    ) -> SlotFetch {
        let ticket = board.begin(selection);
        let slots = self.generate(selection, now).await;
        board.complete(ticket, slots)
    }
}

/// Issues monotonically increasing request tokens.
#[derive(Debug, Default)]
pub struct SlotRequestTracker {
    latest: AtomicU64,
}

impl SlotRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    pub token: u64,
    pub selection: SlotSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotFetch {
    /// The response matches the latest request and is now visible.
    Current(Vec<Slot>),
    /// A newer request was started; the response was discarded.
    Stale,
}

/// Slots currently shown for one booking session.
#[derive(Debug, Default)]
pub struct SlotBoard {
    tracker: SlotRequestTracker,
    visible: Mutex<Option<(SlotSelection, Vec<Slot>)>>,
}

impl SlotBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request; any older request still in flight becomes stale.
    pub fn begin(&self, selection: SlotSelection) -> SlotTicket {
        SlotTicket {
            token: self.tracker.issue(),
            selection,
        }
    }

    pub fn complete(&self, ticket: SlotTicket, slots: Vec<Slot>) -> SlotFetch {
        let mut visible = self
            .visible
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.tracker.is_latest(ticket.token) {
            warn!(
                "Discarding stale slot response (token {}) for {} on {}",
                ticket.token, ticket.selection.professional_id, ticket.selection.date
            );
            return SlotFetch::Stale;
        }
        *visible = Some((ticket.selection, slots.clone()));
        SlotFetch::Current(slots)
    }

    /// Invalidates in-flight requests and hides the current slots.
    pub fn clear(&self) {
        self.tracker.issue();
        *self
            .visible
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    pub fn visible(&self) -> Option<(SlotSelection, Vec<Slot>)> {
        self.visible
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
