// --- File: crates/agendify_booking/src/invalidation.rs ---
//! In-process "working hours changed" notifications.
//!
//! Events carry the professional they concern. Subscribers obtained through
//! [`WorkingHoursBus::subscribe`] only ever see events of their own
//! professional, so one tenant's edits never reach another tenant's views.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursChanged {
    pub professional_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct WorkingHoursBus {
    sender: broadcast::Sender<WorkingHoursChanged>,
}

impl Default for WorkingHoursBus {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkingHoursBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Announces new working hours for `professional_id`.
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, professional_id: Uuid) -> usize {
        let delivered = self
            .sender
            .send(WorkingHoursChanged { professional_id })
            .unwrap_or(0);
        debug!(
            "Working hours changed for {} ({} subscriber(s))",
            professional_id, delivered
        );
        delivered
    }

    /// Subscription limited to the events of one professional.
    pub fn subscribe(&self, professional_id: Uuid) -> ProfessionalSubscription {
        ProfessionalSubscription {
            professional_id,
            receiver: self.sender.subscribe(),
        }
    }

    /// Unscoped subscription, used by caches that hold entries for many professionals.
    pub(crate) fn subscribe_all(&self) -> broadcast::Receiver<WorkingHoursChanged> {
        self.sender.subscribe()
    }
}

pub struct ProfessionalSubscription {
    professional_id: Uuid,
    receiver: broadcast::Receiver<WorkingHoursChanged>,
}

impl ProfessionalSubscription {
    pub fn professional_id(&self) -> Uuid {
        self.professional_id
    }

    /// Waits for the next change of this professional's working hours.
    ///
    /// A lagging receiver may have dropped a relevant event, so lag is
    /// reported as a change. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<WorkingHoursChanged> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.professional_id == self.professional_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "Working-hours subscription for {} lagged by {} event(s)",
                        self.professional_id, skipped
                    );
                    return Some(WorkingHoursChanged {
                        professional_id: self.professional_id,
                    });
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv): true if at least one
    /// change for this professional is pending. Drains the pending events.
    pub fn has_changed(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok(event) => changed |= event.professional_id == self.professional_id,
                Err(broadcast::error::TryRecvError::Lagged(_)) => changed = true,
                Err(_) => return changed,
            }
        }
    }
}
