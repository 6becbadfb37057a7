//! Periodic ambient-state refresh.
//!
//! Two independent fixed-interval loops run for the lifetime of the
//! session: one for system stats, one for notifications. Each tick spawns
//! its work, so a slow request never delays the next tick and overlapping
//! in-flight requests are allowed to complete and apply in whichever order
//! their responses arrive. Last response wins on the displayed value;
//! callers must not assume monotonic freshness under slow networks. This is
//! documented accepted behavior, not a scheduling bug.

use crate::backend::{BackendClient, Notification};
use crate::capability::{Capability, CapabilityProbe, HardwarePort};
use crate::speech::SpeechFeedbackChannel;
use crate::view::HudView;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Bounded display list of recent notifications, newest first.
///
/// The backend may return more than the capacity in one poll; all items are
/// processed, and the list is trimmed after each insertion, evicting oldest
/// first. No deduplication by identity, only by length.
#[derive(Debug, Clone)]
pub struct NotificationShelf {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationShelf {
    /// Create an empty shelf holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Prepend a notification, evicting the oldest entry when full.
    pub fn push(&mut self, item: Notification) {
        self.items.push_front(item);
        while self.items.len() > self.capacity {
            self.items.pop_back();
        }
    }

    /// Current entries, newest first.
    #[must_use]
    pub fn items(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    /// Number of entries on display.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the shelf is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Handles to the two running poll loops. Aborted on drop so a discarded
/// session does not leave tasks behind.
#[derive(Debug)]
pub struct PollingHandles {
    stats: JoinHandle<()>,
    notifications: JoinHandle<()>,
}

impl PollingHandles {
    /// Stop both loops.
    pub fn abort(&self) {
        self.stats.abort();
        self.notifications.abort();
    }
}

impl Drop for PollingHandles {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Drives the stats and notification refresh loops.
pub struct PollingScheduler {
    backend: Arc<BackendClient>,
    view: Arc<dyn HudView>,
    speech: Arc<SpeechFeedbackChannel>,
    probe: Arc<dyn CapabilityProbe>,
    hardware: Arc<dyn HardwarePort>,
    shelf: Mutex<NotificationShelf>,
    stats_interval: Duration,
    notifications_interval: Duration,
}

impl std::fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("stats_interval", &self.stats_interval)
            .field("notifications_interval", &self.notifications_interval)
            .finish()
    }
}

impl PollingScheduler {
    /// Create a scheduler. Intervals of zero are clamped to one millisecond.
    pub fn new(
        backend: Arc<BackendClient>,
        view: Arc<dyn HudView>,
        speech: Arc<SpeechFeedbackChannel>,
        probe: Arc<dyn CapabilityProbe>,
        hardware: Arc<dyn HardwarePort>,
        stats_interval: Duration,
        notifications_interval: Duration,
        shelf_capacity: usize,
    ) -> Self {
        Self {
            backend,
            view,
            speech,
            probe,
            hardware,
            shelf: Mutex::new(NotificationShelf::new(shelf_capacity)),
            stats_interval: stats_interval.max(Duration::from_millis(1)),
            notifications_interval: notifications_interval.max(Duration::from_millis(1)),
        }
    }

    /// Start both loops. Called once at session initialization; the loops
    /// run until the returned handles are dropped or aborted.
    pub fn start(self: &Arc<Self>) -> PollingHandles {
        info!(
            "starting poll loops: stats every {:?}, notifications every {:?}",
            self.stats_interval, self.notifications_interval
        );

        let scheduler = Arc::clone(self);
        let stats = tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.stats_interval);
            loop {
                interval.tick().await;
                let tick = Arc::clone(&scheduler);
                tokio::spawn(async move { tick.stats_tick().await });
            }
        });

        let scheduler = Arc::clone(self);
        let notifications = tokio::spawn(async move {
            let mut interval = tokio::time::interval(scheduler.notifications_interval);
            loop {
                interval.tick().await;
                let tick = Arc::clone(&scheduler);
                tokio::spawn(async move { tick.notifications_tick().await });
            }
        });

        PollingHandles {
            stats,
            notifications,
        }
    }

    /// One stats refresh.
    ///
    /// Exactly one battery source is merged per tick, local taking
    /// precedence when present. On fetch failure the tick is skipped and
    /// displayed values stay put.
    pub async fn stats_tick(&self) {
        let local_battery = if self.probe.has(Capability::Battery) {
            match self.hardware.battery_level().await {
                Ok(percent) => {
                    self.view.update_bar("battery", percent);
                    Some(percent)
                }
                Err(e) => {
                    debug!("local battery read failed: {e}");
                    None
                }
            }
        } else {
            None
        };

        match self.backend.system_stats().await {
            Ok(stats) => {
                self.view.update_bar("cpu", stats.cpu);
                self.view.update_bar("ram", stats.ram);
                if local_battery.is_none() {
                    self.view.update_bar("battery", stats.battery);
                }
            }
            Err(e) => debug!("stats tick skipped: {e}"),
        }
    }

    /// One notification refresh.
    ///
    /// Items are processed in the order the backend returned them. Each new
    /// item lands on the shelf and the view; announcements are gated on the
    /// advisory not-currently-speaking check, and successive announcements
    /// in one tick cancel each other (last-write-wins), so only the final
    /// one is likely to be heard in full.
    pub async fn notifications_tick(&self) {
        let items = match self.backend.notifications().await {
            Ok(items) => items,
            Err(e) => {
                debug!("notification tick skipped: {e}");
                return;
            }
        };

        for item in items {
            self.shelf_guard().push(item.clone());
            self.view.prepend_notification(&item);

            if !self.speech.is_speaking() {
                self.speech.speak(&format!(
                    "Sir, you have a new notification from {}. It says: {}",
                    item.app, item.title
                ));
            }
        }
    }

    /// Point-in-time copy of the notification display list, newest first.
    #[must_use]
    pub fn shelf_snapshot(&self) -> Vec<Notification> {
        self.shelf_guard().items()
    }

    fn shelf_guard(&self) -> MutexGuard<'_, NotificationShelf> {
        self.shelf
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
