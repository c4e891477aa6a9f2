//! Sliding-window abuse guard.
//!
//! Three independent per-user trackers:
//! - inbound text history (capped FIFO) for loop detection
//! - per-button press timestamps for rate limiting
//! - the last outbound message for duplicate suppression
//!
//! Everything is in-memory and synchronous. Expired entries are dropped
//! lazily on write and in bulk by [`AbuseGuard::sweep`]. Every operation has
//! an `_at` form taking the current instant so tests can control time.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use navguard_types::config::GuardConfig;
use navguard_types::user::UserId;

/// `true` when `then` is less than `window` before `now`.
fn within(now: Instant, then: Instant, window: Duration) -> bool {
    now.saturating_duration_since(then) < window
}

/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub messages_removed: usize,
    pub presses_removed: usize,
    pub outbound_removed: usize,
    /// Per-user containers dropped because they became empty.
    pub users_dropped: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.messages_removed + self.presses_removed + self.outbound_removed
    }
}

/// Per-user loop, rate, and duplicate tracking.
pub struct AbuseGuard {
    config: GuardConfig,
    inbound: DashMap<UserId, VecDeque<(String, Instant)>>,
    presses: DashMap<UserId, HashMap<String, VecDeque<Instant>>>,
    outbound: DashMap<UserId, (String, Instant)>,
}

impl AbuseGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            config,
            inbound: DashMap::new(),
            presses: DashMap::new(),
            outbound: DashMap::new(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    // --- Inbound loop detection ---

    pub fn record_message(&self, user_id: &UserId, text: &str) {
        self.record_message_at(user_id, text, Instant::now());
    }

    /// Append to the user's history, evicting the oldest past the cap.
    pub fn record_message_at(&self, user_id: &UserId, text: &str, now: Instant) {
        let mut history = self.inbound.entry(user_id.clone()).or_default();
        history.push_back((text.to_string(), now));
        while history.len() > self.config.history_cap {
            history.pop_front();
        }
    }

    pub fn is_loop(&self, user_id: &UserId, text: &str) -> bool {
        self.is_loop_at(user_id, text, Instant::now())
    }

    /// `true` once `text` appears at least `loop_threshold` times within the
    /// duplicate window.
    pub fn is_loop_at(&self, user_id: &UserId, text: &str, now: Instant) -> bool {
        let window = self.config.duplicate_window();
        let Some(history) = self.inbound.get(user_id) else {
            return false;
        };
        let count = history
            .iter()
            .filter(|(t, at)| t == text && within(now, *at, window))
            .count();
        count >= self.config.loop_threshold
    }

    /// Record the message, then report whether it completes a loop.
    pub fn observe_message(&self, user_id: &UserId, text: &str) -> bool {
        self.observe_message_at(user_id, text, Instant::now())
    }

    pub fn observe_message_at(&self, user_id: &UserId, text: &str, now: Instant) -> bool {
        self.record_message_at(user_id, text, now);
        let looping = self.is_loop_at(user_id, text, now);
        if looping {
            tracing::info!(user_id = %user_id, "repeated message detected, suppressing");
        }
        looping
    }

    // --- Button press rate limiting ---

    pub fn record_press(&self, user_id: &UserId, label: &str) {
        self.record_press_at(user_id, label, Instant::now());
    }

    /// Append a press and drop presses of that label older than the
    /// duplicate window.
    pub fn record_press_at(&self, user_id: &UserId, label: &str, now: Instant) {
        let window = self.config.duplicate_window();
        let mut labels = self.presses.entry(user_id.clone()).or_default();
        let times = labels.entry(label.to_string()).or_default();
        times.push_back(now);
        times.retain(|at| within(now, *at, window));
    }

    pub fn is_rate_limited(&self, user_id: &UserId, label: &str) -> bool {
        self.is_rate_limited_at(user_id, label, Instant::now())
    }

    /// `true` when more than one press of `label` falls within the rate
    /// limit window.
    pub fn is_rate_limited_at(&self, user_id: &UserId, label: &str, now: Instant) -> bool {
        let window = self.config.rate_limit_window();
        self.presses
            .get(user_id)
            .and_then(|labels| {
                labels
                    .get(label)
                    .map(|times| times.iter().filter(|at| within(now, **at, window)).count())
            })
            .is_some_and(|count| count > 1)
    }

    /// Record the press, then report whether it is rate limited.
    pub fn observe_press(&self, user_id: &UserId, label: &str) -> bool {
        self.observe_press_at(user_id, label, Instant::now())
    }

    pub fn observe_press_at(&self, user_id: &UserId, label: &str, now: Instant) -> bool {
        self.record_press_at(user_id, label, now);
        let limited = self.is_rate_limited_at(user_id, label, now);
        if limited {
            tracing::debug!(user_id = %user_id, label = %label, "button press rate limited");
        }
        limited
    }

    // --- Outbound duplicate suppression ---

    pub fn record_outbound(&self, user_id: &UserId, text: &str) {
        self.record_outbound_at(user_id, text, Instant::now());
    }

    /// Overwrite the user's last-sent message.
    pub fn record_outbound_at(&self, user_id: &UserId, text: &str, now: Instant) {
        self.outbound.insert(user_id.clone(), (text.to_string(), now));
    }

    pub fn is_duplicate(&self, user_id: &UserId, text: &str) -> bool {
        self.is_duplicate_at(user_id, text, Instant::now())
    }

    /// `true` only if the same text was the last thing sent to this user,
    /// less than the minimum interval ago.
    pub fn is_duplicate_at(&self, user_id: &UserId, text: &str, now: Instant) -> bool {
        let interval = self.config.outbound_min_interval();
        self.outbound
            .get(user_id)
            .is_some_and(|last| last.0 == text && within(now, last.1, interval))
    }

    /// Check-and-record for an outbound send. Returns `false` when the send
    /// should be suppressed; suppressed sends are not recorded.
    pub fn admit_outbound(&self, user_id: &UserId, text: &str) -> bool {
        self.admit_outbound_at(user_id, text, Instant::now())
    }

    pub fn admit_outbound_at(&self, user_id: &UserId, text: &str, now: Instant) -> bool {
        let interval = self.config.outbound_min_interval();
        match self.outbound.entry(user_id.clone()) {
            Entry::Occupied(mut last) => {
                let (sent, at) = last.get();
                if sent == text && within(now, *at, interval) {
                    tracing::debug!(user_id = %user_id, "duplicate outbound message suppressed");
                    return false;
                }
                last.insert((text.to_string(), now));
            }
            Entry::Vacant(slot) => {
                slot.insert((text.to_string(), now));
            }
        }
        true
    }

    // --- Expiry ---

    pub fn sweep(&self) -> SweepStats {
        self.sweep_at(Instant::now())
    }

    /// Remove entries older than the retention window (twice the duplicate
    /// window) from all three trackers and drop empty per-user containers.
    pub fn sweep_at(&self, now: Instant) -> SweepStats {
        let retention = self.config.retention();
        let mut stats = SweepStats::default();

        self.inbound.retain(|_, history| {
            let before = history.len();
            history.retain(|(_, at)| within(now, *at, retention));
            stats.messages_removed += before - history.len();
            let keep = !history.is_empty();
            if !keep {
                stats.users_dropped += 1;
            }
            keep
        });

        self.presses.retain(|_, labels| {
            labels.retain(|_, times| {
                let before = times.len();
                times.retain(|at| within(now, *at, retention));
                stats.presses_removed += before - times.len();
                !times.is_empty()
            });
            let keep = !labels.is_empty();
            if !keep {
                stats.users_dropped += 1;
            }
            keep
        });

        self.outbound.retain(|_, (_, at)| {
            let keep = within(now, *at, retention);
            if !keep {
                stats.outbound_removed += 1;
                stats.users_dropped += 1;
            }
            keep
        });

        if stats.total() > 0 {
            tracing::debug!(
                messages = stats.messages_removed,
                presses = stats.presses_removed,
                outbound = stats.outbound_removed,
                users_dropped = stats.users_dropped,
                "abuse guard sweep"
            );
        }
        stats
    }

    /// Users with any tracked state.
    pub fn tracked_users(&self) -> usize {
        let mut users: HashSet<UserId> = self.inbound.iter().map(|e| e.key().clone()).collect();
        users.extend(self.presses.iter().map(|e| e.key().clone()));
        users.extend(self.outbound.iter().map(|e| e.key().clone()));
        users.len()
    }
}

impl Default for AbuseGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl std::fmt::Debug for AbuseGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbuseGuard")
            .field("config", &self.config)
            .field("inbound_users", &self.inbound.len())
            .field("press_users", &self.presses.len())
            .field("outbound_users", &self.outbound.len())
            .finish()
    }
}
