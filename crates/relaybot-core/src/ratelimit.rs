//! Per-user rate limiter — a fixed cooldown window between accepted messages.
//!
//! One entry per user holding the instant of the last *accepted* message.
//! A rejected message does not touch the stored instant, so it cannot push
//! the cooldown window forward. Entries are never expired; the map grows for
//! the lifetime of the process.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::UserId;

/// Default minimum gap between two accepted messages from the same user.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(1);

/// Tracks the last accepted-message instant per user.
///
/// Thread-safe via a `Mutex`; the critical section is a single map lookup.
pub struct RateLimiter {
    cooldown: Duration,
    last_sent: Mutex<HashMap<UserId, Instant>>,
}

impl RateLimiter {
    /// Create a rate limiter with the given cooldown window.
    pub fn new(cooldown: Duration) -> Self {
        RateLimiter {
            cooldown,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether a message from `user_id` arriving now is accepted.
    pub fn allow(&self, user_id: UserId) -> bool {
        self.allow_at(user_id, Instant::now())
    }

    /// Check whether a message from `user_id` arriving at `now` is accepted.
    ///
    /// Accepting records `now` as the user's last-sent instant. Rejecting
    /// leaves the stored instant untouched.
    pub fn allow_at(&self, user_id: UserId, now: Instant) -> bool {
        let mut last_sent = self.last_sent.lock().unwrap();
        if let Some(&last) = last_sent.get(&user_id) {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        last_sent.insert(user_id, now);
        true
    }

    /// Number of users with a recorded last-sent instant.
    pub fn tracked_users(&self) -> usize {
        self.last_sent.lock().unwrap().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new(DEFAULT_COOLDOWN)
    }
}
