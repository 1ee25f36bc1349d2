//! In-memory map from user id to remote thread id.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use crate::types::UserId;

/// Maps each user to their active remote thread id.
///
/// Invariant: at most one thread id per user. `insert_if_absent` enforces
/// this under concurrent first messages — the losing thread id is discarded
/// and goes unreferenced on the remote side, same as after a reset.
pub struct SessionStore {
    threads: Mutex<HashMap<UserId, String>>,
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        SessionStore {
            threads: Mutex::new(HashMap::new()),
        }
    }

    /// The thread id currently associated with `user_id`, if any.
    pub fn get(&self, user_id: UserId) -> Option<String> {
        self.threads.lock().unwrap().get(&user_id).cloned()
    }

    /// Associate `thread_id` with `user_id` unless a mapping already exists.
    ///
    /// Returns the winning thread id: the existing one if this call lost a
    /// race with a concurrent create, otherwise `thread_id` itself.
    pub fn insert_if_absent(&self, user_id: UserId, thread_id: String) -> String {
        let mut threads = self.threads.lock().unwrap();
        threads.entry(user_id).or_insert(thread_id).clone()
    }

    /// Remove the mapping for `user_id`. Idempotent.
    ///
    /// Returns whether a mapping existed. The remote thread is not deleted;
    /// it simply becomes unreferenced.
    pub fn reset(&self, user_id: UserId) -> bool {
        let removed = self.threads.lock().unwrap().remove(&user_id);
        if let Some(ref thread_id) = removed {
            debug!(user_id, thread_id = %thread_id, "session reset");
        }
        removed.is_some()
    }

    /// Number of users with an active session.
    pub fn len(&self) -> usize {
        self.threads.lock().unwrap().len()
    }

    /// Whether no user has an active session.
    pub fn is_empty(&self) -> bool {
        self.threads.lock().unwrap().is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new()
    }
}
