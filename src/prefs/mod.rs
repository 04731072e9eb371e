//! Persistent key-value preference store
//!
//! Two implementations:
//! - **json_store**: JsonPreferenceStore backed by a JSON file in the user's config dir
//! - **memory**: MemoryPreferenceStore kept in memory, counts commits

mod json_store;
mod memory;

pub use json_store::JsonPreferenceStore;
pub use memory::MemoryPreferenceStore;

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use crate::value::{PrefMap, PrefValue};

/// Change callback, receives the key and its new value (`None` when removed)
pub type Listener = Arc<dyn Fn(&str, Option<&PrefValue>) + Send + Sync>;

/// Handle returned by `subscribe`, pass it back to `unsubscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Store of named typed values that outlives the process
pub trait PreferenceStore: Send + Sync {
    /// All current values in one read
    fn snapshot(&self) -> Result<PrefMap>;

    /// Start a batch of edits, nothing is visible until `commit`
    fn begin_edit(&self) -> Box<dyn PreferenceEditor + '_>;

    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Returns false if the subscription was already released
    fn unsubscribe(&self, subscription: Subscription) -> bool;
}

/// Batch of staged edits
pub trait PreferenceEditor {
    fn put_bool(&mut self, key: &str, value: bool);
    fn put_int(&mut self, key: &str, value: i32);
    fn put_long(&mut self, key: &str, value: i64);
    fn put_string(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);

    /// Apply all staged edits at once, returns the keys whose value changed
    fn commit(self: Box<Self>) -> Result<Vec<String>>;
}

/// Staged edits, `None` marks a removal
#[derive(Debug, Default)]
pub(crate) struct Edits {
    staged: BTreeMap<String, Option<PrefValue>>,
}

impl Edits {
    pub(crate) fn put(&mut self, key: &str, value: PrefValue) {
        self.staged.insert(key.to_string(), Some(value));
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.staged.insert(key.to_string(), None);
    }

    /// Apply onto `values`, returning the keys that actually changed
    pub(crate) fn apply_to(self, values: &mut PrefMap) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, edit) in self.staged {
            let differs = match &edit {
                Some(value) => values.get(&key) != Some(value),
                None => values.contains_key(&key),
            };
            if !differs {
                continue;
            }
            match edit {
                Some(value) => values.insert(key.clone(), value),
                None => values.remove(&key),
            };
            changed.push(key);
        }
        changed
    }
}

/// Explicit listener list, entries live until unsubscribed
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, listener));
        debug!(subscription = id, "Preference listener subscribed");
        Subscription(id)
    }

    pub(crate) fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription.0);
        let removed = listeners.len() != before;
        if removed {
            debug!(subscription = subscription.0, "Preference listener unsubscribed");
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Call every listener once per changed key, outside the lock
    pub(crate) fn notify(&self, changed: &[String], values: &PrefMap) {
        let listeners: Vec<Listener> = self.lock().iter().map(|(_, l)| l.clone()).collect();
        for key in changed {
            let value = values.get(key);
            for listener in &listeners {
                listener(key, value);
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(|poisoned| {
            error!("Preference listener list was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
