use anyhow::Result;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Edits, Listener, PreferenceEditor, PreferenceStore, Subscribers, Subscription};
use crate::value::{PrefMap, PrefValue};

/// Preference store that lives only as long as the process
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<PrefMap>,
    subscribers: Subscribers,
    commits: AtomicUsize,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: PrefMap) -> Self {
        Self {
            values: Mutex::new(values),
            ..Self::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<PrefValue> {
        self.lock().get(key).cloned()
    }

    /// Number of commits so far, including empty ones
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PrefMap> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn snapshot(&self) -> Result<PrefMap> {
        Ok(self.lock().clone())
    }

    fn begin_edit(&self) -> Box<dyn PreferenceEditor + '_> {
        Box::new(MemoryEditor {
            store: self,
            edits: Edits::default(),
        })
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.subscribers.subscribe(listener)
    }

    fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.subscribers.unsubscribe(subscription)
    }
}

struct MemoryEditor<'a> {
    store: &'a MemoryPreferenceStore,
    edits: Edits,
}

impl PreferenceEditor for MemoryEditor<'_> {
    fn put_bool(&mut self, key: &str, value: bool) {
        self.edits.put(key, PrefValue::Bool(value));
    }

    fn put_int(&mut self, key: &str, value: i32) {
        self.edits.put(key, PrefValue::Int(value));
    }

    fn put_long(&mut self, key: &str, value: i64) {
        self.edits.put(key, PrefValue::Long(value));
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.edits.put(key, PrefValue::Str(value.to_string()));
    }

    fn remove(&mut self, key: &str) {
        self.edits.remove(key);
    }

    fn commit(self: Box<Self>) -> Result<Vec<String>> {
        let MemoryEditor { store, edits } = *self;
        store.commits.fetch_add(1, Ordering::SeqCst);

        let (changed, values) = {
            let mut values = store.lock();
            let changed = edits.apply_to(&mut values);
            (changed, values.clone())
        };

        store.subscribers.notify(&changed, &values);
        Ok(changed)
    }
}
