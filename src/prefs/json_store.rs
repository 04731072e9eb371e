use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::{Edits, Listener, PreferenceEditor, PreferenceStore, Subscribers, Subscription};
use crate::value::{PrefMap, PrefValue};

/// Preference store persisted as a JSON object of tagged values
///
/// A missing file reads as an empty store. Commits re-read the file so
/// edits from other processes between `begin_edit` and `commit` survive.
pub struct JsonPreferenceStore {
    path: PathBuf,
    subscribers: Subscribers,
    commit_lock: Mutex<()>,
}

impl JsonPreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subscribers: Subscribers::default(),
            commit_lock: Mutex::new(()),
        }
    }

    /// `$XDG_CONFIG_HOME/pkf-manager/preferences.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::PREFERENCES_FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<PrefMap> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Preference file not found, starting empty");
            return Ok(PrefMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences from {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(PrefMap::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences JSON from {:?}", self.path))
    }

    fn persist(&self, values: &PrefMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create preferences directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(values)
            .context("Failed to serialize preferences to JSON")?;

        // Write beside the target then rename, readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write preferences to {:?}", tmp))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace preferences file {:?}", self.path))?;

        info!(path = %self.path.display(), count = values.len(), "Saved preferences");
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn snapshot(&self) -> Result<PrefMap> {
        self.load()
    }

    fn begin_edit(&self) -> Box<dyn PreferenceEditor + '_> {
        Box::new(JsonEditor {
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

struct JsonEditor<'a> {
    store: &'a JsonPreferenceStore,
    edits: Edits,
}

impl PreferenceEditor for JsonEditor<'_> {
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
        let JsonEditor { store, edits } = *self;

        let (changed, values) = {
            let _guard = store.commit_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let mut values = store.load().context("Failed to load preferences for commit")?;
            let changed = edits.apply_to(&mut values);
            if !changed.is_empty() {
                store.persist(&values)?;
            }
            (changed, values)
        };

        debug!(changed = ?changed, "Committed preferences");
        store.subscribers.notify(&changed, &values);
        Ok(changed)
    }
}
