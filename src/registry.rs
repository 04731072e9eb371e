//! Keyed set of settings and the two sync directions
//!
//! - **restore**: preference store -> nodes (driver was reset, reapply the user's choices)
//! - **reconcile**: nodes -> preference store (nodes changed behind our back, refresh the store)
//!
//! Read-only settings are observed but never written by either direction.

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::codec::{BoolCodec, Codec, IntCodec, Kind, LongCodec};
use crate::prefs::{PreferenceEditor, PreferenceStore};
use crate::property::Setting;
use crate::value::PrefValue;

/// Outcome of one sync pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Node writes that succeeded (restore)
    pub applied: Vec<String>,
    /// Settings left alone: no preference, no node value, or already equal
    pub skipped: Vec<String>,
    /// Node writes or coercions that failed (restore)
    pub failed: Vec<String>,
    /// Preference updates written in the single commit (reconcile)
    pub staged: Vec<String>,
    pub committed: bool,
}

/// Settings of one logical group, keyed by id
#[derive(Default)]
pub struct Registry {
    settings: HashMap<String, Box<dyn Setting>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keyed by the setting's id, replacing any previous entry
    pub fn register(&mut self, setting: impl Setting + 'static) -> &mut Self {
        let id = setting.id().to_string();
        if self.settings.insert(id.clone(), Box::new(setting)).is_some() {
            debug!(id = %id, "Replaced registered setting");
        }
        self
    }

    pub fn lookup(&self, id: &str) -> Option<&dyn Setting> {
        self.settings.get(id).map(|s| s.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.settings.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.settings.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Write each writable setting's stored preference into its node
    ///
    /// One bulk snapshot read; settings without a preference keep their node untouched.
    /// No rollback: writes already made stay if a later one fails.
    pub fn restore(&self, store: &dyn PreferenceStore) -> Result<SyncReport> {
        let prefs = store.snapshot().context("Failed to read preferences for restore")?;
        let mut report = SyncReport::default();

        for id in self.ids() {
            let setting = &self.settings[id];
            if setting.is_read_only() {
                continue;
            }

            let Some(value) = prefs.get(id) else {
                report.skipped.push(id.to_string());
                continue;
            };

            if !setting.is_supported() {
                debug!(id = %id, location = %setting.location().display(), "Setting not supported, skipping restore");
                report.skipped.push(id.to_string());
                continue;
            }

            if setting.apply_pref(value) {
                debug!(id = %id, value = %value, "Restored setting");
                report.applied.push(id.to_string());
            } else {
                warn!(id = %id, value = %value, "Failed to restore setting");
                report.failed.push(id.to_string());
            }
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Restore finished"
        );
        Ok(report)
    }

    /// Copy node values that differ from the store into it, in a single commit
    ///
    /// The commit runs exactly once per call, even when nothing was staged.
    pub fn reconcile(&self, store: &dyn PreferenceStore) -> Result<SyncReport> {
        let prefs = store.snapshot().context("Failed to read preferences for reconcile")?;
        let mut editor = store.begin_edit();
        let mut report = SyncReport::default();

        for id in self.ids() {
            let setting = &self.settings[id];
            if setting.is_read_only() {
                continue;
            }

            match setting.pref_value() {
                Some(current) if prefs.get(id) != Some(&current) => {
                    debug!(id = %id, node = %current, stored = ?prefs.get(id), "Staging preference update");
                    stage(editor.as_mut(), id, setting.kind(), &current);
                    report.staged.push(id.to_string());
                }
                _ => report.skipped.push(id.to_string()),
            }
        }

        editor.commit().context("Failed to commit reconciled preferences")?;
        report.committed = true;

        info!(staged = report.staged.len(), skipped = report.skipped.len(), "Reconcile finished");
        Ok(report)
    }

    /// Push one changed preference into its node, false when not ours or not written
    pub fn apply_preference(&self, id: &str, value: &PrefValue) -> bool {
        match self.settings.get(id) {
            Some(setting) if !setting.is_read_only() => setting.apply_pref(value),
            _ => false,
        }
    }
}

/// Pick the editor setter by the setting's kind, never by the value's shape
pub fn stage(editor: &mut dyn PreferenceEditor, id: &str, kind: Kind, value: &PrefValue) {
    match kind {
        Kind::Boolean => {
            if let Some(v) = BoolCodec::from_pref(value) {
                editor.put_bool(id, v);
            }
        }
        Kind::Integer => {
            if let Some(v) = IntCodec::from_pref(value) {
                editor.put_int(id, v);
            }
        }
        Kind::Long => {
            if let Some(v) = LongCodec::from_pref(value) {
                editor.put_long(id, v);
            }
        }
        Kind::String => editor.put_string(id, &value.to_string()),
    }
}
