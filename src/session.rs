//! Attach/detach binding between a registry and a preference store
//!
//! On attach the store is refreshed from the nodes, then every later change
//! to a preference the registry owns is pushed into its node. Detach releases
//! the subscription; dropping the session detaches it too.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prefs::{PreferenceStore, Subscription};
use crate::registry::{stage, Registry, SyncReport};
use crate::value::PrefValue;

pub struct SettingsSession {
    registry: Arc<Registry>,
    store: Arc<dyn PreferenceStore>,
    subscription: Option<Subscription>,
}

impl SettingsSession {
    /// Reconcile, then start forwarding preference changes to the nodes
    ///
    /// The reconcile commit happens before subscribing, so refreshed values
    /// are not echoed back as if the user had changed them.
    pub fn attach(registry: Arc<Registry>, store: Arc<dyn PreferenceStore>) -> Result<(Self, SyncReport)> {
        let report = registry.reconcile(store.as_ref())?;

        let target = registry.clone();
        let subscription = store.subscribe(Arc::new(move |key: &str, value: Option<&PrefValue>| {
            let Some(value) = value else {
                return;
            };
            if target.contains(key) {
                let written = target.apply_preference(key, value);
                debug!(id = %key, value = %value, written = written, "Applied preference change to node");
            }
        }));

        info!(settings = registry.len(), "Settings session attached");
        Ok((
            Self {
                registry,
                store,
                subscription: Some(subscription),
            },
            report,
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &dyn PreferenceStore {
        self.store.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Store a new value for one setting and make sure its node holds it
    ///
    /// Listeners only hear about keys whose stored value changed, so a node
    /// that disagrees with an unchanged preference is written directly.
    pub fn set_preference(&self, id: &str, value: &PrefValue) -> Result<()> {
        let Some(setting) = self.registry.lookup(id) else {
            bail!("Unknown setting '{}'", id);
        };
        if setting.is_read_only() {
            bail!("Setting '{}' is read-only", id);
        }
        if !setting.is_supported() {
            bail!("Setting '{}' is not supported on this kernel", id);
        }

        let mut editor = self.store.begin_edit();
        stage(editor.as_mut(), id, setting.kind(), value);
        editor.commit().context("Failed to save preference")?;

        if setting.pref_value().as_ref() != Some(value) {
            warn!(id = %id, value = %value, "Node out of sync with stored preference, writing it");
            self.registry.apply_preference(id, value);
        }

        match setting.pref_value() {
            Some(current) if &current == value => Ok(()),
            current => bail!(
                "Preference saved but node for '{}' holds {}",
                id,
                current.map(|v| v.to_string()).unwrap_or_else(|| "no valid value".to_string())
            ),
        }
    }

    /// Stop forwarding changes, safe to call more than once
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.store.unsubscribe(subscription);
            info!("Settings session detached");
        }
    }
}

impl Drop for SettingsSession {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;
    use crate::property::{BoolProperty, IntProperty};
    use crate::testing::MemoryNodes;
    use crate::value::{PrefMap, PrefValue};

    fn setup() -> (Arc<MemoryNodes>, Arc<Registry>) {
        let nodes = Arc::new(MemoryNodes::new());
        nodes.insert("status", "1");
        nodes.insert("wait", "40");
        nodes.insert("kp", "3");

        let mut registry = Registry::new();
        registry
            .register(BoolProperty::new("status", "status", nodes.clone()))
            .register(IntProperty::new("wait", "wait", nodes.clone()))
            .register(IntProperty::new("kp", "kp", nodes.clone()).read_only());
        (nodes, Arc::new(registry))
    }

    #[test]
    fn test_attach_reconciles_without_echo() {
        let (nodes, registry) = setup();
        let mut values = PrefMap::new();
        values.insert("wait".to_string(), PrefValue::Int(10));
        let store = Arc::new(MemoryPreferenceStore::with_values(values));

        let (session, report) = SettingsSession::attach(registry, store.clone()).unwrap();

        assert!(session.is_attached());
        assert_eq!(report.staged, vec!["status".to_string(), "wait".to_string()]);
        assert_eq!(store.get("wait"), Some(PrefValue::Int(40)));
        assert_eq!(store.commits(), 1);
        assert_eq!(nodes.writes(), 0);
    }

    #[test]
    fn test_changes_reach_nodes_while_attached() {
        let (nodes, registry) = setup();
        let store = Arc::new(MemoryPreferenceStore::new());
        let (mut session, _) = SettingsSession::attach(registry, store.clone()).unwrap();

        let mut editor = store.begin_edit();
        editor.put_int("wait", 75);
        editor.put_int("kp", 0);
        editor.put_string("unrelated", "x");
        editor.commit().unwrap();

        assert_eq!(nodes.get("wait").as_deref(), Some("75"));
        assert_eq!(nodes.get("kp").as_deref(), Some("3"));

        session.detach();
        assert!(!session.is_attached());
        assert_eq!(store.subscriber_count(), 0);

        let mut editor = store.begin_edit();
        editor.put_int("wait", 5);
        editor.commit().unwrap();
        assert_eq!(nodes.get("wait").as_deref(), Some("75"));
    }

    #[test]
    fn test_set_preference_rewrites_stale_node() {
        let (nodes, registry) = setup();
        nodes.insert("wait", "\n");
        let mut values = PrefMap::new();
        values.insert("wait".to_string(), PrefValue::Int(40));
        let store = Arc::new(MemoryPreferenceStore::with_values(values));
        let (session, _) = SettingsSession::attach(registry, store.clone()).unwrap();

        session.set_preference("wait", &PrefValue::Int(40)).unwrap();

        assert_eq!(nodes.get("wait").as_deref(), Some("40"));
        assert_eq!(nodes.writes(), 1);
        assert_eq!(store.get("wait"), Some(PrefValue::Int(40)));
    }

    #[test]
    fn test_set_preference_goes_through_listener() {
        let (nodes, registry) = setup();
        let store = Arc::new(MemoryPreferenceStore::new());
        let (session, _) = SettingsSession::attach(registry, store.clone()).unwrap();

        session.set_preference("wait", &PrefValue::Int(90)).unwrap();

        assert_eq!(nodes.get("wait").as_deref(), Some("90"));
        assert_eq!(nodes.writes(), 1);
        assert_eq!(store.get("wait"), Some(PrefValue::Int(90)));
    }

    #[test]
    fn test_set_preference_rejects_read_only_and_unknown() {
        let (nodes, registry) = setup();
        let store = Arc::new(MemoryPreferenceStore::new());
        let (session, _) = SettingsSession::attach(registry, store.clone()).unwrap();

        assert!(session.set_preference("kp", &PrefValue::Int(0)).is_err());
        assert!(session.set_preference("missing", &PrefValue::Int(0)).is_err());
        assert_eq!(nodes.get("kp").as_deref(), Some("3"));
        assert_eq!(store.get("kp"), None);
    }

    #[test]
    fn test_drop_detaches() {
        let (_nodes, registry) = setup();
        let store = Arc::new(MemoryPreferenceStore::new());
        {
            let (_session, _) = SettingsSession::attach(registry, store.clone()).unwrap();
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }
}
