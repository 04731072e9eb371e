//! Setting groups exposed by the phantom key press filter driver

use std::path::Path;
use std::sync::Arc;

use crate::constants::{ids, paths};
use crate::node::NodeStorage;
use crate::property::{BoolProperty, IntProperty};
use crate::registry::Registry;

/// A named group of settings shown and restored together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    HomeKey,
    TouchKeys,
}

impl Group {
    pub const ALL: [Group; 2] = [Group::HomeKey, Group::TouchKeys];

    pub fn name(&self) -> &'static str {
        match self {
            Group::HomeKey => "home-key",
            Group::TouchKeys => "touch-keys",
        }
    }

    /// Fresh registry for this group
    pub fn registry(&self, nodes: Arc<dyn NodeStorage>) -> Registry {
        match self {
            Group::HomeKey => home_key(nodes),
            Group::TouchKeys => touch_keys(nodes),
        }
    }
}

/// Home key press filtering
pub fn home_key(nodes: Arc<dyn NodeStorage>) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(BoolProperty::new(ids::HOMEKEY_FILTER_STATUS, paths::HOMEKEY_FILTER_STATUS, nodes.clone()))
        .register(IntProperty::new(ids::HOMEKEY_ALLOWED_IRQS, paths::HOMEKEY_ALLOWED_IRQS, nodes.clone()))
        .register(IntProperty::new(ids::HOMEKEY_REPORT_WAIT, paths::HOMEKEY_REPORT_WAIT, nodes.clone()))
        .register(IntProperty::new(ids::HOMEKEY_IGNORED_KP, paths::HOMEKEY_IGNORED_KP, nodes).read_only());
    registry
}

/// Touch keys press filtering
pub fn touch_keys(nodes: Arc<dyn NodeStorage>) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(BoolProperty::new(ids::TOUCHKEYS_FILTER_STATUS, paths::TOUCHKEYS_FILTER_STATUS, nodes.clone()))
        .register(IntProperty::new(ids::TOUCHKEYS_INTERRUPT_CHECKS, paths::TOUCHKEYS_INTERRUPT_CHECKS, nodes.clone()))
        .register(IntProperty::new(ids::TOUCHKEYS_FIRSTERR_WAIT, paths::TOUCHKEYS_FIRSTERR_WAIT, nodes.clone()))
        .register(IntProperty::new(ids::TOUCHKEYS_LASTERR_WAIT, paths::TOUCHKEYS_LASTERR_WAIT, nodes.clone()))
        .register(IntProperty::new(ids::TOUCHKEYS_IGNORED_KP, paths::TOUCHKEYS_IGNORED_KP, nodes).read_only());
    registry
}

/// The driver is loaded when its sysfs directory exists
pub fn is_module_supported(nodes: &dyn NodeStorage) -> bool {
    nodes.is_dir(Path::new(paths::MODULE_DIR))
}
