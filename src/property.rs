//! Typed settings bound to a single node
//!
//! A property never caches: every read and write goes to the node.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::codec::{BoolCodec, Codec, IntCodec, Kind, LongCodec, StringCodec};
use crate::node::NodeStorage;
use crate::value::PrefValue;

pub type BoolProperty = Property<BoolCodec>;
pub type IntProperty = Property<IntCodec>;
pub type LongProperty = Property<LongCodec>;
pub type StringProperty = Property<StringCodec>;

/// One named setting stored in a node, typed by its codec
pub struct Property<C: Codec> {
    id: String,
    location: PathBuf,
    read_only: bool,
    default_value: Option<C::Value>,
    nodes: Arc<dyn NodeStorage>,
    _codec: PhantomData<C>,
}

impl<C: Codec> Property<C> {
    pub fn new(id: impl Into<String>, location: impl Into<PathBuf>, nodes: Arc<dyn NodeStorage>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            read_only: false,
            default_value: None,
            nodes,
            _codec: PhantomData,
        }
    }

    /// Mark the property as observe-only, all writes become no-ops
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Default for consumers to fall back on, never written to the node
    pub fn with_default(mut self, value: C::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn kind(&self) -> Kind {
        C::KIND
    }

    /// Re-checked on every call
    pub fn is_supported(&self) -> bool {
        self.nodes.exists(&self.location)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn default_value(&self) -> Option<&C::Value> {
        self.default_value.as_ref()
    }

    /// Current node value, `None` when unsupported, unreadable or malformed
    pub fn get_value(&self) -> Option<C::Value> {
        if !self.is_supported() {
            return None;
        }

        let raw = self.nodes.read(&self.location).ok()?;
        let value = C::decode(&raw);
        if value.is_none() {
            warn!(id = %self.id, kind = %C::KIND, raw = %raw, "Malformed node content");
        }
        value
    }

    /// Write a value, returns whether it reached the node
    pub fn set_value(&self, value: &C::Value) -> bool {
        self.store_raw(&C::encode(value))
    }

    /// Write the kind's absent encoding, fails for kinds that have none
    pub fn clear(&self) -> bool {
        match C::encode_absent() {
            Some(raw) => self.store_raw(&raw),
            None => {
                warn!(id = %self.id, kind = %C::KIND, "Kind has no absent encoding, not writing");
                false
            }
        }
    }

    fn store_raw(&self, raw: &str) -> bool {
        if self.read_only {
            debug!(id = %self.id, "Skipping write to read-only property");
            return false;
        }
        if !self.is_supported() {
            debug!(id = %self.id, location = %self.location.display(), "Skipping write to unsupported property");
            return false;
        }

        self.nodes.write(&self.location, raw).is_ok()
    }
}

impl<C: Codec> fmt::Debug for Property<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("kind", &C::KIND)
            .field("location", &self.location)
            .field("read_only", &self.read_only)
            .field("default_value", &self.default_value)
            .finish()
    }
}

/// Kind-erased view of a property used by the registry
pub trait Setting: Send + Sync {
    fn id(&self) -> &str;
    fn kind(&self) -> Kind;
    fn location(&self) -> &Path;
    fn is_supported(&self) -> bool;
    fn is_read_only(&self) -> bool;

    /// Current node value as a preference value
    fn pref_value(&self) -> Option<PrefValue>;

    fn default_pref_value(&self) -> Option<PrefValue>;

    /// Coerce a preference value to this kind and write it
    fn apply_pref(&self, value: &PrefValue) -> bool;
}

impl<C: Codec> Setting for Property<C> {
    fn id(&self) -> &str {
        Property::id(self)
    }

    fn kind(&self) -> Kind {
        C::KIND
    }

    fn location(&self) -> &Path {
        Property::location(self)
    }

    fn is_supported(&self) -> bool {
        Property::is_supported(self)
    }

    fn is_read_only(&self) -> bool {
        Property::is_read_only(self)
    }

    fn pref_value(&self) -> Option<PrefValue> {
        self.get_value().as_ref().map(C::to_pref)
    }

    fn default_pref_value(&self) -> Option<PrefValue> {
        self.default_value.as_ref().map(C::to_pref)
    }

    fn apply_pref(&self, value: &PrefValue) -> bool {
        match C::from_pref(value) {
            Some(typed) => self.set_value(&typed),
            None => {
                warn!(id = %self.id, kind = %C::KIND, value = ?value, "Preference value does not fit property kind");
                false
            }
        }
    }
}
