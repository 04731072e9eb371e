//! Typed settings backed by driver text nodes, kept in sync with a
//! persistent preference store.

#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod constants;
pub mod groups;
pub mod node;
pub mod prefs;
pub mod property;
pub mod registry;
pub mod session;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::{BoolCodec, Codec, IntCodec, Kind, LongCodec, StringCodec};
pub use node::{NodeStorage, SysfsNodes};
pub use prefs::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceEditor, PreferenceStore};
pub use property::{BoolProperty, IntProperty, LongProperty, Property, Setting, StringProperty};
pub use registry::{Registry, SyncReport};
pub use session::SettingsSession;
pub use value::{PrefMap, PrefValue};
