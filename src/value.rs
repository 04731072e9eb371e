//! Typed values held by the preference store

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::codec::Kind;

/// A single preference value
///
/// Serialized with an explicit kind tag, so a 32-bit integer and a 64-bit
/// integer with the same numeric value stay distinct on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PrefValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    #[serde(rename = "string")]
    Str(String),
}

/// Bulk snapshot of the preference store
pub type PrefMap = BTreeMap<String, PrefValue>;

impl PrefValue {
    /// Parse user input for a setting of the given kind
    ///
    /// Booleans accept `1`/`0` as well as `true`/`false`.
    pub fn parse(kind: Kind, input: &str) -> Result<Self> {
        Ok(match kind {
            Kind::Boolean => match input {
                "1" | "true" => PrefValue::Bool(true),
                "0" | "false" => PrefValue::Bool(false),
                _ => bail!("'{}' is not a boolean (expected 1, 0, true or false)", input),
            },
            Kind::Integer => PrefValue::Int(
                input.parse::<i32>().with_context(|| format!("'{}' is not a 32-bit integer", input))?,
            ),
            Kind::Long => PrefValue::Long(
                input.parse::<i64>().with_context(|| format!("'{}' is not a 64-bit integer", input))?,
            ),
            Kind::String => PrefValue::Str(input.to_string()),
        })
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(v) => write!(f, "{v}"),
            PrefValue::Int(v) => write!(f, "{v}"),
            PrefValue::Long(v) => write!(f, "{v}"),
            PrefValue::Str(v) => f.write_str(v),
        }
    }
}
