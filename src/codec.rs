//! Text encodings for node values
//!
//! Each codec maps one value kind to and from the raw text of a node.
//! No codec trims input or formats with locale rules: `" 42"` is not an
//! integer.

use std::fmt;

use crate::value::PrefValue;

/// The four value kinds a setting can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Boolean,
    Integer,
    Long,
    String,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Long => "long",
            Kind::String => "string",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode/decode strategy for one kind
pub trait Codec: Send + Sync + 'static {
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync;

    const KIND: Kind;

    /// Parse raw node content, `None` when malformed
    fn decode(raw: &str) -> Option<Self::Value>;

    fn encode(value: &Self::Value) -> String;

    /// Text written for an absent value, `None` when the kind has no such encoding
    fn encode_absent() -> Option<String>;

    fn to_pref(value: &Self::Value) -> PrefValue;

    /// Coerce a stored preference into this kind
    fn from_pref(value: &PrefValue) -> Option<Self::Value>;
}

/// `"1"` / `"0"`
#[derive(Debug, Clone, Copy)]
pub struct BoolCodec;

/// 32-bit base-10 integer
#[derive(Debug, Clone, Copy)]
pub struct IntCodec;

/// 64-bit base-10 integer
#[derive(Debug, Clone, Copy)]
pub struct LongCodec;

/// Raw content, unchanged
#[derive(Debug, Clone, Copy)]
pub struct StringCodec;

impl Codec for BoolCodec {
    type Value = bool;

    const KIND: Kind = Kind::Boolean;

    fn decode(raw: &str) -> Option<bool> {
        match raw {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }

    fn encode(value: &bool) -> String {
        String::from(if *value { "1" } else { "0" })
    }

    fn encode_absent() -> Option<String> {
        Some("0".to_string())
    }

    fn to_pref(value: &bool) -> PrefValue {
        PrefValue::Bool(*value)
    }

    fn from_pref(value: &PrefValue) -> Option<bool> {
        match value {
            PrefValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl Codec for IntCodec {
    type Value = i32;

    const KIND: Kind = Kind::Integer;

    fn decode(raw: &str) -> Option<i32> {
        raw.parse().ok()
    }

    fn encode(value: &i32) -> String {
        value.to_string()
    }

    fn encode_absent() -> Option<String> {
        None
    }

    fn to_pref(value: &i32) -> PrefValue {
        PrefValue::Int(*value)
    }

    fn from_pref(value: &PrefValue) -> Option<i32> {
        match value {
            PrefValue::Int(v) => Some(*v),
            PrefValue::Long(v) => i32::try_from(*v).ok(),
            PrefValue::Str(s) => Self::decode(s),
            PrefValue::Bool(_) => None,
        }
    }
}

impl Codec for LongCodec {
    type Value = i64;

    const KIND: Kind = Kind::Long;

    fn decode(raw: &str) -> Option<i64> {
        raw.parse().ok()
    }

    fn encode(value: &i64) -> String {
        value.to_string()
    }

    fn encode_absent() -> Option<String> {
        None
    }

    fn to_pref(value: &i64) -> PrefValue {
        PrefValue::Long(*value)
    }

    fn from_pref(value: &PrefValue) -> Option<i64> {
        match value {
            PrefValue::Long(v) => Some(*v),
            PrefValue::Int(v) => Some(i64::from(*v)),
            PrefValue::Str(s) => Self::decode(s),
            PrefValue::Bool(_) => None,
        }
    }
}

impl Codec for StringCodec {
    type Value = String;

    const KIND: Kind = Kind::String;

    fn decode(raw: &str) -> Option<String> {
        Some(raw.to_string())
    }

    fn encode(value: &String) -> String {
        value.clone()
    }

    fn encode_absent() -> Option<String> {
        Some(String::new())
    }

    fn to_pref(value: &String) -> PrefValue {
        PrefValue::Str(value.clone())
    }

    fn from_pref(value: &PrefValue) -> Option<String> {
        Some(value.to_string())
    }
}
