//! The document model seen by the marshalling core.
//!
//! Wire values are plain [`serde_json::Value`]s. Serializers only touch
//! wire objects through the [`WireObject`] capability set, so the core
//! never depends on how the document model stores its keys.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// Aliases

/// A value exchanged across the marshalling boundary.
pub type WireValue = serde_json::Value;

/// A string-keyed wire object.
pub type WireMap = serde_json::Map<String, WireValue>;

/// Reserved key holding the [type hint] of a wire object.
///
/// [type hint]: crate::registry::Serializer::type_hints
pub const TYPE_HINT_KEY: &str = "typeHint";

// -----------------------------------------------------------------------------
// WireObject

/// Minimal capabilities the core requires from a string-keyed wire object.
///
/// # Examples
///
/// ```
/// use vc_marshal::wire::{WireMap, WireObject};
///
/// let mut obj = WireMap::new();
/// obj.put("map".into(), WireMap::new().into());
///
/// assert!(obj.has("map"));
/// assert!(obj.get_object("map").is_some());
/// // `serde_json::Map` has an inherent `keys`, so name the trait explicitly.
/// assert_eq!(WireObject::keys(&obj), ["map"]);
/// ```
pub trait WireObject {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<&WireValue>;

    /// Stores `value` under `key`, returning the previous value.
    fn put(&mut self, key: String, value: WireValue) -> Option<WireValue>;

    /// Whether `key` is present.
    fn has(&self, key: &str) -> bool;

    /// Snapshot of the keys, in no particular order.
    fn keys(&self) -> Vec<&str>;

    /// Returns the string stored under `key`, if it is one.
    #[inline]
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(WireValue::as_str)
    }

    /// Returns the wire object stored under `key`, if it is one.
    #[inline]
    fn get_object(&self, key: &str) -> Option<&WireMap> {
        self.get(key).and_then(WireValue::as_object)
    }
}

impl WireObject for WireMap {
    #[inline]
    fn get(&self, key: &str) -> Option<&WireValue> {
        serde_json::Map::get(self, key)
    }

    #[inline]
    fn put(&mut self, key: String, value: WireValue) -> Option<WireValue> {
        self.insert(key, value)
    }

    #[inline]
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn keys(&self) -> Vec<&str> {
        serde_json::Map::keys(self).map(String::as_str).collect()
    }
}

// -----------------------------------------------------------------------------
// WireKind

/// The shape of a [`WireValue`].
///
/// Serializers declare the kinds they can produce and consume; the registry
/// uses them to narrow the candidates of an unmarshall call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WireKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl WireKind {
    /// The kind of `value`.
    pub const fn of(value: &WireValue) -> Self {
        match value {
            WireValue::Null => Self::Null,
            WireValue::Bool(_) => Self::Bool,
            WireValue::Number(_) => Self::Number,
            WireValue::String(_) => Self::String,
            WireValue::Array(_) => Self::Array,
            WireValue::Object(_) => Self::Object,
        }
    }

    /// Lower-case name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Tests
