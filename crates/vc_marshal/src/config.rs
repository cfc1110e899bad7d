use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// DuplicateKeyPolicy

/// What a container serializer does when two keys coerce to the same
/// wire key, e.g. `Int(1)` and `Str("1")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Fail with [`MarshallError::DuplicateKey`](crate::MarshallError::DuplicateKey).
    #[default]
    Reject,
    /// Keep the entry visited last. Entries are visited in key order,
    /// so the greatest [`DictionaryKey`](crate::DictionaryKey) wins.
    LastWriteWins,
}

// -----------------------------------------------------------------------------
// MarshallConfig

/// Settings stamped into every [`SerializationState`] a registry creates.
///
/// All fields have defaults, so a host configuration file only needs to
/// name what it changes.
///
/// # Examples
///
/// ```
/// use vc_marshal::{DuplicateKeyPolicy, MarshallConfig};
///
/// let config: MarshallConfig =
///     serde_json::from_str(r#"{ "emit_type_hints": false }"#).unwrap();
///
/// assert!(!config.emit_type_hints);
/// assert_eq!(config.max_depth, 128);
/// assert_eq!(config.duplicate_keys, DuplicateKeyPolicy::Reject);
/// ```
///
/// [`SerializationState`]: crate::SerializationState
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshallConfig {
    /// Embed type hints into marshalled wire objects.
    pub emit_type_hints: bool,
    /// Maximum nesting of containers in either direction.
    pub max_depth: usize,
    /// Handling of keys that collide after coercion.
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl MarshallConfig {
    /// Default nesting limit, the same as `serde_json`'s recursion limit.
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    /// Creates the default config.
    #[inline]
    pub const fn new() -> Self {
        Self {
            emit_type_hints: true,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            duplicate_keys: DuplicateKeyPolicy::Reject,
        }
    }

    /// Sets [`emit_type_hints`](Self::emit_type_hints).
    #[inline]
    #[must_use]
    pub const fn with_type_hints(mut self, emit: bool) -> Self {
        self.emit_type_hints = emit;
        self
    }

    /// Sets [`max_depth`](Self::max_depth).
    #[inline]
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets [`duplicate_keys`](Self::duplicate_keys).
    #[inline]
    #[must_use]
    pub const fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

impl Default for MarshallConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests
