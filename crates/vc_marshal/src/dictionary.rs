use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use vc_utils::hash::HashMap;

use crate::object::{ObjectRef, objects_eq};

// -----------------------------------------------------------------------------
// DictionaryKey

/// A key of a [`Dictionary`].
///
/// Keys travel as their string form (see the [`Display`](fmt::Display) impl),
/// so `Int(1)` and `Str("1")` collide once marshalled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DictionaryKey {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl fmt::Display for DictionaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => fmt::Display::fmt(value, f),
            Self::Int(value) => fmt::Display::fmt(value, f),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<&str> for DictionaryKey {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for DictionaryKey {
    #[inline]
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for DictionaryKey {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for DictionaryKey {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// -----------------------------------------------------------------------------
// Dictionary

/// A shared key/value container of arbitrary objects.
///
/// Entries are behind a lock so a dictionary can be filled after it has been
/// shared, including with itself. Iteration order is unspecified.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_marshal::{Dictionary, ObjectRef, object};
///
/// let dict = Arc::new(Dictionary::new());
/// dict.insert("a", object(1_i64));
/// dict.insert(2_i64, object(String::from("two")));
///
/// assert_eq!(dict.len(), 2);
/// assert!(dict.get(&"a".into()).is_some());
///
/// // Dictionaries are objects themselves.
/// let as_object: ObjectRef = dict.clone();
/// assert!(as_object.is::<Dictionary>());
/// ```
#[derive(Default)]
pub struct Dictionary {
    entries: RwLock<HashMap<DictionaryKey, ObjectRef>>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dictionary with room for `capacity` entries.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<DictionaryKey, ObjectRef>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DictionaryKey, ObjectRef>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts `value` under `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<DictionaryKey>, value: ObjectRef) -> Option<ObjectRef> {
        self.write().insert(key.into(), value)
    }

    /// Removes the value under `key`.
    pub fn remove(&self, key: &DictionaryKey) -> Option<ObjectRef> {
        self.write().remove(key)
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: &DictionaryKey) -> Option<ObjectRef> {
        self.read().get(key).cloned()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &DictionaryKey) -> bool {
        self.read().contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A copy of the current entries.
    ///
    /// The lock is released before returning, so callers may recurse into
    /// the values (which can be this very dictionary) freely.
    pub fn entries(&self) -> Vec<(DictionaryKey, ObjectRef)> {
        self.read()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Into<DictionaryKey>> FromIterator<(K, ObjectRef)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, ObjectRef)>>(iter: I) -> Self {
        let dict = Self::new();
        {
            let mut entries = dict.write();
            for (key, value) in iter {
                entries.insert(key.into(), value);
            }
        }
        dict
    }
}

/// Structural equality: same key set, and equal values under every key.
///
/// Comparing a dictionary that contains itself does not terminate.
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        let lhs = self.entries();
        let rhs = other.read();
        lhs.len() == rhs.len()
            && lhs.iter().all(|(key, value)| match rhs.get(key) {
                Some(other) => objects_eq(value, other),
                None => false,
            })
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the keys, a self-containing dictionary would recurse forever.
        let mut keys: Vec<DictionaryKey> = self.read().keys().cloned().collect();
        keys.sort_unstable();
        f.debug_struct("Dictionary").field("keys", &keys).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
