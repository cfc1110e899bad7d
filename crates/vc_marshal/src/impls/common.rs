//! Helpers shared by the container serializers.
//!
//! These are free functions taking the registry and state explicitly, so
//! any serializer can compose them without inheriting behavior.

use alloc::string::{String, ToString};

use crate::config::DuplicateKeyPolicy;
use crate::dictionary::DictionaryKey;
use crate::error::{MarshallError, MarshallResult};
use crate::object::{Object, ObjectRef};
use crate::registry::SerializerRegistry;
use crate::state::SerializationState;
use crate::wire::{TYPE_HINT_KEY, WireKind, WireMap, WireObject, WireValue};

/// The wire form of a container key.
#[inline]
pub fn coerce_key(key: &DictionaryKey) -> String {
    key.to_string()
}

/// Stores an already marshalled entry, applying the duplicate-key policy.
pub fn put_entry<W: WireObject>(
    state: &SerializationState,
    target: &mut W,
    key: String,
    value: WireValue,
) -> MarshallResult<()> {
    if target.has(&key) {
        match state.duplicate_keys() {
            DuplicateKeyPolicy::Reject => return Err(MarshallError::DuplicateKey { key }),
            DuplicateKeyPolicy::LastWriteWins => {
                log::trace!("duplicate key `{key}` overwritten");
            }
        }
    }
    target.put(key, value);
    Ok(())
}

/// Marshalls a nested value through the registry, tagging failures with `key`.
pub fn marshall_entry(
    registry: &SerializerRegistry,
    state: &mut SerializationState,
    key: &str,
    value: &ObjectRef,
) -> MarshallResult<WireValue> {
    registry
        .marshall(state, value)
        .map_err(|error| error.nested(key))
}

/// Unmarshalls a nested value through the registry, tagging failures with `key`.
pub fn unmarshall_entry(
    registry: &SerializerRegistry,
    state: &mut SerializationState,
    key: &str,
    wire: &WireValue,
) -> MarshallResult<ObjectRef> {
    registry
        .unmarshall(state, None, wire)
        .map_err(|error| error.nested(key))
}

/// Checks the type hint of `obj` against the hints a serializer recognizes.
pub fn check_type_hint<W: WireObject>(obj: &W, accepted: &[&str]) -> MarshallResult<()> {
    match obj.get_str(TYPE_HINT_KEY) {
        None => Err(MarshallError::MissingTypeHint),
        Some(hint) if accepted.contains(&hint) => Ok(()),
        Some(hint) => Err(MarshallError::UnrecognizedTypeHint { hint: hint.into() }),
    }
}

/// Returns the wire object stored under the required `field`.
pub fn required_object<'a>(obj: &'a WireMap, field: &'static str) -> MarshallResult<&'a WireMap> {
    obj.get_object(field)
        .ok_or(MarshallError::MissingRequiredField { field })
}

/// The error for a wire value of the wrong kind.
#[inline]
pub fn mismatched(expected: WireKind, wire: &WireValue) -> MarshallError {
    MarshallError::MismatchedWireKind {
        expected,
        found: WireKind::of(wire),
    }
}

/// The error for a value handed to a serializer that does not accept its type.
#[inline]
pub fn unsupported(value: &dyn Object) -> MarshallError {
    MarshallError::UnsupportedSourceType {
        type_name: value.object_type_name(),
    }
}

// -----------------------------------------------------------------------------
// Tests
