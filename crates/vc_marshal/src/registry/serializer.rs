use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::error::MarshallResult;
use crate::object::{Object, ObjectRef};
use crate::object_match::ObjectMatch;
use crate::registry::SerializerRegistry;
use crate::state::SerializationState;
use crate::wire::{WireKind, WireValue};

// -----------------------------------------------------------------------------
// SourceType

/// A statically declared in-memory type a [`Serializer`] accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceType {
    id: TypeId,
    name: &'static str,
}

impl SourceType {
    /// The source type of `T`.
    #[inline]
    pub fn of<T: Object>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the type.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// The name of the type.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// -----------------------------------------------------------------------------
// Serializer

/// A bidirectional converter between some in-memory types and wire values.
///
/// Serializers are stateless: the same instance serves concurrent top-level
/// calls, and everything mutable lives in the [`SerializationState`] passed
/// to each method. Nested values are never converted directly; they go back
/// through the [`SerializerRegistry`], so a container serializer handles
/// whatever the registry can handle.
///
/// The capability descriptors ([`source_types`], [`wire_kinds`],
/// [`type_hints`]) are read once when the serializer is registered.
///
/// ## Unmarshalling in two phases
///
/// - [`try_unmarshall`] is a side-effect free check. It reports how well the
///   wire value fits as an [`ObjectMatch`] and degrades to
///   [`ObjectMatch::Impossible`] on structural mismatch instead of failing.
///   Errors are reserved for input that cannot be read at all.
/// - [`unmarshall`] builds the value. It is only called on the candidate
///   the registry selected, and fails hard on the same mismatches.
///
/// [`source_types`]: Serializer::source_types
/// [`wire_kinds`]: Serializer::wire_kinds
/// [`type_hints`]: Serializer::type_hints
/// [`try_unmarshall`]: Serializer::try_unmarshall
/// [`unmarshall`]: Serializer::unmarshall
pub trait Serializer: Send + Sync + 'static {
    /// A short name, for diagnostics.
    fn name(&self) -> &'static str;

    /// In-memory types this serializer marshalls.
    fn source_types(&self) -> Vec<SourceType>;

    /// Wire kinds this serializer produces and consumes.
    fn wire_kinds(&self) -> &'static [WireKind];

    /// The finite list of type hints this serializer recognizes.
    ///
    /// Empty for serializers whose wire form carries no hint.
    fn type_hints(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether this serializer converts `source` to the `wire` kind
    /// (any kind when `None`).
    fn can_serialize(&self, source: TypeId, wire: Option<WireKind>) -> bool {
        wire.is_none_or(|kind| self.wire_kinds().contains(&kind))
            && self.source_types().iter().any(|ty| ty.id() == source)
    }

    /// Converts `value` to its wire form.
    fn marshall(
        &self,
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue>;

    /// Rates how well `wire` can be rebuilt, without building anything.
    fn try_unmarshall(
        &self,
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch>;

    /// Rebuilds an in-memory value from `wire`.
    fn unmarshall(
        &self,
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef>;
}
