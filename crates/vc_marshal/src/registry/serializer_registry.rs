use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use vc_utils::TypeIdMap;
use vc_utils::hash::HashMap;

use crate::config::MarshallConfig;
use crate::error::{MarshallError, MarshallResult};
use crate::impls::{BooleanSerializer, MapSerializer, NullSerializer};
use crate::impls::{NumberSerializer, StringSerializer};
use crate::object::ObjectRef;
use crate::object_match::ObjectMatch;
use crate::registry::{Serializer, SourceType};
use crate::state::SerializationState;
use crate::wire::{TYPE_HINT_KEY, WireKind, WireObject, WireValue};

// -----------------------------------------------------------------------------
// SerializerRegistration

/// A registered [`Serializer`] with the capabilities it declared.
pub struct SerializerRegistration {
    serializer: Box<dyn Serializer>,
    source_types: Vec<SourceType>,
    wire_kinds: &'static [WireKind],
    type_hints: &'static [&'static str],
}

impl SerializerRegistration {
    fn new(serializer: Box<dyn Serializer>) -> Self {
        Self {
            source_types: serializer.source_types(),
            wire_kinds: serializer.wire_kinds(),
            type_hints: serializer.type_hints(),
            serializer,
        }
    }

    /// The registered serializer.
    #[inline]
    pub fn serializer(&self) -> &dyn Serializer {
        &*self.serializer
    }

    /// In-memory types the serializer accepts.
    #[inline]
    pub fn source_types(&self) -> &[SourceType] {
        &self.source_types
    }

    /// Wire kinds the serializer produces and consumes.
    #[inline]
    pub fn wire_kinds(&self) -> &'static [WireKind] {
        self.wire_kinds
    }

    /// Type hints the serializer recognizes.
    #[inline]
    pub fn type_hints(&self) -> &'static [&'static str] {
        self.type_hints
    }

    #[inline]
    fn accepts(&self, kind: WireKind) -> bool {
        self.wire_kinds.contains(&kind)
    }
}

impl fmt::Debug for SerializerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistration")
            .field("name", &self.serializer.name())
            .field("source_types", &self.source_types)
            .field("wire_kinds", &self.wire_kinds)
            .field("type_hints", &self.type_hints)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SerializerRegistry

/// The dispatch authority holding every [`Serializer`].
///
/// See the [module documentation](crate::registry) for the dispatch rules.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use vc_marshal::{Dictionary, ObjectRef, SerializerRegistry, object};
///
/// let registry = SerializerRegistry::new();
///
/// let dict = Arc::new(Dictionary::new());
/// dict.insert("a", object(1_i64));
/// let value: ObjectRef = dict.clone();
///
/// let wire = registry.to_wire(&value).unwrap();
/// assert_eq!(wire, serde_json::json!({ "typeHint": "Map", "map": { "a": 1 } }));
///
/// let back = registry.from_wire(None, &wire).unwrap();
/// assert_eq!(back.downcast_ref::<Dictionary>(), Some(&*dict));
/// ```
pub struct SerializerRegistry {
    registrations: Vec<SerializerRegistration>,
    by_source: TypeIdMap<Vec<usize>>,
    by_hint: HashMap<&'static str, Vec<usize>>,
    config: MarshallConfig,
}

impl Default for SerializerRegistry {
    /// See [`SerializerRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerRegistry {
    /// Creates a registry without any serializer.
    #[inline]
    pub fn empty() -> Self {
        Self {
            registrations: Vec::new(),
            by_source: TypeIdMap::new(),
            by_hint: HashMap::default(),
            config: MarshallConfig::new(),
        }
    }

    /// Creates a registry with the default serializers, in this order:
    ///
    /// - [`NullSerializer`]: `Null`
    /// - [`BooleanSerializer`]: `bool`
    /// - [`NumberSerializer`]: `i64` `i32` `u64` `f64`
    /// - [`StringSerializer`]: `String` `&'static str`
    /// - [`MapSerializer`]: `Dictionary`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(NullSerializer);
        registry.register(BooleanSerializer);
        registry.register(NumberSerializer);
        registry.register(StringSerializer);
        registry.register(MapSerializer);
        registry
    }

    /// Replaces the config stamped into new [`SerializationState`]s.
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: MarshallConfig) -> Self {
        self.config = config;
        self
    }

    /// The config stamped into new [`SerializationState`]s.
    #[inline]
    pub fn config(&self) -> &MarshallConfig {
        &self.config
    }

    /// Creates a fresh state for one top-level call.
    #[inline]
    pub fn new_state(&self) -> SerializationState {
        SerializationState::new(&self.config)
    }

    /// Registers `serializer` after all existing ones.
    ///
    /// A source type claimed by several serializers is marshalled by the
    /// earliest registered one; a warning is logged for the later ones.
    pub fn register(&mut self, serializer: impl Serializer) {
        self.register_boxed(Box::new(serializer));
    }

    /// Registers an already boxed serializer. See [`register`](Self::register).
    pub fn register_boxed(&mut self, serializer: Box<dyn Serializer>) {
        let registration = SerializerRegistration::new(serializer);
        let slot = self.registrations.len();
        let name = registration.serializer.name();

        for ty in &registration.source_types {
            let slots = self.by_source.get_or_insert(ty.id(), Vec::new);
            if let Some(&first) = slots.first() {
                log::warn!(
                    "serializer `{name}` claims `{}` already handled by `{}`, the earlier one takes precedence",
                    ty.name(),
                    self.registrations[first].serializer.name(),
                );
            }
            slots.push(slot);
        }

        for &hint in registration.type_hints {
            self.by_hint.entry(hint).or_default().push(slot);
        }

        log::debug!(
            "registered serializer `{name}` (sources: {:?}, wire: {:?}, hints: {:?})",
            registration.source_types,
            registration.wire_kinds,
            registration.type_hints,
        );
        self.registrations.push(registration);
    }

    /// Number of registered serializers.
    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no serializer is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registrations in registration order.
    #[inline]
    pub fn registrations(&self) -> impl ExactSizeIterator<Item = &SerializerRegistration> {
        self.registrations.iter()
    }

    /// Whether some serializer converts `source` to the `wire` kind
    /// (any kind when `None`).
    pub fn can_serialize(&self, source: TypeId, wire: Option<WireKind>) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.serializer.can_serialize(source, wire))
    }

    /// The serializer that marshalls values of type `source`.
    pub fn serializer_for(&self, source: TypeId) -> Option<&dyn Serializer> {
        self.registration_for(source).map(SerializerRegistration::serializer)
    }

    fn registration_for(&self, source: TypeId) -> Option<&SerializerRegistration> {
        match self.by_source.get(&source).and_then(|slots| slots.first()) {
            Some(&slot) => self.registrations.get(slot),
            None => None,
        }
    }

    // -------------------------------------------------------------------------
    // Dispatch

    /// Marshalls `value` with the serializer registered for its runtime type.
    ///
    /// # Errors
    ///
    /// - [`UnsupportedSourceType`] if no serializer accepts the type.
    /// - [`CyclicReference`] if `value` is already being marshalled further
    ///   up the stack.
    /// - Whatever the selected serializer reports.
    ///
    /// [`UnsupportedSourceType`]: MarshallError::UnsupportedSourceType
    /// [`CyclicReference`]: MarshallError::CyclicReference
    pub fn marshall(
        &self,
        state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue> {
        let Some(registration) = self.registration_for(value.object_type_id()) else {
            log::trace!("marshall: no serializer for `{}`", value.object_type_name());
            return Err(MarshallError::UnsupportedSourceType {
                type_name: value.object_type_name(),
            });
        };

        state.enter(value)?;
        let output = registration.serializer.marshall(self, state, value);
        state.exit(value);
        output
    }

    /// Rates how well `wire` can be unmarshalled, without building anything.
    ///
    /// Returns the best [`ObjectMatch`] among the candidates, or
    /// [`ObjectMatch::Impossible`] when there is none.
    pub fn try_unmarshall(
        &self,
        state: &mut SerializationState,
        hint: Option<&str>,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch> {
        Ok(match self.select(state, hint, wire)? {
            Some((_, matched)) => matched,
            None => ObjectMatch::Impossible,
        })
    }

    /// Unmarshalls `wire` with the best-ranked candidate serializer.
    ///
    /// With a `hint`, only serializers recognizing that type hint are
    /// candidates; without one, every serializer accepting the wire kind is.
    ///
    /// # Errors
    ///
    /// - [`NoMatchingSerializer`] if every candidate reports
    ///   [`ObjectMatch::Impossible`], or there is no candidate.
    ///   When the value carries a type hint some serializer declares, that
    ///   serializer unmarshalls it anyway and reports its own failure.
    /// - Whatever the selected serializer reports.
    ///
    /// [`NoMatchingSerializer`]: MarshallError::NoMatchingSerializer
    pub fn unmarshall(
        &self,
        state: &mut SerializationState,
        hint: Option<&str>,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef> {
        if let Some((registration, _)) = self.select(state, hint, wire)? {
            return registration.serializer.unmarshall(self, state, wire);
        }

        // A hinted value names its serializer, whose own failure is more
        // precise than `NoMatchingSerializer` and carries the nested key path.
        match self.hinted(hint, wire) {
            Some(registration) => {
                log::trace!(
                    "unmarshall: no possible candidate, `{}` reports the failure",
                    registration.serializer.name(),
                );
                registration.serializer.unmarshall(self, state, wire)
            }
            None => Err(MarshallError::NoMatchingSerializer {
                kind: WireKind::of(wire),
                hint: hint.map(String::from),
            }),
        }
    }

    // First serializer declaring the explicit hint, else the embedded one.
    fn hinted(&self, hint: Option<&str>, wire: &WireValue) -> Option<&SerializerRegistration> {
        let embedded = wire.as_object().and_then(|obj| obj.get_str(TYPE_HINT_KEY));
        let hint = hint.or(embedded)?;
        self.candidates(Some(hint), WireKind::of(wire)).next()
    }

    fn candidates<'a>(
        &'a self,
        hint: Option<&str>,
        kind: WireKind,
    ) -> impl Iterator<Item = &'a SerializerRegistration> {
        let hinted = hint.map(|hint| match self.by_hint.get(hint) {
            Some(slots) => slots.as_slice(),
            None => &[],
        });
        let unhinted = hint.is_none().then_some(self.registrations.as_slice());

        hinted
            .into_iter()
            .flatten()
            .map(move |&slot| &self.registrations[slot])
            .chain(unhinted.into_iter().flatten())
            .filter(move |registration| registration.accepts(kind))
    }

    // Best possible candidate, earliest registered on ties.
    fn select(
        &self,
        state: &mut SerializationState,
        hint: Option<&str>,
        wire: &WireValue,
    ) -> MarshallResult<Option<(&SerializerRegistration, ObjectMatch)>> {
        let mut best: Option<(&SerializerRegistration, ObjectMatch)> = None;

        for registration in self.candidates(hint, WireKind::of(wire)) {
            let matched = registration.serializer.try_unmarshall(self, state, wire)?;
            if !matched.is_possible() {
                continue;
            }
            if best.is_none_or(|(_, current)| matched < current) {
                best = Some((registration, matched));
                if matched == ObjectMatch::Exact {
                    break;
                }
            }
        }

        match best {
            Some((registration, matched)) => log::trace!(
                "unmarshall: `{}` selected for {} wire value ({matched} match)",
                registration.serializer.name(),
                WireKind::of(wire),
            ),
            None => log::trace!(
                "unmarshall: no candidate for {} wire value",
                WireKind::of(wire)
            ),
        }

        Ok(best)
    }

    // -------------------------------------------------------------------------
    // One-shot helpers

    /// Marshalls `value` with a fresh state.
    #[inline]
    pub fn to_wire(&self, value: &ObjectRef) -> MarshallResult<WireValue> {
        self.marshall(&mut self.new_state(), value)
    }

    /// Unmarshalls `wire` with a fresh state.
    #[inline]
    pub fn from_wire(&self, hint: Option<&str>, wire: &WireValue) -> MarshallResult<ObjectRef> {
        self.unmarshall(&mut self.new_state(), hint, wire)
    }

    /// Marshalls `value` to a JSON document.
    pub fn to_json(&self, value: &ObjectRef) -> MarshallResult<String> {
        let wire = self.to_wire(value)?;
        Ok(serde_json::to_string(&wire)?)
    }

    /// Unmarshalls a JSON document.
    ///
    /// # Errors
    ///
    /// [`MalformedDocument`](MarshallError::MalformedDocument) if `text`
    /// is not valid JSON, otherwise as [`unmarshall`](Self::unmarshall).
    pub fn from_json(&self, hint: Option<&str>, text: &str) -> MarshallResult<ObjectRef> {
        let wire: WireValue = serde_json::from_str(text)?;
        self.from_wire(hint, &wire)
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("registrations", &self.registrations)
            .field("config", &self.config)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
