use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::dictionary::Dictionary;
use crate::error::MarshallResult;
use crate::impls::common::{check_type_hint, coerce_key, mismatched, put_entry};
use crate::impls::common::{marshall_entry, required_object, unmarshall_entry, unsupported};
use crate::object::ObjectRef;
use crate::object_match::ObjectMatch;
use crate::registry::{Serializer, SerializerRegistry, SourceType};
use crate::state::SerializationState;
use crate::wire::{TYPE_HINT_KEY, WireKind, WireMap, WireObject, WireValue};

/// The type hint emitted for a [`Dictionary`].
pub const MAP_TYPE_HINT: &str = "Map";

/// Every type hint read back as a [`Dictionary`], the emitted one first.
pub const MAP_TYPE_HINTS: &[&str] = &[MAP_TYPE_HINT, "java.util.Hashtable", "java.util.Dictionary"];

/// The field holding the entries.
pub const MAP_FIELD: &str = "map";

// -----------------------------------------------------------------------------
// MapSerializer

/// Converts a [`Dictionary`] to and from a hinted wire object:
///
/// ```json
/// { "typeHint": "Map", "map": { "<key>": <value>, ... } }
/// ```
///
/// Keys are written in their string form and read back as
/// [`DictionaryKey::Str`](crate::DictionaryKey::Str). Values go through the
/// registry in both directions, so a dictionary holds anything the registry
/// can handle, nested dictionaries included.
///
/// Reading requires the type hint, which must be one of [`MAP_TYPE_HINTS`],
/// and the `map` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct MapSerializer;

impl MapSerializer {
    fn write_entries(
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        dict: &Dictionary,
    ) -> MarshallResult<WireMap> {
        // Sorted, so `LastWriteWins` keeps the same entry on every run.
        let mut entries = dict.entries();
        entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        let mut map = WireMap::new();
        for (key, value) in &entries {
            let key = coerce_key(key);
            let wire = marshall_entry(registry, state, &key, value)?;
            put_entry(state, &mut map, key, wire)?;
        }
        Ok(map)
    }

    fn rank_entries<W: WireObject>(
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        map: &W,
    ) -> MarshallResult<ObjectMatch> {
        let mut matched = ObjectMatch::Exact;
        for key in map.keys() {
            let Some(value) = map.get(key) else {
                continue;
            };
            let nested = registry
                .try_unmarshall(state, None, value)
                .map_err(|error| error.nested(key))?;
            matched = matched.worse_of(nested);
            if !matched.is_possible() {
                break;
            }
        }
        Ok(matched)
    }

    fn build<W: WireObject>(
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        map: &W,
    ) -> MarshallResult<Dictionary> {
        let keys = map.keys();
        let dict = Dictionary::with_capacity(keys.len());
        for key in keys {
            let Some(value) = map.get(key) else {
                continue;
            };
            let value = unmarshall_entry(registry, state, key, value)?;
            dict.insert(key, value);
        }
        Ok(dict)
    }
}

impl Serializer for MapSerializer {
    fn name(&self) -> &'static str {
        "map"
    }

    fn source_types(&self) -> Vec<SourceType> {
        alloc::vec![SourceType::of::<Dictionary>()]
    }

    fn wire_kinds(&self) -> &'static [WireKind] {
        &[WireKind::Object]
    }

    fn type_hints(&self) -> &'static [&'static str] {
        MAP_TYPE_HINTS
    }

    fn marshall(
        &self,
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue> {
        let dict = value
            .downcast_ref::<Dictionary>()
            .ok_or_else(|| unsupported(&**value))?;

        state.descend()?;
        let map = Self::write_entries(registry, state, dict);
        state.ascend();

        let mut obj = WireMap::new();
        if state.emit_type_hints() {
            obj.put(TYPE_HINT_KEY.into(), MAP_TYPE_HINT.into());
        }
        obj.put(MAP_FIELD.into(), map?.into());
        Ok(obj.into())
    }

    fn try_unmarshall(
        &self,
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch> {
        let Some(obj) = wire.as_object() else {
            return Ok(ObjectMatch::Impossible);
        };
        if check_type_hint(obj, MAP_TYPE_HINTS).is_err() {
            return Ok(ObjectMatch::Impossible);
        }
        let Some(map) = obj.get_object(MAP_FIELD) else {
            return Ok(ObjectMatch::Impossible);
        };

        state.descend()?;
        let matched = Self::rank_entries(registry, state, map);
        state.ascend();
        matched
    }

    fn unmarshall(
        &self,
        registry: &SerializerRegistry,
        state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef> {
        let obj = wire
            .as_object()
            .ok_or_else(|| mismatched(WireKind::Object, wire))?;
        check_type_hint(obj, MAP_TYPE_HINTS)?;
        let map = required_object(obj, MAP_FIELD)?;

        state.descend()?;
        let built = Self::build(registry, state, map);
        state.ascend();
        Ok(Arc::new(built?))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::any::TypeId;

    use serde_json::json;

    use super::MapSerializer;
    use crate::config::{DuplicateKeyPolicy, MarshallConfig};
    use crate::dictionary::{Dictionary, DictionaryKey};
    use crate::error::MarshallError;
    use crate::impls::StringSerializer;
    use crate::object::{ObjectRef, object, objects_eq};
    use crate::object_match::ObjectMatch;
    use crate::registry::{Serializer, SerializerRegistry};
    use crate::wire::{WireKind, WireObject, WireValue};

    fn dict<const N: usize>(entries: [(&str, ObjectRef); N]) -> ObjectRef {
        Arc::new(entries.into_iter().collect::<Dictionary>())
    }

    fn try_unmarshall(registry: &SerializerRegistry, wire: &WireValue) -> ObjectMatch {
        MapSerializer
            .try_unmarshall(registry, &mut registry.new_state(), wire)
            .unwrap()
    }

    fn unmarshall_err(registry: &SerializerRegistry, wire: &WireValue) -> MarshallError {
        MapSerializer
            .unmarshall(registry, &mut registry.new_state(), wire)
            .unwrap_err()
    }

    fn round_trip(registry: &SerializerRegistry, value: &ObjectRef) -> ObjectRef {
        let wire = registry.to_wire(value).unwrap();
        registry.from_wire(None, &wire).unwrap()
    }

    #[test]
    fn flat_round_trip() {
        let registry = SerializerRegistry::new();
        let value: ObjectRef = dict([("a", object(1_i64)), ("b", object(2_i64))]);

        let wire = registry.to_wire(&value).unwrap();
        assert!(wire == json!({ "typeHint": "Map", "map": { "a": 1, "b": 2 } }));

        let back = registry.from_wire(None, &wire).unwrap();
        assert!(objects_eq(&value, &back));
        assert!(!Arc::ptr_eq(&value, &back));
    }

    #[test]
    fn empty_round_trip() {
        let registry = SerializerRegistry::new();
        let value: ObjectRef = Arc::new(Dictionary::new());

        let wire = registry.to_wire(&value).unwrap();
        assert!(wire == json!({ "typeHint": "Map", "map": {} }));
        assert!(try_unmarshall(&registry, &wire) == ObjectMatch::Exact);
        assert!(objects_eq(&round_trip(&registry, &value), &value));
    }

    #[test]
    fn nested_round_trip() {
        let registry = SerializerRegistry::new();
        let innermost = dict([("z", object(String::from("deep"))), ("n", object(true))]);
        let inner = dict([("y", innermost), ("k", object(1.5_f64))]);
        let value: ObjectRef = dict([("x", inner), ("w", object(crate::Null))]);

        let wire = registry.to_wire(&value).unwrap();
        assert!(
            wire == json!({
                "typeHint": "Map",
                "map": {
                    "w": null,
                    "x": {
                        "typeHint": "Map",
                        "map": {
                            "k": 1.5,
                            "y": {
                                "typeHint": "Map",
                                "map": { "n": true, "z": "deep" },
                            },
                        },
                    },
                },
            })
        );

        let back = registry.from_wire(None, &wire).unwrap();
        assert!(objects_eq(&value, &back));

        let x = back.downcast_ref::<Dictionary>().unwrap().get(&"x".into()).unwrap();
        assert!(x.is::<Dictionary>());
    }

    #[test]
    fn every_source_type_round_trips() {
        let registry = SerializerRegistry::new();
        let value = dict([
            ("null", object(crate::Null)),
            ("bool", object(true)),
            ("i64", object(-9_i64)),
            ("i32", object(-7_i32)),
            ("u64", object(7_u64)),
            ("u64_max", object(u64::MAX)),
            ("f64", object(0.5_f64)),
            ("string", object(String::from("owned"))),
            ("str", object("static")),
            ("dict", dict([("inner", object(3_i32))])),
        ]);

        let back = round_trip(&registry, &value);
        assert!(objects_eq(&value, &back));

        // Narrow integers come back as `i64`, text as `String`.
        let back = back.downcast_ref::<Dictionary>().unwrap();
        assert!(back.get(&"i32".into()).unwrap().is::<i64>());
        assert!(back.get(&"u64".into()).unwrap().is::<i64>());
        assert!(back.get(&"u64_max".into()).unwrap().is::<u64>());
        assert!(back.get(&"str".into()).unwrap().is::<String>());

        let covered = [
            TypeId::of::<crate::Null>(),
            TypeId::of::<bool>(),
            TypeId::of::<i64>(),
            TypeId::of::<i32>(),
            TypeId::of::<u64>(),
            TypeId::of::<f64>(),
            TypeId::of::<String>(),
            TypeId::of::<&'static str>(),
            TypeId::of::<Dictionary>(),
        ];
        for registration in registry.registrations() {
            for source in registration.source_types() {
                assert!(covered.contains(&source.id()), "`{}` is not covered", source.name());
            }
        }
    }

    #[test]
    fn entries_read_through_wire_object() {
        /// A wire object keeping its entries in a plain list.
        struct Entries(Vec<(String, WireValue)>);

        impl WireObject for Entries {
            fn get(&self, key: &str) -> Option<&WireValue> {
                self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }

            fn put(&mut self, key: String, value: WireValue) -> Option<WireValue> {
                let old = self.0.iter().position(|(k, _)| *k == key).map(|i| self.0.remove(i).1);
                self.0.push((key, value));
                old
            }

            fn has(&self, key: &str) -> bool {
                self.get(key).is_some()
            }

            fn keys(&self) -> Vec<&str> {
                self.0.iter().map(|(k, _)| k.as_str()).collect()
            }
        }

        let registry = SerializerRegistry::new();
        let mut entries = Entries(Vec::new());
        entries.put("a".into(), json!(1));
        entries.put("b".into(), json!("two"));

        let mut state = registry.new_state();
        let matched = MapSerializer::rank_entries(&registry, &mut state, &entries).unwrap();
        assert!(matched == ObjectMatch::Exact);

        let built = MapSerializer::build(&registry, &mut state, &entries).unwrap();
        let expected: Dictionary = [("a", object(1_i64)), ("b", object(String::from("two")))]
            .into_iter()
            .collect();
        assert!(built == expected);

        entries.put("c".into(), json!([]));
        let matched = MapSerializer::rank_entries(&registry, &mut state, &entries).unwrap();
        assert!(matched == ObjectMatch::Impossible);
        let err = MapSerializer::build(&registry, &mut state, &entries).unwrap_err();
        assert!(err.key_path() == ["c"]);
    }

    #[test]
    fn keys_are_coerced() {
        let registry = SerializerRegistry::new();
        let value = Arc::new(Dictionary::new());
        value.insert(1_i64, object(String::from("one")));
        value.insert(false, object(String::from("no")));

        let value: ObjectRef = value;
        let wire = registry.to_wire(&value).unwrap();
        assert!(wire["map"] == json!({ "1": "one", "false": "no" }));

        let back = registry.from_wire(None, &wire).unwrap();
        let back = back.downcast_ref::<Dictionary>().unwrap();
        assert!(back.contains_key(&DictionaryKey::from("1")));
        assert!(!back.contains_key(&DictionaryKey::Int(1)));
    }

    #[test]
    fn duplicate_keys() {
        let value = Arc::new(Dictionary::new());
        value.insert(1_i64, object(String::from("int")));
        value.insert("1", object(String::from("str")));
        let value: ObjectRef = value;

        let err = SerializerRegistry::new().to_wire(&value).unwrap_err();
        assert!(matches!(err, MarshallError::DuplicateKey { key } if key == "1"));

        let config = MarshallConfig::new().with_duplicate_keys(DuplicateKeyPolicy::LastWriteWins);
        let registry = SerializerRegistry::new().with_config(config);
        for _ in 0..4 {
            // `Str` sorts after `Int`.
            let wire = registry.to_wire(&value).unwrap();
            assert!(wire["map"] == json!({ "1": "str" }));
        }
    }

    #[test]
    fn legacy_hints() {
        let registry = SerializerRegistry::new();
        for hint in ["java.util.Hashtable", "java.util.Dictionary"] {
            let wire = json!({ "typeHint": hint, "map": { "a": "b" } });
            assert!(try_unmarshall(&registry, &wire) == ObjectMatch::Exact);

            let back = registry.from_wire(Some(hint), &wire).unwrap();
            let expected: ObjectRef = dict([("a", object(String::from("b")))]);
            assert!(objects_eq(&back, &expected));
        }
    }

    #[test]
    fn hint_enforcement() {
        let registry = SerializerRegistry::new();

        let unknown = json!({ "typeHint": "NotAThing", "map": {} });
        assert!(try_unmarshall(&registry, &unknown) == ObjectMatch::Impossible);
        let err = unmarshall_err(&registry, &unknown);
        assert!(matches!(err, MarshallError::UnrecognizedTypeHint { hint } if hint == "NotAThing"));

        // Through the registry, no candidate is left.
        let err = registry.from_wire(None, &unknown).unwrap_err();
        assert!(matches!(err, MarshallError::NoMatchingSerializer { kind: WireKind::Object, .. }));

        let bare = json!({ "map": {} });
        assert!(try_unmarshall(&registry, &bare) == ObjectMatch::Impossible);
        assert!(matches!(unmarshall_err(&registry, &bare), MarshallError::MissingTypeHint));
    }

    #[test]
    fn required_field_enforcement() {
        let registry = SerializerRegistry::new();

        let missing = json!({ "typeHint": "Map" });
        assert!(try_unmarshall(&registry, &missing) == ObjectMatch::Impossible);
        let err = unmarshall_err(&registry, &missing);
        assert!(matches!(err, MarshallError::MissingRequiredField { field: "map" }));

        let wrong_shape = json!({ "typeHint": "Map", "map": [1, 2] });
        assert!(try_unmarshall(&registry, &wrong_shape) == ObjectMatch::Impossible);
        let err = unmarshall_err(&registry, &wrong_shape);
        assert!(matches!(err, MarshallError::MissingRequiredField { field: "map" }));

        let not_object = json!("Map");
        assert!(try_unmarshall(&registry, &not_object) == ObjectMatch::Impossible);
        let err = unmarshall_err(&registry, &not_object);
        assert!(matches!(
            err,
            MarshallError::MismatchedWireKind {
                expected: WireKind::Object,
                found: WireKind::String
            }
        ));
    }

    #[test]
    fn hints_disabled() {
        let registry = SerializerRegistry::new().with_config(MarshallConfig::new().with_type_hints(false));
        let value: ObjectRef = dict([("a", object(1_i64))]);

        let wire = registry.to_wire(&value).unwrap();
        assert!(wire == json!({ "map": { "a": 1 } }));
        assert!(matches!(unmarshall_err(&registry, &wire), MarshallError::MissingTypeHint));
    }

    #[test]
    fn cycle_rejection() {
        let registry = SerializerRegistry::new();
        let value = Arc::new(Dictionary::new());
        value.insert("a", object(1_i64));
        let this: ObjectRef = value.clone();
        value.insert("self", this);

        let root: ObjectRef = value.clone();
        let err = registry.to_wire(&root).unwrap_err();
        assert!(err.key_path() == ["self"]);
        assert!(matches!(err.root_cause(), MarshallError::CyclicReference { .. }));

        value.remove(&"self".into());
        assert!(registry.to_wire(&root).is_ok());
    }

    #[test]
    fn shared_reference_is_not_a_cycle() {
        let registry = SerializerRegistry::new();
        let shared: ObjectRef = dict([("v", object(7_i64))]);
        let value: ObjectRef = dict([("a", shared.clone()), ("b", shared)]);

        let wire = registry.to_wire(&value).unwrap();
        assert!(wire["map"]["a"] == wire["map"]["b"]);
    }

    #[test]
    fn nested_failure_path() {
        #[derive(Debug, PartialEq)]
        struct Opaque;

        let registry = SerializerRegistry::new();
        let inner = dict([("bad", object(Opaque))]);
        let value: ObjectRef = dict([("outer", inner)]);

        let err = registry.to_wire(&value).unwrap_err();
        assert!(err.key_path() == ["outer", "bad"]);
        assert!(matches!(err.root_cause(), MarshallError::UnsupportedSourceType { .. }));

        let flat = json!({ "typeHint": "Map", "map": { "y": [] } });
        let err = unmarshall_err(&registry, &flat);
        assert!(err.key_path() == ["y"]);
        assert!(matches!(err.root_cause(), MarshallError::NoMatchingSerializer { kind: WireKind::Array, .. }));

        // The nested map is ranked impossible as a whole, its failure still
        // names the inner key.
        let nested = json!({ "typeHint": "Map", "map": { "x": { "typeHint": "Map", "map": { "y": [] } } } });
        let err = unmarshall_err(&registry, &nested);
        assert!(err.key_path() == ["x", "y"]);
        assert!(matches!(err.root_cause(), MarshallError::NoMatchingSerializer { kind: WireKind::Array, .. }));

        let err = registry.from_wire(None, &nested).unwrap_err();
        assert!(err.key_path() == ["x", "y"]);

        let misnamed = json!({ "typeHint": "Map", "map": { "x": { "typeHint": "Map" } } });
        let err = registry.from_wire(None, &misnamed).unwrap_err();
        assert!(err.key_path() == ["x"]);
        assert!(matches!(err.root_cause(), MarshallError::MissingRequiredField { field: "map" }));
    }

    #[test]
    fn confidence_is_worst_of_entries() {
        let registry = SerializerRegistry::new();

        // "true" is only coercible to a boolean, but exactly a string.
        let exact = json!({ "typeHint": "Map", "map": { "a": 1, "b": "true", "c": null } });
        assert!(try_unmarshall(&registry, &exact) == ObjectMatch::Exact);

        let impossible = json!({ "typeHint": "Map", "map": { "a": 1, "b": [] } });
        assert!(try_unmarshall(&registry, &impossible) == ObjectMatch::Impossible);

        // A degraded nested map degrades the outer one.
        let mut only_strings = SerializerRegistry::empty();
        only_strings.register(StringSerializer);
        only_strings.register(MapSerializer);

        let nested = json!({ "typeHint": "Map", "map": { "inner": { "typeHint": "Map", "map": { "n": 1 } } } });
        assert!(try_unmarshall(&only_strings, &nested) == ObjectMatch::Approximate);
    }

    #[test]
    fn degraded_match_still_unmarshalls() {
        let mut registry = SerializerRegistry::empty();
        registry.register(StringSerializer);
        registry.register(MapSerializer);

        let wire = json!({ "typeHint": "Map", "map": { "k": 42 } });
        let matched = registry
            .try_unmarshall(&mut registry.new_state(), None, &wire)
            .unwrap();
        assert!(matched == ObjectMatch::Approximate);

        let back = registry.from_wire(None, &wire).unwrap();
        let expected: ObjectRef = dict([("k", object(String::from("42")))]);
        assert!(objects_eq(&back, &expected));
    }

    #[test]
    fn depth_limit() {
        let registry = SerializerRegistry::new().with_config(MarshallConfig::new().with_max_depth(2));

        let two: ObjectRef = dict([("a", dict([("b", object(1_i64))]))]);
        let wire = registry.to_wire(&two).unwrap();
        assert!(objects_eq(&registry.from_wire(None, &wire).unwrap(), &two));

        let three: ObjectRef = dict([("a", dict([("b", dict([]))]))]);
        let err = registry.to_wire(&three).unwrap_err();
        assert!(matches!(err.root_cause(), MarshallError::DepthLimitExceeded { limit: 2 }));

        let deep = SerializerRegistry::new().to_wire(&three).unwrap();
        let err = registry
            .try_unmarshall(&mut registry.new_state(), None, &deep)
            .unwrap_err();
        assert!(matches!(err.root_cause(), MarshallError::DepthLimitExceeded { limit: 2 }));
    }
}
