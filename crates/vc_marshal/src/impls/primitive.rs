use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::Number;

use crate::error::{MarshallError, MarshallResult};
use crate::impls::common::{mismatched, unsupported};
use crate::object::{Null, ObjectRef, object};
use crate::object_match::ObjectMatch;
use crate::registry::{Serializer, SerializerRegistry, SourceType};
use crate::state::SerializationState;
use crate::wire::{WireKind, WireValue};

// -----------------------------------------------------------------------------
// NullSerializer

/// Converts [`Null`] to and from the wire `null`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSerializer;

impl Serializer for NullSerializer {
    fn name(&self) -> &'static str {
        "null"
    }

    fn source_types(&self) -> Vec<SourceType> {
        alloc::vec![SourceType::of::<Null>()]
    }

    fn wire_kinds(&self) -> &'static [WireKind] {
        &[WireKind::Null]
    }

    fn marshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue> {
        if value.is::<Null>() {
            Ok(WireValue::Null)
        } else {
            Err(unsupported(&**value))
        }
    }

    fn try_unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch> {
        Ok(if wire.is_null() {
            ObjectMatch::Exact
        } else {
            ObjectMatch::Impossible
        })
    }

    fn unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef> {
        if wire.is_null() {
            Ok(object(Null))
        } else {
            Err(mismatched(WireKind::Null, wire))
        }
    }
}

// -----------------------------------------------------------------------------
// BooleanSerializer

/// Converts `bool`.
///
/// The strings `"true"` and `"false"` are read back as a
/// [coercible](ObjectMatch::Coercible) match.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanSerializer;

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl Serializer for BooleanSerializer {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn source_types(&self) -> Vec<SourceType> {
        alloc::vec![SourceType::of::<bool>()]
    }

    fn wire_kinds(&self) -> &'static [WireKind] {
        &[WireKind::Bool, WireKind::String]
    }

    fn marshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue> {
        match value.downcast_ref::<bool>() {
            Some(&value) => Ok(WireValue::Bool(value)),
            None => Err(unsupported(&**value)),
        }
    }

    fn try_unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch> {
        Ok(match wire {
            WireValue::Bool(_) => ObjectMatch::Exact,
            WireValue::String(text) if parse_bool(text).is_some() => ObjectMatch::Coercible,
            _ => ObjectMatch::Impossible,
        })
    }

    fn unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef> {
        match wire {
            WireValue::Bool(value) => Ok(object(*value)),
            WireValue::String(text) => match parse_bool(text) {
                Some(value) => Ok(object(value)),
                None => Err(MarshallError::InvalidScalar {
                    expected: "bool",
                    found: text.clone(),
                }),
            },
            _ => Err(mismatched(WireKind::Bool, wire)),
        }
    }
}

// -----------------------------------------------------------------------------
// NumberSerializer

/// Converts `i64`, `i32`, `u64` and `f64`.
///
/// Numbers are read back as `i64` when they fit, else as `u64`, else as
/// `f64`. Numeric strings are a [coercible](ObjectMatch::Coercible) match.
/// Non-finite floats have no wire form.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumberSerializer;

fn number_object(number: &Number) -> MarshallResult<ObjectRef> {
    if let Some(value) = number.as_i64() {
        Ok(object(value))
    } else if let Some(value) = number.as_u64() {
        Ok(object(value))
    } else if let Some(value) = number.as_f64() {
        Ok(object(value))
    } else {
        Err(MarshallError::InvalidScalar {
            expected: "number",
            found: number.to_string(),
        })
    }
}

impl Serializer for NumberSerializer {
    fn name(&self) -> &'static str {
        "number"
    }

    fn source_types(&self) -> Vec<SourceType> {
        alloc::vec![
            SourceType::of::<i64>(),
            SourceType::of::<i32>(),
            SourceType::of::<u64>(),
            SourceType::of::<f64>(),
        ]
    }

    fn wire_kinds(&self) -> &'static [WireKind] {
        &[WireKind::Number, WireKind::String]
    }

    fn marshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue> {
        if let Some(&value) = value.downcast_ref::<i64>() {
            Ok(value.into())
        } else if let Some(&value) = value.downcast_ref::<i32>() {
            Ok(value.into())
        } else if let Some(&value) = value.downcast_ref::<u64>() {
            Ok(value.into())
        } else if let Some(&value) = value.downcast_ref::<f64>() {
            Number::from_f64(value)
                .map(WireValue::Number)
                .ok_or(MarshallError::UnrepresentableNumber(value))
        } else {
            Err(unsupported(&**value))
        }
    }

    fn try_unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch> {
        Ok(match wire {
            WireValue::Number(_) => ObjectMatch::Exact,
            WireValue::String(text) if text.parse::<Number>().is_ok() => ObjectMatch::Coercible,
            _ => ObjectMatch::Impossible,
        })
    }

    fn unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef> {
        match wire {
            WireValue::Number(number) => number_object(number),
            WireValue::String(text) => match text.parse::<Number>() {
                Ok(number) => number_object(&number),
                Err(_) => Err(MarshallError::InvalidScalar {
                    expected: "number",
                    found: text.clone(),
                }),
            },
            _ => Err(mismatched(WireKind::Number, wire)),
        }
    }
}

// -----------------------------------------------------------------------------
// StringSerializer

/// Converts `String` and `&'static str`, both read back as `String`.
///
/// Numbers and booleans can be read as their string form, which is only an
/// [approximate](ObjectMatch::Approximate) match.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
    fn name(&self) -> &'static str {
        "string"
    }

    fn source_types(&self) -> Vec<SourceType> {
        alloc::vec![SourceType::of::<String>(), SourceType::of::<&'static str>()]
    }

    fn wire_kinds(&self) -> &'static [WireKind] {
        &[WireKind::String, WireKind::Number, WireKind::Bool]
    }

    fn marshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        value: &ObjectRef,
    ) -> MarshallResult<WireValue> {
        if let Some(value) = value.downcast_ref::<String>() {
            Ok(value.as_str().into())
        } else if let Some(&value) = value.downcast_ref::<&'static str>() {
            Ok(value.into())
        } else {
            Err(unsupported(&**value))
        }
    }

    fn try_unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectMatch> {
        Ok(match wire {
            WireValue::String(_) => ObjectMatch::Exact,
            WireValue::Number(_) | WireValue::Bool(_) => ObjectMatch::Approximate,
            _ => ObjectMatch::Impossible,
        })
    }

    fn unmarshall(
        &self,
        _registry: &SerializerRegistry,
        _state: &mut SerializationState,
        wire: &WireValue,
    ) -> MarshallResult<ObjectRef> {
        match wire {
            WireValue::String(text) => Ok(object(text.clone())),
            WireValue::Number(number) => Ok(object(number.to_string())),
            WireValue::Bool(value) => Ok(object(value.to_string())),
            _ => Err(mismatched(WireKind::String, wire)),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use serde_json::json;

    use super::{BooleanSerializer, NumberSerializer, StringSerializer};
    use crate::error::MarshallError;
    use crate::object::{Null, ObjectRef, object};
    use crate::object_match::ObjectMatch;
    use crate::registry::{Serializer, SerializerRegistry};
    use crate::wire::{WireKind, WireValue};

    fn rank(serializer: &dyn Serializer, wire: WireValue) -> ObjectMatch {
        let registry = SerializerRegistry::empty();
        serializer
            .try_unmarshall(&registry, &mut registry.new_state(), &wire)
            .unwrap()
    }

    fn read(serializer: &dyn Serializer, wire: WireValue) -> Result<ObjectRef, MarshallError> {
        let registry = SerializerRegistry::empty();
        serializer.unmarshall(&registry, &mut registry.new_state(), &wire)
    }

    #[test]
    fn scalars_marshall() {
        let registry = SerializerRegistry::new();
        assert!(registry.to_wire(&object(Null)).unwrap() == json!(null));
        assert!(registry.to_wire(&object(true)).unwrap() == json!(true));
        assert!(registry.to_wire(&object(-5_i64)).unwrap() == json!(-5));
        assert!(registry.to_wire(&object(7_i32)).unwrap() == json!(7));
        assert!(registry.to_wire(&object(u64::MAX)).unwrap() == json!(u64::MAX));
        assert!(registry.to_wire(&object(0.25_f64)).unwrap() == json!(0.25));
        assert!(registry.to_wire(&object(String::from("s"))).unwrap() == json!("s"));
        assert!(registry.to_wire(&object("static")).unwrap() == json!("static"));

        let err = registry.to_wire(&object(f64::NAN)).unwrap_err();
        assert!(matches!(err, MarshallError::UnrepresentableNumber(_)));
        let err = registry.to_wire(&object(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, MarshallError::UnrepresentableNumber(_)));
    }

    #[test]
    fn boolean_ranking() {
        assert!(rank(&BooleanSerializer, json!(false)) == ObjectMatch::Exact);
        assert!(rank(&BooleanSerializer, json!("true")) == ObjectMatch::Coercible);
        assert!(rank(&BooleanSerializer, json!("yes")) == ObjectMatch::Impossible);
        assert!(rank(&BooleanSerializer, json!(1)) == ObjectMatch::Impossible);

        let value = read(&BooleanSerializer, json!("false")).unwrap();
        assert!(value.downcast_ref::<bool>() == Some(&false));

        let err = read(&BooleanSerializer, json!("yes")).unwrap_err();
        assert!(matches!(err, MarshallError::InvalidScalar { expected: "bool", .. }));
    }

    #[test]
    fn number_ranking() {
        assert!(rank(&NumberSerializer, json!(3)) == ObjectMatch::Exact);
        assert!(rank(&NumberSerializer, json!("3.5")) == ObjectMatch::Coercible);
        assert!(rank(&NumberSerializer, json!("three")) == ObjectMatch::Impossible);
        assert!(rank(&NumberSerializer, json!(null)) == ObjectMatch::Impossible);

        let value = read(&NumberSerializer, json!(-3)).unwrap();
        assert!(value.downcast_ref::<i64>() == Some(&-3));
        let value = read(&NumberSerializer, json!(u64::MAX)).unwrap();
        assert!(value.downcast_ref::<u64>() == Some(&u64::MAX));
        let value = read(&NumberSerializer, json!("3.5")).unwrap();
        assert!(value.downcast_ref::<f64>() == Some(&3.5));

        let err = read(&NumberSerializer, json!(true)).unwrap_err();
        assert!(matches!(
            err,
            MarshallError::MismatchedWireKind {
                expected: WireKind::Number,
                found: WireKind::Bool
            }
        ));
    }

    #[test]
    fn string_ranking() {
        assert!(rank(&StringSerializer, json!("x")) == ObjectMatch::Exact);
        assert!(rank(&StringSerializer, json!(1)) == ObjectMatch::Approximate);
        assert!(rank(&StringSerializer, json!(true)) == ObjectMatch::Approximate);
        assert!(rank(&StringSerializer, json!({})) == ObjectMatch::Impossible);

        let value = read(&StringSerializer, json!(12)).unwrap();
        assert!(value.downcast_ref::<String>().map(String::as_str) == Some("12"));
    }

    #[test]
    fn registry_prefers_exact_scalars() {
        let registry = SerializerRegistry::new();

        let value = registry.from_wire(None, &json!("42")).unwrap();
        assert!(value.is::<String>());
        let value = registry.from_wire(None, &json!(42)).unwrap();
        assert!(value.is::<i64>());
        let value = registry.from_wire(None, &json!("true")).unwrap();
        assert!(value.is::<String>());
        let value = registry.from_wire(None, &json!(true)).unwrap();
        assert!(value.is::<bool>());
        let value = registry.from_wire(None, &json!(null)).unwrap();
        assert!(value.is::<Null>());
    }

    #[test]
    fn coercion_without_exact_candidate() {
        let mut registry = SerializerRegistry::empty();
        registry.register(BooleanSerializer);
        registry.register(NumberSerializer);

        let value = registry.from_wire(None, &json!("true")).unwrap();
        assert!(value.downcast_ref::<bool>() == Some(&true));
        let value = registry.from_wire(None, &json!("8")).unwrap();
        assert!(value.downcast_ref::<i64>() == Some(&8));
    }
}
