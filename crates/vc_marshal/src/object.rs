use alloc::string::String;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt::Debug;

// -----------------------------------------------------------------------------
// Object

/// An in-memory value that can cross the marshalling boundary.
///
/// Implemented for every `Any + Send + Sync + Debug + PartialEq` type, so
/// plain Rust values (`bool`, `i64`, `String`, ...) are objects as-is.
/// Serializers select values by their runtime [`TypeId`] and get back to the
/// concrete type with [`downcast_ref`](<dyn Object>::downcast_ref).
pub trait Object: Any + Send + Sync + Debug {
    /// The name of the concrete type, for diagnostics.
    fn object_type_name(&self) -> &'static str;

    /// Structural equality against another type-erased object.
    ///
    /// Objects of different concrete types are never equal.
    fn object_eq(&self, other: &dyn Object) -> bool;
}

impl<T: Any + Send + Sync + Debug + PartialEq> Object for T {
    #[inline]
    fn object_type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn object_eq(&self, other: &dyn Object) -> bool {
        match other.downcast_ref::<T>() {
            Some(other) => self == other,
            None => false,
        }
    }
}

impl dyn Object {
    /// The [`TypeId`] of the concrete type behind the trait object.
    #[inline]
    pub fn object_type_id(&self) -> TypeId {
        Any::type_id(self)
    }

    /// Returns `true` if the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.object_type_id() == TypeId::of::<T>()
    }

    /// Returns a reference to the concrete value if it is of type `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

/// A shared, type-erased in-memory value.
///
/// Identity (the address behind the `Arc`) is what the cycle guard of a
/// [`SerializationState`](crate::SerializationState) tracks.
pub type ObjectRef = Arc<dyn Object>;

/// Wrap `value` into an [`ObjectRef`].
///
/// # Examples
///
/// ```
/// use vc_marshal::object;
///
/// let value = object(42_i64);
/// assert_eq!(value.downcast_ref::<i64>(), Some(&42));
/// ```
#[inline]
pub fn object<T: Object>(value: T) -> ObjectRef {
    Arc::new(value)
}

/// The address identifying `value` within one marshall call.
#[inline]
pub(crate) fn identity(value: &ObjectRef) -> usize {
    Arc::as_ptr(value).cast::<()>() as usize
}

/// Structural equality of two object references.
///
/// Beyond [`Object::object_eq`], integers compare by value whatever their
/// width and `String` compares with `&'static str` by content, so a value
/// equals what an unmarshall rebuilds from its wire form.
///
/// # Examples
///
/// ```
/// use vc_marshal::{object, objects_eq};
///
/// assert!(objects_eq(&object(7_i32), &object(7_u64)));
/// assert!(objects_eq(&object("a"), &object(String::from("a"))));
/// assert!(!objects_eq(&object(1_i64), &object(1.0_f64)));
/// ```
pub fn objects_eq(a: &ObjectRef, b: &ObjectRef) -> bool {
    Arc::ptr_eq(a, b) || a.object_eq(&**b) || scalars_eq(&**a, &**b)
}

fn scalars_eq(a: &dyn Object, b: &dyn Object) -> bool {
    if let (Some(a), Some(b)) = (integer(a), integer(b)) {
        return a == b;
    }
    match (text(a), text(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn integer(value: &dyn Object) -> Option<i128> {
    if let Some(&value) = value.downcast_ref::<i64>() {
        Some(value.into())
    } else if let Some(&value) = value.downcast_ref::<i32>() {
        Some(value.into())
    } else if let Some(&value) = value.downcast_ref::<u64>() {
        Some(value.into())
    } else {
        None
    }
}

fn text(value: &dyn Object) -> Option<&str> {
    if let Some(value) = value.downcast_ref::<String>() {
        Some(value.as_str())
    } else {
        value.downcast_ref::<&'static str>().copied()
    }
}

// -----------------------------------------------------------------------------
// Null

/// The in-memory counterpart of the wire `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Null;

// -----------------------------------------------------------------------------
// Tests
