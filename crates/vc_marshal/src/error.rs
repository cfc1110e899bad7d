use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use crate::wire::WireKind;

// -----------------------------------------------------------------------------
// MarshallError

/// Alias of `Result<T, MarshallError>`.
pub type MarshallResult<T> = Result<T, MarshallError>;

/// A enumeration of all error outcomes of marshalling and unmarshalling.
///
/// Failures inside a container are wrapped in [`NestedFailure`] with the
/// offending key, so an error raised deep inside a document carries the
/// full key path. See [`key_path`] and [`root_cause`].
///
/// [`NestedFailure`]: MarshallError::NestedFailure
/// [`key_path`]: MarshallError::key_path
/// [`root_cause`]: MarshallError::root_cause
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MarshallError {
    #[error("wire object has no type hint")]
    MissingTypeHint,

    #[error("unrecognized type hint `{hint}`")]
    UnrecognizedTypeHint { hint: String },

    #[error("wire object is missing required field `{field}`")]
    MissingRequiredField { field: &'static str },

    #[error("no serializer registered for source type `{type_name}`")]
    UnsupportedSourceType { type_name: &'static str },

    #[error("no serializer can unmarshall the {kind} wire value{}", fmt_hint(.hint))]
    NoMatchingSerializer { kind: WireKind, hint: Option<String> },

    #[error("cyclic reference to a `{type_name}` value")]
    CyclicReference { type_name: &'static str },

    #[error("key `{key}`: {source}")]
    NestedFailure {
        key: String,
        source: Box<MarshallError>,
    },

    #[error("duplicate key `{key}` after key coercion")]
    DuplicateKey { key: String },

    #[error("expected {expected} wire value, found {found}")]
    MismatchedWireKind { expected: WireKind, found: WireKind },

    #[error("cannot read `{found}` as {expected}")]
    InvalidScalar { expected: &'static str, found: String },

    #[error("number `{0}` has no wire representation")]
    UnrepresentableNumber(f64),

    #[error("nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}

fn fmt_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => alloc::format!(" with type hint `{hint}`"),
        None => String::new(),
    }
}

impl MarshallError {
    /// Wrap `self` as the failure of the value stored under `key`.
    #[inline]
    pub fn nested(self, key: impl Into<String>) -> Self {
        Self::NestedFailure {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// The chain of container keys leading to the innermost failure,
    /// outermost first.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_marshal::MarshallError;
    ///
    /// let error = MarshallError::MissingTypeHint.nested("y").nested("x");
    /// assert_eq!(error.key_path(), ["x", "y"]);
    /// ```
    pub fn key_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::NestedFailure { key, source } = current {
            path.push(key.as_str());
            current = &**source;
        }
        path
    }

    /// The innermost error, with every [`NestedFailure`](Self::NestedFailure)
    /// layer peeled off.
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Self::NestedFailure { source, .. } = current {
            current = &**source;
        }
        current
    }
}

// -----------------------------------------------------------------------------
// Tests
