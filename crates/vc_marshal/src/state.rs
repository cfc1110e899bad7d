use vc_utils::hash::HashMap;

use crate::config::{DuplicateKeyPolicy, MarshallConfig};
use crate::error::{MarshallError, MarshallResult};
use crate::object::{ObjectRef, identity};

// -----------------------------------------------------------------------------
// SerializationState

/// Mutable context of one top-level marshall or unmarshall call.
///
/// A fresh state is created for every top-level call (see
/// [`SerializerRegistry::new_state`]) and threaded by `&mut` through each
/// recursive step. It is never shared between calls, which is what lets the
/// registry and its serializers stay immutable.
///
/// It holds:
/// - the cycle guard, mapping the identity of every value currently being
///   marshalled to the name of its type;
/// - the current container nesting depth and its limit;
/// - the per-call policies copied from [`MarshallConfig`].
///
/// [`SerializerRegistry::new_state`]: crate::SerializerRegistry::new_state
#[derive(Debug)]
pub struct SerializationState {
    emit_type_hints: bool,
    duplicate_keys: DuplicateKeyPolicy,
    max_depth: usize,
    depth: usize,
    in_progress: HashMap<usize, &'static str>,
}

impl SerializationState {
    /// Creates a state for one call with the settings of `config`.
    pub fn new(config: &MarshallConfig) -> Self {
        Self {
            emit_type_hints: config.emit_type_hints,
            duplicate_keys: config.duplicate_keys,
            max_depth: config.max_depth,
            depth: 0,
            in_progress: HashMap::default(),
        }
    }

    /// Whether marshalled wire objects carry a type hint.
    #[inline]
    pub const fn emit_type_hints(&self) -> bool {
        self.emit_type_hints
    }

    /// Policy for keys colliding after coercion.
    #[inline]
    pub const fn duplicate_keys(&self) -> DuplicateKeyPolicy {
        self.duplicate_keys
    }

    /// Current nesting depth.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether `value` is currently being marshalled further up the stack.
    #[inline]
    pub fn is_in_progress(&self, value: &ObjectRef) -> bool {
        self.in_progress.contains_key(&identity(value))
    }

    /// Marks `value` as being marshalled.
    ///
    /// Fails with [`CyclicReference`] when `value` is already in progress,
    /// i.e. it (directly or transitively) contains itself.
    ///
    /// Every successful `enter` must be paired with an [`exit`](Self::exit).
    ///
    /// [`CyclicReference`]: MarshallError::CyclicReference
    pub fn enter(&mut self, value: &ObjectRef) -> MarshallResult<()> {
        let type_name = value.object_type_name();
        if self.in_progress.insert(identity(value), type_name).is_some() {
            return Err(MarshallError::CyclicReference { type_name });
        }
        Ok(())
    }

    /// Releases `value` after its marshalling finished.
    ///
    /// Shared references that are not cycles (the same value reachable
    /// twice through siblings) are therefore accepted.
    #[inline]
    pub fn exit(&mut self, value: &ObjectRef) {
        self.in_progress.remove(&identity(value));
    }

    /// Descends one container level.
    ///
    /// Only containers count, in both directions; leaves never descend.
    ///
    /// Fails with [`DepthLimitExceeded`](MarshallError::DepthLimitExceeded)
    /// past the configured limit.
    pub fn descend(&mut self) -> MarshallResult<()> {
        if self.depth >= self.max_depth {
            return Err(MarshallError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    /// Ascends one nesting level.
    #[inline]
    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Default for SerializationState {
    #[inline]
    fn default() -> Self {
        Self::new(&MarshallConfig::default())
    }
}

// -----------------------------------------------------------------------------
// Tests
