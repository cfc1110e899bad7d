#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Crates

// `Dictionary` needs `std::sync::RwLock`, the rest only `alloc`.
extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod config;
mod dictionary;
mod error;
mod object;
mod object_match;
mod state;

pub mod impls;
pub mod registry;
pub mod wire;

// -----------------------------------------------------------------------------
// Top-level exports

pub use config::{DuplicateKeyPolicy, MarshallConfig};
pub use dictionary::{Dictionary, DictionaryKey};
pub use error::{MarshallError, MarshallResult};
pub use object::{Null, Object, ObjectRef, object, objects_eq};
pub use object_match::ObjectMatch;
pub use registry::{Serializer, SerializerRegistry, SourceType};
pub use state::SerializationState;
pub use wire::{WireKind, WireValue};
