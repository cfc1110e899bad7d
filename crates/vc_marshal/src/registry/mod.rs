//! Serializer registration and dispatch.
//!
//! ## Menu
//!
//! - [`Serializer`]: the converter contract, implemented once per family of
//!   in-memory types.
//! - [`SourceType`]: a statically declared type a serializer accepts.
//! - [`SerializerRegistration`]: the capability snapshot taken at registration.
//! - [`SerializerRegistry`]: owns the serializers and dispatches both ways.
//!
//! ## Dispatch
//!
//! Marshalling looks up the value's runtime `TypeId`; the first registered
//! serializer claiming it wins.
//!
//! Unmarshalling may face several plausible candidates for the same wire
//! value. Each candidate's [`Serializer::try_unmarshall`] ranks the value
//! with an [`ObjectMatch`], impossible candidates drop out, and the best
//! remaining one (earliest registered on ties) rebuilds the value.
//!
//! ## Sealing
//!
//! Registration needs `&mut SerializerRegistry`, dispatch only `&self`.
//! Once the registry is shared (usually behind an `Arc`), its serializer set
//! can no longer change and concurrent calls need no locking.
//!
//! [`ObjectMatch`]: crate::ObjectMatch

// -----------------------------------------------------------------------------
// Modules

mod serializer;
mod serializer_registry;

// -----------------------------------------------------------------------------
// Exports

pub use serializer::{Serializer, SourceType};
pub use serializer_registry::{SerializerRegistration, SerializerRegistry};
