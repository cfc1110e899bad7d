//! Built-in serializers.
//!
//! - [`MapSerializer`]: [`Dictionary`](crate::Dictionary) as a hinted wire object.
//! - [`NullSerializer`], [`BooleanSerializer`], [`NumberSerializer`],
//!   [`StringSerializer`]: the leaves a container holds.
//!
//! The helpers in [`common`] are what a new container serializer composes.

// -----------------------------------------------------------------------------
// Modules

pub mod common;
mod map;
mod primitive;

// -----------------------------------------------------------------------------
// Exports

pub use map::{MAP_FIELD, MAP_TYPE_HINT, MAP_TYPE_HINTS, MapSerializer};
pub use primitive::{BooleanSerializer, NullSerializer, NumberSerializer, StringSerializer};
