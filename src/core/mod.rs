//! # Translation Core
//!
//! The bidirectional codec at the heart of the wire protocol: one
//! [`Translator`] bound to a stream and a direction, plus the contracts that
//! let message types describe their own fields to it.
//!
//! The central idea is symmetry by construction. Every supported type has
//! exactly one `translate_*` method whose body dispatches on the translator's
//! direction, so the write path and the read path can never silently drift
//! apart: they are the same code.

pub mod collections;
pub mod comparer;
pub mod intern;
pub mod translator;
pub mod types;

use std::io::{Read, Write};

use crate::error::Result;
use translator::Translator;

/// Contract for types that describe their own fields to a [`Translator`] in a
/// fixed order.
///
/// The same `translate` body runs on both sides of the wire: in write mode it
/// encodes the fields, in read mode it overwrites them with decoded values.
/// Derived types must invoke the base type's `translate` first, then their
/// own fields, so base/derived field order stays symmetric.
///
/// Construction on read uses either `Default` (see
/// [`Translator::translate_opt`]) or an externally supplied factory (see
/// [`Translator::translate_opt_with`]) when the type needs external context.
pub trait Translatable {
    /// Translates all fields of this instance through the given translator.
    fn translate<S: Read + Write>(&mut self, translator: &mut Translator<S>) -> Result<()>;
}

/// Contract for enums that cross the wire as their underlying integer.
///
/// `from_wire` returning `None` fails the translation with
/// [`crate::error::TranslationError::UnsupportedType`].
pub trait WireEnum: Sized {
    /// The underlying integer representation written to the wire.
    fn to_wire(&self) -> i32;

    /// Reconstructs the enum from its wire representation.
    fn from_wire(value: i32) -> Option<Self>;
}
