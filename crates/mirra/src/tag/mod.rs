//! The type identity codec.
//!
//! A [`TypeTag`] is the engine's type descriptor: an immutable, cheaply
//! cloneable handle describing a named type, a closed generic instantiation,
//! or an array of some rank. [`TypeTag::canonical`] encodes a tag to its
//! canonical identity string, and [`parse`](crate::tag::parse) turns such a
//! string back into a structural tag. Scope-aware resolution (identity string
//! to a *registered* tag) lives on
//! [`TypeRegistry::decode`](crate::registry::TypeRegistry::decode).

mod parse;
mod type_tag;

pub use parse::{TagParseError, parse};
pub use type_tag::{TagKind, TypeTag};
