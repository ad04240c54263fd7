//! Built-in [`Reflect`](crate::reflection::Reflect) implementations.
//!
//! One file per type family, mirroring the derive's output for foreign types:
//! scalars, sequences, nullable wrappers, tuples, shared graph nodes,
//! calendar types, and the type descriptor itself.

mod list;
mod option;
mod scalar;
mod shared;
mod tag;
mod time;
mod tuple;

pub use shared::Shared;
