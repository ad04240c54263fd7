//! The reflection capability interface.
//!
//! Rust has no runtime introspection, so the engine's view of a value is the
//! [`Reflect`] trait: a capability table giving member access, scalar payload
//! conversion, and reference identity. Implementations come from
//! `#[derive(Reflect)]` (see [`mirra_derive`]) or from the built-in impls in
//! [`crate::impls`].

mod access;
mod describe;
mod kinds;
mod reflect;

pub use access::{List, Scalar, SharedNode, Struct, Tuple};
pub use describe::Describe;
pub use kinds::{ReflectKind, ReflectMut, ReflectRef};
pub use reflect::{ObjectId, Reflect};
