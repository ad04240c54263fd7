//! The type registry: the searchable scope of reflectable types.
//!
//! Registering a type stores its [`TypeMeta`] (descriptor, member table,
//! construction vtables) keyed by [`TypeTag`]. The registry doubles as the
//! decode scope for the identity codec: an identity string resolves only
//! against types reachable from it.
//!
//! [`TypeTag`]: crate::tag::TypeTag

mod type_meta;
mod type_registry;

#[cfg(feature = "auto_register")]
mod auto;

#[cfg(feature = "auto_register")]
pub use auto::AutoRegistration;
pub use type_meta::{Register, TypeMeta};
pub use type_registry::{TypeRegistry, TypeRegistryArc};
