#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro emits `mirra::` paths; `extern self` lets this crate's own
// tests use the macro without special-casing the crate name.
extern crate self as mirra;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod cache;
pub mod context;
pub mod convert;
pub mod impls;
pub mod info;
pub mod invoke;
pub mod journal;
pub mod member;
pub mod reflection;
pub mod reflector;
pub mod registry;
pub mod tag;

// -----------------------------------------------------------------------------
// Top-Level exports

/// Re-exports for the derive macro's generated code. Not public API.
#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
    pub use serde_json;
}

pub use error::{InvokeError, ReflectError};
pub use impls::Shared;
pub use member::Member;
// The derive macro and the trait share a name, like `serde::Serialize`.
pub use mirra_derive::Reflect;
pub use reflection::Reflect;
pub use reflector::Reflector;
pub use tag::TypeTag;
