//! The facade: one object owning the registry, the converter chain, the
//! metadata cache, and the operation registry.

mod facade;
mod schema;

pub use facade::Reflector;
pub use schema::{MemberSchema, OperationSchema, ParamSchema, TypeSchema};
