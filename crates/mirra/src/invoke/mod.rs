//! Fuzzy operation discovery and type-coercing invocation.
//!
//! Hosts register operations against a declaring type; callers locate them by
//! approximate name (two independent [`MatchLevel`]s, one per axis) and
//! invoke them with loosely-typed JSON arguments that are coerced to each
//! parameter's declared type before the handler runs.

mod coerce;
mod descriptor;
mod matching;
mod op_registry;

pub use coerce::coerce;
pub use descriptor::{OperationDescriptor, ParamInfo};
pub use matching::MatchLevel;
pub use op_registry::{OpHandler, OperationRegistry};
