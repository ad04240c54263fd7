//! The converter chain: pluggable strategies for turning reflected values
//! into wire members and back.
//!
//! Selection is priority-driven. Each converter scores a type descriptor,
//! zero meaning "cannot handle"; the chain picks the highest non-zero score
//! and breaks ties in favor of the earliest registration, so dispatch is
//! deterministic for a fixed chain.

mod chain;
mod list;
mod report;
mod scalar;
mod structure;
mod token;
mod tuple;

pub use chain::{ConvertCx, Converter, ConverterChain};
pub use list::ListConverter;
pub use report::{PopulateOutcome, PopulateReport};
pub use scalar::ScalarConverter;
pub use structure::StructConverter;
pub use token::TokenConverter;
pub use tuple::TupleConverter;
