//! The intermediate wire tree.

mod wire;

pub use wire::{Member, REFERENCE_TOKEN};
