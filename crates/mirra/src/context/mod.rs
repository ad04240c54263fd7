//! Per-call conversion state: the path stack and the cycle map.

mod graph_context;

pub use graph_context::{GraphContext, ROOT_PATH};
