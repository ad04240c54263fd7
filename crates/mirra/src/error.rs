//! Error types for graph conversion and operation dispatch.

use thiserror::Error;

use crate::tag::{TagParseError, TypeTag};

// -----------------------------------------------------------------------------
// ReflectError

/// Failures raised while serializing, deserializing, or populating a graph.
#[derive(Debug, Error)]
pub enum ReflectError {
    /// An identity string did not resolve against the registry.
    #[error("type `{identity}` is not registered")]
    TypeNotFound { identity: String },

    /// The identity string itself was malformed.
    #[error(transparent)]
    MalformedIdentity(#[from] TagParseError),

    /// No converter in the chain claimed the type.
    #[error("no converter available for `{tag}`")]
    NoConverterAvailable { tag: TypeTag },

    /// The registry knows the type but cannot construct it.
    #[error("type `{tag}` has no registered constructor")]
    UninstantiableType { tag: TypeTag },

    /// A reference marker pointed at a path no shared node was recorded for.
    #[error("reference `{path}` does not resolve to a previously visited node")]
    CycleResolutionFailed { path: String },

    /// A scalar token could not be applied to its target.
    #[error("cannot apply value to scalar `{tag}`: {reason}")]
    ScalarMismatch { tag: TypeTag, reason: String },

    /// A constructed value could not be stored into its slot.
    #[error("value does not match expected type `{expected}`")]
    ValueMismatch { expected: TypeTag },

    /// A wire member addressed something the target type does not have.
    #[error("type `{tag}` has no member `{member}`")]
    UnknownMember { tag: TypeTag, member: String },

    /// A nested conversion failed; `path` locates the offending node.
    #[error("at `{path}`: {source}")]
    AtPath {
        path: String,
        #[source]
        source: Box<ReflectError>,
    },
}

impl ReflectError {
    /// Wraps `self` with the graph path it occurred at, unless it already
    /// carries one.
    pub fn at(self, path: &str) -> Self {
        match self {
            err @ ReflectError::AtPath { .. } => err,
            err => ReflectError::AtPath {
                path: path.to_owned(),
                source: Box::new(err),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// InvokeError

/// Failures raised while discovering or invoking operations.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No registered operation matched the requested name.
    #[error("no operation matching `{name}`")]
    OperationNotFound { name: String },

    /// More than one operation survived matching and narrowing.
    #[error("operation `{name}` is ambiguous: candidates {candidates:?}")]
    AmbiguousOperation {
        name: String,
        candidates: Vec<String>,
    },

    /// A supplied argument could not be coerced to the parameter's type.
    #[error("cannot coerce `{value}` for parameter `{param}`: {reason}")]
    ArgumentCoercionFailed {
        param: String,
        value: String,
        reason: String,
    },

    /// A required parameter was neither supplied nor defaulted.
    #[error("operation `{name}` is missing required argument `{param}`")]
    MissingArgument { name: String, param: String },

    /// The handler itself reported a failure.
    #[error("operation `{name}` failed: {message}")]
    HandlerFailed { name: String, message: String },

    /// A synchronous invoke was asked to run an async handler.
    #[error("operation `{name}` is asynchronous; use `invoke_async`")]
    RequiresAsync { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_path_wraps_once() {
        let err = ReflectError::CycleResolutionFailed {
            path: "#/next".to_owned(),
        };
        let wrapped = err.at("#/items/0");
        assert!(matches!(&wrapped, ReflectError::AtPath { path, .. } if path == "#/items/0"));

        // A second wrap keeps the innermost location.
        let rewrapped = wrapped.at("#");
        assert!(matches!(&rewrapped, ReflectError::AtPath { path, .. } if path == "#/items/0"));
    }
}
