use std::fmt;

use crate::reflection::{List, Scalar, SharedNode, Struct, Tuple};

// -----------------------------------------------------------------------------
// ReflectKind

/// The reflection families a value can belong to.
///
/// Converter selection keys off this shape, not the concrete type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ReflectKind {
    /// A primitive leaf value with a flat JSON payload.
    Scalar,
    /// A named-member aggregate (fields and properties).
    Struct,
    /// An ordered, growable sequence.
    List,
    /// A fixed-arity positional aggregate.
    Tuple,
    /// A reference-counted shared node with observable identity.
    Shared,
    /// No structural access; serialized only via a specialized converter.
    Opaque,
}

impl fmt::Display for ReflectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReflectKind::Scalar => "scalar",
            ReflectKind::Struct => "struct",
            ReflectKind::List => "list",
            ReflectKind::Tuple => "tuple",
            ReflectKind::Shared => "shared",
            ReflectKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// ReflectRef / ReflectMut

/// An immutable reflected value, cast to its access subtrait.
pub enum ReflectRef<'a> {
    Scalar(&'a dyn Scalar),
    Struct(&'a dyn Struct),
    List(&'a dyn List),
    Tuple(&'a dyn Tuple),
    Shared(&'a dyn SharedNode),
    Opaque(&'a dyn crate::reflection::Reflect),
}

/// A mutable reflected value, cast to its access subtrait.
pub enum ReflectMut<'a> {
    Scalar(&'a mut dyn Scalar),
    Struct(&'a mut dyn Struct),
    List(&'a mut dyn List),
    Tuple(&'a mut dyn Tuple),
    Shared(&'a mut dyn SharedNode),
    Opaque(&'a mut dyn crate::reflection::Reflect),
}

impl ReflectRef<'_> {
    /// The kind of the wrapped value.
    pub fn kind(&self) -> ReflectKind {
        match self {
            ReflectRef::Scalar(_) => ReflectKind::Scalar,
            ReflectRef::Struct(_) => ReflectKind::Struct,
            ReflectRef::List(_) => ReflectKind::List,
            ReflectRef::Tuple(_) => ReflectKind::Tuple,
            ReflectRef::Shared(_) => ReflectKind::Shared,
            ReflectRef::Opaque(_) => ReflectKind::Opaque,
        }
    }
}
