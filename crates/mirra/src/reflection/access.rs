use crate::info::MemberInfo;
use crate::reflection::{ObjectId, Reflect};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Scalar

/// A primitive leaf value carrying a flat JSON payload.
///
/// Fieldless enums also reflect as scalars: their payload is the variant name
/// token.
pub trait Scalar: Reflect {
    /// The value as a JSON scalar.
    fn to_value(&self) -> serde_json::Value;

    /// Replaces the value from a JSON scalar.
    ///
    /// Returns a human-readable reason on failure (wrong payload shape,
    /// out-of-range number, unknown enum token).
    fn set_from_value(&mut self, value: &serde_json::Value) -> Result<(), String>;
}

// -----------------------------------------------------------------------------
// Struct

/// Named-member access for field-and-property aggregates.
pub trait Struct: Reflect {
    /// Returns a reference to the member named `name`.
    fn member(&self, name: &str) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the member named `name`.
    fn member_mut(&mut self, name: &str) -> Option<&mut dyn Reflect>;

    /// Returns a reference to the member at declaration position `index`.
    fn member_at(&self, index: usize) -> Option<&dyn Reflect>;

    /// The number of reflectable members.
    fn member_len(&self) -> usize;

    /// Static metadata for every reflectable member, in declaration order.
    fn member_infos(&self) -> &'static [MemberInfo];
}

// -----------------------------------------------------------------------------
// List

/// Ordered sequence access.
pub trait List: Reflect {
    /// The number of elements.
    fn len(&self) -> usize;

    /// Returns a reference to the element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the element at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Appends an element; returns it back on type mismatch.
    fn push(&mut self, element: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Removes all elements.
    fn clear(&mut self);

    /// The element type's descriptor.
    fn element_tag(&self) -> TypeTag;
}

// -----------------------------------------------------------------------------
// Tuple

/// Positional access for fixed-arity aggregates.
pub trait Tuple: Reflect {
    /// Returns a reference to the element at `index`.
    fn element(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns a mutable reference to the element at `index`.
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// The tuple arity.
    fn element_len(&self) -> usize;
}

// -----------------------------------------------------------------------------
// SharedNode

/// A reference-counted graph node with observable identity.
///
/// Shared nodes are how cyclic object graphs are expressed: the serializer
/// registers [`object_id`](SharedNode::object_id) with the context before
/// descending, and a node visited twice is emitted as a reference marker
/// instead of being re-walked.
///
/// Inner access is closure-based because the value lives behind a lock; the
/// borrow cannot outlive the guard.
pub trait SharedNode: Reflect {
    /// The node's reference identity.
    fn object_id(&self) -> ObjectId;

    /// An aliasing handle to the same allocation (e.g. an `Arc` clone),
    /// used to materialize reference markers during deserialization.
    fn alias(&self) -> Box<dyn Reflect>;

    /// The inner value's descriptor.
    fn inner_tag(&self) -> TypeTag;

    /// Calls `f` with shared access to the inner value.
    fn with_inner(&self, f: &mut dyn FnMut(&dyn Reflect));

    /// Calls `f` with exclusive access to the inner value.
    fn with_inner_mut(&self, f: &mut dyn FnMut(&mut dyn Reflect));
}
