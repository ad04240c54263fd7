use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::reflection::{Describe, ObjectId, Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::reflection::SharedNode;
use crate::registry::{Register, TypeMeta, TypeRegistry};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Shared

/// A reference-counted, lock-guarded graph node.
///
/// `Shared<T>` is how an object graph expresses aliasing and cycles: cloning
/// a `Shared` clones the *handle*, and both handles report the same
/// [`ObjectId`]. The serializer uses that identity to emit a reference marker
/// the second time a node is reached.
///
/// # Example
///
/// ```
/// use mirra::impls::Shared;
///
/// let a = Shared::new(1_i32);
/// let b = a.clone();
/// a.with_mut(|v| *v = 2);
/// assert_eq!(b.with(|v| *v), 2);
/// ```
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    /// Wraps a value into a fresh shared node.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Calls `f` with shared access to the value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read_recursive())
    }

    /// Calls `f` with exclusive access to the value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.write())
    }

    /// The node's reference identity.
    pub fn id(&self) -> ObjectId {
        ObjectId::from_ptr(Arc::as_ptr(&self.0))
    }

    /// Whether two handles alias the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    /// Clones the handle, not the value.
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared(")?;
        self.0.read_recursive().fmt(f)?;
        write!(f, ")")
    }
}

// -----------------------------------------------------------------------------
// Reflection impls

impl<T: Describe> Describe for Shared<T> {
    fn type_tag() -> TypeTag {
        TypeTag::named("mirra::shared", "Shared").with_args(vec![T::type_tag()])
    }
}

impl<T: Reflect + Describe> Reflect for Shared<T> {
    #[inline]
    fn type_tag(&self) -> TypeTag {
        <Self as Describe>::type_tag()
    }

    #[inline]
    fn reflect_kind(&self) -> ReflectKind {
        ReflectKind::Shared
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Shared(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Shared(self)
    }

    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        *self = value.take::<Self>()?;
        Ok(())
    }

    /// Clones the handle: reference semantics, identity preserved.
    fn reflect_clone(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(self.clone()))
    }

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        let other = other.downcast_ref::<Self>()?;
        Some(self.ptr_eq(other))
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({})", <T as Describe>::type_tag())
    }
}

impl<T: Reflect + Describe> SharedNode for Shared<T> {
    fn object_id(&self) -> ObjectId {
        self.id()
    }

    fn alias(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn inner_tag(&self) -> TypeTag {
        <T as Describe>::type_tag()
    }

    fn with_inner(&self, f: &mut dyn FnMut(&dyn Reflect)) {
        f(&*self.0.read_recursive());
    }

    fn with_inner_mut(&self, f: &mut dyn FnMut(&mut dyn Reflect)) {
        f(&mut *self.0.write());
    }
}

impl<T: Reflect + Register + Default> Register for Shared<T> {
    fn type_meta() -> TypeMeta {
        TypeMeta::new::<Self>(ReflectKind::Shared)
            .with_default(|| Box::new(Shared::<T>::default()))
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_survives_cloning() {
        let a = Shared::new(5_i32);
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert!(a.ptr_eq(&b));

        let c = Shared::new(5_i32);
        assert_ne!(a.id(), c.id());
        assert_eq!(a.reflect_partial_eq(&c), Some(false));
    }

    #[test]
    fn alias_is_same_node() {
        let a = Shared::new(1_i32);
        let node: &dyn SharedNode = &a;
        let alias = node.alias();
        let alias = alias.take::<Shared<i32>>().unwrap();
        alias.with_mut(|v| *v = 9);
        assert_eq!(a.with(|v| *v), 9);
    }
}
