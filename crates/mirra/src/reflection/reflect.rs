use std::any::{Any, TypeId};
use std::fmt;

use crate::reflection::{ReflectKind, ReflectMut, ReflectRef};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// ObjectId

/// Reference identity of a shared object.
///
/// Two handles aliasing the same allocation compare equal; two distinct
/// allocations holding equal values do not. Plain (non-shared) values have no
/// `ObjectId` at all.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Builds an identity from an allocation address.
    #[inline]
    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr as *const () as usize)
    }
}

// -----------------------------------------------------------------------------
// Reflect

/// The foundational capability trait for runtime reflection.
///
/// Enables dynamic access and modification of data without compile-time type
/// information. It is strongly recommended to use
/// [`#[derive(Reflect)]`](mirra_derive::Reflect) rather than implementing this
/// trait by hand; the derive also implements the matching access trait
/// ([`Struct`](crate::reflection::Struct) for named-field structs, scalar
/// token access for fieldless enums) and the registration plumbing.
///
/// # Type identification
///
/// [`Any::type_id`] on a `Box<dyn Reflect>` reports the box, not the value.
/// Use [`Reflect::ty_id`] instead:
///
/// ```
/// use mirra::reflection::Reflect;
/// use std::any::{Any, TypeId};
///
/// let x: Box<dyn Reflect> = Box::new(32_i32);
/// assert!(x.type_id() != TypeId::of::<i32>());
/// assert!(x.ty_id() == TypeId::of::<i32>());
/// ```
pub trait Reflect: Any + Send + Sync {
    /// The [`TypeTag`] describing this value's type.
    fn type_tag(&self) -> TypeTag;

    /// Returns the [`TypeId`] of the underlying type.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Casts to a fully-reflected value.
    #[inline(always)]
    fn as_reflect(&self) -> &dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Casts to a mutable fully-reflected value.
    #[inline(always)]
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// A pure enumeration of this value's reflection [kind](ReflectKind).
    fn reflect_kind(&self) -> ReflectKind;

    /// Immutable access cast to the matching reflection subtrait.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Mutable access cast to the matching reflection subtrait.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Performs a type-checked assignment of a reflected value to this value.
    ///
    /// Returns the input back on type mismatch.
    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Whether this value is an absent nullable (`Option::None`).
    #[inline]
    fn is_null(&self) -> bool {
        false
    }

    /// Sets a nullable value to absent. Returns `false` for non-nullable types.
    #[inline]
    fn set_null(&mut self) -> bool {
        false
    }

    /// Ensures a nullable value is present, default-constructing the inner
    /// value when absent. Non-nullable types are always present.
    #[inline]
    fn ensure_present(&mut self) -> bool {
        true
    }

    /// The value's single-token rendering, for opaque token types.
    ///
    /// Types that serialize as one self-describing string (a type descriptor,
    /// for example) return it here; everything else returns `None`.
    #[inline]
    fn as_token(&self) -> Option<String> {
        None
    }

    /// Attempts to clone the value behind the trait object.
    ///
    /// Scalar and container impls support this; derived structs only when
    /// marked `#[reflect(clone)]`.
    #[inline]
    fn reflect_clone(&self) -> Option<Box<dyn Reflect>> {
        None
    }

    /// Compares against another reflected value, if the type supports it.
    #[inline]
    fn reflect_partial_eq(&self, _other: &dyn Reflect) -> Option<bool> {
        None
    }

    /// Debug formatter for the value.
    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(..)", self.type_tag())
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }

    /// Downcasts the value to type `T`, consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    pub fn downcast<T: Any>(self: Box<dyn Reflect>) -> Result<Box<T>, Box<dyn Reflect>> {
        if self.is::<T>() {
            let any: Box<dyn Any> = self;
            match any.downcast::<T>() {
                Ok(value) => Ok(value),
                Err(_) => unreachable!("type identity checked above"),
            }
        } else {
            Err(self)
        }
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        self.downcast::<T>().map(|boxed| *boxed)
    }
}

impl fmt::Debug for dyn Reflect {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_round_trip() {
        let x: Box<dyn Reflect> = Box::new(7_i64);
        assert!(x.is::<i64>());
        assert!(!x.is::<i32>());

        let x = x.take::<i64>().unwrap();
        assert_eq!(x, 7);
    }

    #[test]
    fn downcast_mismatch_returns_value() {
        let x: Box<dyn Reflect> = Box::new(7_i64);
        let x = x.downcast::<bool>().unwrap_err();
        assert_eq!(*x.downcast_ref::<i64>().unwrap(), 7);
    }
}
