use std::fmt;

use crate::reflection::{Describe, Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::registry::{Register, TypeMeta, TypeRegistry};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Option<T>

// The nullable wrapper is transparent: an `Option<T>` carries `T`'s identity
// and delegates reflection to the inner value when present. Optionality lives
// on the member, not on the type.

impl<T: Describe> Describe for Option<T> {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }
}

impl<T: Reflect + Describe + Default> Reflect for Option<T> {
    #[inline]
    fn type_tag(&self) -> TypeTag {
        <T as Describe>::type_tag()
    }

    fn reflect_kind(&self) -> ReflectKind {
        match self {
            Some(inner) => inner.reflect_kind(),
            None => ReflectKind::Opaque,
        }
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        match self {
            Some(inner) => inner.reflect_ref(),
            None => ReflectRef::Opaque(self),
        }
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        match self {
            Some(inner) => inner.reflect_mut(),
            None => ReflectMut::Opaque(self),
        }
    }

    /// Accepts either `Option<T>` or a bare `T` (wrapped into `Some`).
    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        match value.take::<Self>() {
            Ok(v) => {
                *self = v;
                Ok(())
            }
            Err(value) => {
                *self = Some(value.take::<T>()?);
                Ok(())
            }
        }
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn set_null(&mut self) -> bool {
        *self = None;
        true
    }

    fn ensure_present(&mut self) -> bool {
        if self.is_none() {
            *self = Some(T::default());
        }
        true
    }

    fn reflect_clone(&self) -> Option<Box<dyn Reflect>> {
        match self {
            None => Some(Box::new(None::<T>)),
            Some(inner) => {
                let cloned = inner.reflect_clone()?.take::<T>().ok()?;
                Some(Box::new(Some(cloned)))
            }
        }
    }

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        let other = other.downcast_ref::<Self>()?;
        match (self, other) {
            (None, None) => Some(true),
            (Some(a), Some(b)) => a.reflect_partial_eq(b.as_reflect()),
            _ => Some(false),
        }
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(inner) => {
                write!(f, "Some(")?;
                inner.reflect_debug(f)?;
                write!(f, ")")
            }
            None => write!(f, "None"),
        }
    }
}

impl<T: Reflect + Register + Default> Register for Option<T> {
    fn type_meta() -> TypeMeta {
        T::type_meta()
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        T::register_dependencies(registry);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_transparent() {
        let some: Option<i32> = Some(1);
        assert_eq!(some.type_tag().canonical(), "i32");
        assert_eq!(some.reflect_kind(), ReflectKind::Scalar);
        assert!(!some.is_null());

        let none: Option<i32> = None;
        assert!(none.is_null());
        assert_eq!(none.reflect_kind(), ReflectKind::Opaque);
    }

    #[test]
    fn set_accepts_bare_inner() {
        let mut target: Option<i32> = None;
        target.set(Box::new(7_i32)).unwrap();
        assert_eq!(target, Some(7));

        target.set(Box::new(None::<i32>)).unwrap();
        assert_eq!(target, None);
    }

    #[test]
    fn ensure_present_materializes_default() {
        let mut target: Option<String> = None;
        assert!(target.ensure_present());
        assert_eq!(target, Some(String::new()));
    }
}
