use std::fmt;

use crate::reflection::{Describe, List, Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::registry::{Register, TypeMeta, TypeRegistry};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Vec<T>

impl<T: Describe> Describe for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::named("alloc::vec", "Vec").with_args(vec![T::type_tag()])
    }
}

impl<T: Reflect + Describe> Reflect for Vec<T> {
    #[inline]
    fn type_tag(&self) -> TypeTag {
        <Self as Describe>::type_tag()
    }

    #[inline]
    fn reflect_kind(&self) -> ReflectKind {
        ReflectKind::List
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }

    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        *self = value.take::<Self>()?;
        Ok(())
    }

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        let other = other.downcast_ref::<Self>()?;
        if self.len() != other.len() {
            return Some(false);
        }
        for (a, b) in self.iter().zip(other) {
            match a.reflect_partial_eq(b.as_reflect()) {
                Some(true) => {}
                other => return other,
            }
        }
        Some(true)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|e| e as &dyn Reflect))
            .finish()
    }
}

impl<T: Reflect + Describe> List for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|e| e as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|e| e as &mut dyn Reflect)
    }

    fn push(&mut self, element: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        self.push(element.take::<T>()?);
        Ok(())
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn element_tag(&self) -> TypeTag {
        <T as Describe>::type_tag()
    }
}

impl<T: Reflect + Register> Register for Vec<T> {
    fn type_meta() -> TypeMeta {
        TypeMeta::new::<Self>(ReflectKind::List).with_default(|| Box::new(Vec::<T>::new()))
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
    fn list_access() {
        let mut v: Vec<i32> = vec![1, 2];
        {
            let list: &mut dyn List = &mut v;
            list.push(Box::new(3_i32)).unwrap();
            assert_eq!(list.len(), 3);
            assert!(list.push(Box::new("no".to_owned())).is_err());
            assert_eq!(list.element_tag().canonical(), "i32");
        }
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn vec_tag() {
        let v: Vec<Vec<i32>> = Vec::new();
        assert_eq!(v.type_tag().canonical(), "alloc::vec::Vec<alloc::vec::Vec<i32>>");
    }
}
