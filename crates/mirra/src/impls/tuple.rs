use std::fmt;

use crate::reflection::{Describe, Reflect, ReflectKind, ReflectMut, ReflectRef, Tuple};
use crate::registry::{Register, TypeMeta, TypeRegistry};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Tuples

// Rust tuple syntax has no place in the identity grammar; tuples encode as
// the generic family `core::tuple::TupleN<..>`.

macro_rules! impl_tuple {
    ($family:literal; $($T:ident . $idx:tt),+) => {
        impl<$($T: Describe),+> Describe for ($($T,)+) {
            fn type_tag() -> TypeTag {
                TypeTag::named("core::tuple", $family)
                    .with_args(vec![$($T::type_tag()),+])
            }
        }

        impl<$($T: Reflect + Describe),+> Reflect for ($($T,)+) {
            #[inline]
            fn type_tag(&self) -> TypeTag {
                <Self as Describe>::type_tag()
            }

            #[inline]
            fn reflect_kind(&self) -> ReflectKind {
                ReflectKind::Tuple
            }

            #[inline]
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Tuple(self)
            }

            #[inline]
            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Tuple(self)
            }

            fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
                *self = value.take::<Self>()?;
                Ok(())
            }

            fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
                let other = other.downcast_ref::<Self>()?;
                $(
                    match self.$idx.reflect_partial_eq(other.$idx.as_reflect()) {
                        Some(true) => {}
                        result => return result,
                    }
                )+
                Some(true)
            }

            fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut tuple = f.debug_tuple("");
                $( tuple.field(&(&self.$idx as &dyn Reflect)); )+
                tuple.finish()
            }
        }

        impl<$($T: Reflect + Describe),+> Tuple for ($($T,)+) {
            fn element(&self, index: usize) -> Option<&dyn Reflect> {
                match index {
                    $( $idx => Some(&self.$idx as &dyn Reflect), )+
                    _ => None,
                }
            }

            fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
                match index {
                    $( $idx => Some(&mut self.$idx as &mut dyn Reflect), )+
                    _ => None,
                }
            }

            fn element_len(&self) -> usize {
                0 $( + { let _ = $idx; 1 } )+
            }
        }

        impl<$($T: Reflect + Register + Default),+> Register for ($($T,)+) {
            fn type_meta() -> TypeMeta {
                TypeMeta::new::<Self>(ReflectKind::Tuple)
                    .with_default(|| Box::new(($($T::default(),)+)))
            }

            fn register_dependencies(registry: &mut TypeRegistry) {
                $( registry.register::<$T>(); )+
            }
        }
    };
}

impl_tuple!("Tuple1"; A.0);
impl_tuple!("Tuple2"; A.0, B.1);
impl_tuple!("Tuple3"; A.0, B.1, C.2);
impl_tuple!("Tuple4"; A.0, B.1, C.2, D.3);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_tag() {
        let pair = (1_i32, "x".to_owned());
        assert_eq!(
            pair.type_tag().canonical(),
            "core::tuple::Tuple2<i32, alloc::string::String>"
        );
    }

    #[test]
    fn positional_access() {
        let mut triple = (1_i32, false, 2.5_f64);
        let tuple: &mut dyn Tuple = &mut triple;
        assert_eq!(tuple.element_len(), 3);
        assert!(tuple.element(3).is_none());

        tuple.element_mut(1).unwrap().set(Box::new(true)).unwrap();
        assert_eq!(triple.1, true);
    }
}
