use std::fmt;

use crate::reflection::{Describe, Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::registry::{Register, TypeMeta};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// TypeTag as a reflected value

// Type descriptors can themselves appear inside reflected data (operation
// metadata, schema feeds). They travel as a single canonical-identity token,
// not as a member tree.

impl Describe for TypeTag {
    fn type_tag() -> TypeTag {
        TypeTag::named("mirra::tag", "TypeTag")
    }
}

impl Reflect for TypeTag {
    #[inline]
    fn type_tag(&self) -> TypeTag {
        <Self as Describe>::type_tag()
    }

    #[inline]
    fn reflect_kind(&self) -> ReflectKind {
        ReflectKind::Opaque
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Opaque(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Opaque(self)
    }

    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        *self = value.take::<Self>()?;
        Ok(())
    }

    fn as_token(&self) -> Option<String> {
        Some(self.canonical())
    }

    fn reflect_clone(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(self.clone()))
    }

    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        other.downcast_ref::<Self>().map(|other| self == other)
    }

    fn reflect_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Register for TypeTag {
    fn type_meta() -> TypeMeta {
        TypeMeta::new::<Self>(ReflectKind::Opaque).with_tokens(&[], |token| {
            crate::tag::parse(token)
                .ok()
                .map(|tag| Box::new(tag) as Box<dyn Reflect>)
        })
    }
}
