use std::fmt;

use serde_json::Value;

use crate::reflection::{Describe, Reflect, ReflectKind, ReflectMut, ReflectRef, Scalar};
use crate::registry::{Register, TypeMeta};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Boilerplate shared by every scalar impl

macro_rules! impl_scalar_reflect {
    ($ty:ty) => {
        impl Reflect for $ty {
            #[inline]
            fn type_tag(&self) -> TypeTag {
                <Self as Describe>::type_tag()
            }

            #[inline]
            fn reflect_kind(&self) -> ReflectKind {
                ReflectKind::Scalar
            }

            #[inline]
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Scalar(self)
            }

            #[inline]
            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar(self)
            }

            fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
                *self = value.take::<Self>()?;
                Ok(())
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

        impl Register for $ty {
            fn type_meta() -> TypeMeta {
                TypeMeta::new::<Self>(ReflectKind::Scalar)
                    .with_default(|| Box::new(<$ty>::default()))
            }
        }
    };
}

macro_rules! impl_primitive_describe {
    ($($ty:ty => $ident:literal),* $(,)?) => {$(
        impl Describe for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::primitive($ident)
            }
        }
    )*};
}

impl_primitive_describe! {
    () => "unit",
    bool => "bool",
    char => "char",
    u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64", usize => "usize",
    i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64", isize => "isize",
    f32 => "f32", f64 => "f64",
}

impl Describe for String {
    fn type_tag() -> TypeTag {
        TypeTag::named("alloc::string", "String")
    }
}

// -----------------------------------------------------------------------------
// Signed integers

macro_rules! impl_signed_scalar {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            fn to_value(&self) -> Value {
                serde_json::json!(self)
            }

            fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
                let n = value
                    .as_i64()
                    .ok_or_else(|| format!("expected an integer, got `{value}`"))?;
                *self = <$ty>::try_from(n).map_err(|_| {
                    format!("value `{n}` is out of range for `{}`", stringify!($ty))
                })?;
                Ok(())
            }
        }

        impl_scalar_reflect!($ty);
    )*};
}

impl_signed_scalar!(i8, i16, i32, i64, isize);

// -----------------------------------------------------------------------------
// Unsigned integers

macro_rules! impl_unsigned_scalar {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            fn to_value(&self) -> Value {
                serde_json::json!(self)
            }

            fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
                let n = value
                    .as_u64()
                    .ok_or_else(|| format!("expected a non-negative integer, got `{value}`"))?;
                *self = <$ty>::try_from(n).map_err(|_| {
                    format!("value `{n}` is out of range for `{}`", stringify!($ty))
                })?;
                Ok(())
            }
        }

        impl_scalar_reflect!($ty);
    )*};
}

impl_unsigned_scalar!(u8, u16, u32, u64, usize);

// -----------------------------------------------------------------------------
// Floats

impl Scalar for f64 {
    fn to_value(&self) -> Value {
        serde_json::json!(self)
    }

    fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
        *self = value
            .as_f64()
            .ok_or_else(|| format!("expected a number, got `{value}`"))?;
        Ok(())
    }
}

impl_scalar_reflect!(f64);

impl Scalar for f32 {
    fn to_value(&self) -> Value {
        serde_json::json!(self)
    }

    fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
        let n = value
            .as_f64()
            .ok_or_else(|| format!("expected a number, got `{value}`"))?;
        let narrowed = n as f32;
        if n.is_finite() && narrowed.is_infinite() {
            return Err(format!("value `{n}` is out of range for `f32`"));
        }
        *self = narrowed;
        Ok(())
    }
}

impl_scalar_reflect!(f32);

// -----------------------------------------------------------------------------
// bool / char / String / unit

impl Scalar for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
        *self = value
            .as_bool()
            .ok_or_else(|| format!("expected a boolean, got `{value}`"))?;
        Ok(())
    }
}

impl_scalar_reflect!(bool);

impl Scalar for char {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
        let s = value
            .as_str()
            .ok_or_else(|| format!("expected a one-character string, got `{value}`"))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                *self = c;
                Ok(())
            }
            _ => Err(format!("expected exactly one character, got `{s}`")),
        }
    }
}

impl_scalar_reflect!(char);

impl Scalar for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
        *self = value
            .as_str()
            .ok_or_else(|| format!("expected a string, got `{value}`"))?
            .to_owned();
        Ok(())
    }
}

impl_scalar_reflect!(String);

impl Scalar for () {
    fn to_value(&self) -> Value {
        Value::Null
    }

    fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
        if value.is_null() {
            Ok(())
        } else {
            Err(format!("expected null, got `{value}`"))
        }
    }
}

impl_scalar_reflect!(());

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        let mut x = 0_i32;
        x.set_from_value(&serde_json::json!(41)).unwrap();
        assert_eq!(x, 41);
        assert_eq!(x.to_value(), serde_json::json!(41));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut x = 0_u8;
        let err = x.set_from_value(&serde_json::json!(300)).unwrap_err();
        assert!(err.contains("out of range"), "{err}");
        assert_eq!(x, 0);
    }

    #[test]
    fn negative_into_unsigned_is_rejected() {
        let mut x = 0_u32;
        assert!(x.set_from_value(&serde_json::json!(-1)).is_err());
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let mut x = 0_i32;
        assert!(x.set_from_value(&serde_json::json!("41")).is_err());
        assert!(x.set_from_value(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn char_needs_exactly_one() {
        let mut c = 'a';
        c.set_from_value(&serde_json::json!("z")).unwrap();
        assert_eq!(c, 'z');
        assert!(c.set_from_value(&serde_json::json!("zz")).is_err());
        assert!(c.set_from_value(&serde_json::json!("")).is_err());
    }

    #[test]
    fn scalar_partial_eq() {
        let a: Box<dyn Reflect> = Box::new(5_i64);
        let b: Box<dyn Reflect> = Box::new(5_i64);
        let c: Box<dyn Reflect> = Box::new(5_i32);
        assert_eq!(a.reflect_partial_eq(&*b), Some(true));
        assert_eq!(a.reflect_partial_eq(&*c), None);
    }
}
