use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::reflection::{Describe, Reflect, ReflectKind, ReflectMut, ReflectRef, Scalar};
use crate::registry::{Register, TypeMeta};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Calendar scalars

// Dates serialize as ISO-8601 string tokens and parse back through chrono's
// `FromStr`.

macro_rules! impl_date_scalar {
    ($ty:ty, $ident:literal, $fmt:literal) => {
        impl Describe for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::named("chrono", $ident)
            }
        }

        impl Scalar for $ty {
            fn to_value(&self) -> Value {
                // Must match the type's `FromStr` shape, not its `Display`.
                Value::String(self.format($fmt).to_string())
            }

            fn set_from_value(&mut self, value: &Value) -> Result<(), String> {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("expected an ISO-8601 string, got `{value}`"))?;
                *self = s
                    .parse::<$ty>()
                    .map_err(|e| format!("cannot parse `{s}` as {}: {e}", $ident))?;
                Ok(())
            }
        }

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
                Some(Box::new(*self))
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

impl_date_scalar!(NaiveDate, "NaiveDate", "%Y-%m-%d");
impl_date_scalar!(NaiveDateTime, "NaiveDateTime", "%Y-%m-%dT%H:%M:%S%.f");

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_token_round_trip() {
        let mut date = NaiveDate::default();
        date.set_from_value(&serde_json::json!("2026-08-27")).unwrap();
        assert_eq!(date.to_value(), serde_json::json!("2026-08-27"));
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut date = NaiveDate::default();
        assert!(date.set_from_value(&serde_json::json!("not-a-date")).is_err());
        assert!(date.set_from_value(&serde_json::json!(20260827)).is_err());
    }

    #[test]
    fn datetime_parses_iso() {
        let mut dt = NaiveDateTime::default();
        dt.set_from_value(&serde_json::json!("2026-08-27T12:30:00"))
            .unwrap();
        assert_eq!(dt.to_value(), serde_json::json!("2026-08-27T12:30:00"));
    }
}
