use serde_json::Value;

use crate::reflection::{Reflect, ReflectKind, ReflectMut};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Argument coercion

/// What normalization a scalar target expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarClass {
    Bool,
    Int,
    Float,
    Str,
    Other,
}

fn classify(tag: &TypeTag) -> ScalarClass {
    match tag.canonical().as_str() {
        "bool" => ScalarClass::Bool,
        "u8" | "u16" | "u32" | "u64" | "usize" | "i8" | "i16" | "i32" | "i64" | "isize" => {
            ScalarClass::Int
        }
        "f32" | "f64" => ScalarClass::Float,
        "alloc::string::String" => ScalarClass::Str,
        _ => ScalarClass::Other,
    }
}

/// Coerces a loosely-typed JSON argument to a value of `tag`.
///
/// String inputs are interpreted: booleans case-insensitively, numbers
/// range-checked (out-of-range text is an error, never a silent truncation),
/// enum tokens case-insensitively, dates through their ISO parser. Empty or
/// whitespace-only strings are rejected for every non-string target.
pub fn coerce(
    value: &Value,
    tag: &TypeTag,
    registry: &TypeRegistry,
) -> Result<Box<dyn Reflect>, String> {
    let meta = registry
        .meta(tag)
        .ok_or_else(|| format!("parameter type `{tag}` is not registered"))?;

    // Opaque token types take the string straight to their token ctor.
    if meta.kind() == ReflectKind::Opaque && meta.has_token_ctor() {
        let token = value
            .as_str()
            .ok_or_else(|| format!("expected a token string for `{tag}`"))?;
        return meta
            .from_token(token)
            .ok_or_else(|| format!("unknown token `{token}` for `{tag}`"));
    }

    if meta.kind() != ReflectKind::Scalar {
        return Err(format!("`{tag}` is not a coercible parameter type"));
    }

    // Fieldless enums coerce by variant name, case-insensitive.
    if !meta.variants().is_empty() {
        let token = value
            .as_str()
            .map(str::trim)
            .ok_or_else(|| format!("expected a variant name for `{tag}`"))?;
        if token.is_empty() {
            return Err("empty or whitespace-only input".to_owned());
        }
        return meta
            .from_token(token)
            .ok_or_else(|| format!("`{token}` is not a variant of `{tag}`"));
    }

    let normalized = normalize(value, classify(tag))?;
    let mut instance = meta
        .default_value()
        .ok_or_else(|| format!("`{tag}` cannot be constructed"))?;
    match instance.reflect_mut() {
        ReflectMut::Scalar(scalar) => scalar.set_from_value(&normalized)?,
        _ => return Err(format!("`{tag}` is not a scalar")),
    }
    Ok(instance)
}

fn normalize(value: &Value, class: ScalarClass) -> Result<Value, String> {
    // String targets accept any scalar payload, rendered as text.
    if class == ScalarClass::Str {
        return match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            other => Err(format!("cannot render `{other}` as a string")),
        };
    }

    let Value::String(s) = value else {
        // Already JSON-typed; the scalar impl range-checks.
        return Ok(value.clone());
    };

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("empty or whitespace-only input".to_owned());
    }

    match class {
        ScalarClass::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("`{trimmed}` is not a boolean")),
        },
        ScalarClass::Int => {
            if let Ok(signed) = trimmed.parse::<i64>() {
                Ok(Value::Number(signed.into()))
            } else if let Ok(unsigned) = trimmed.parse::<u64>() {
                Ok(Value::Number(unsigned.into()))
            } else {
                Err(format!("`{trimmed}` is not an integer in range"))
            }
        }
        ScalarClass::Float => {
            let parsed = trimmed
                .parse::<f64>()
                .map_err(|_| format!("`{trimmed}` is not a number"))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| format!("`{trimmed}` is not a finite number"))
        }
        // Dates and chars parse from the trimmed text in their scalar impl.
        ScalarClass::Other => Ok(Value::String(trimmed.to_owned())),
        ScalarClass::Str => unreachable!("handled above"),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booleans_are_case_insensitive() {
        let registry = TypeRegistry::new();
        let tag = registry.decode("bool").unwrap();
        for text in ["true", "True", "TRUE"] {
            let value = coerce(&json!(text), &tag, &registry).unwrap();
            assert_eq!(value.take::<bool>().unwrap(), true, "{text}");
        }
        assert!(coerce(&json!("yes"), &tag, &registry).is_err());
    }

    #[test]
    fn blank_input_is_rejected_for_non_strings() {
        let registry = TypeRegistry::new();
        let int = registry.decode("i32").unwrap();
        assert!(coerce(&json!(""), &int, &registry).is_err());
        assert!(coerce(&json!("   "), &int, &registry).is_err());

        // A string target keeps its whitespace.
        let string = registry.decode("alloc::string::String").unwrap();
        let kept = coerce(&json!("   "), &string, &registry).unwrap();
        assert_eq!(kept.take::<String>().unwrap(), "   ");
    }

    #[test]
    fn out_of_range_integers_fail() {
        let registry = TypeRegistry::new();
        let byte = registry.decode("u8").unwrap();
        assert!(coerce(&json!("300"), &byte, &registry).is_err());
        assert!(coerce(&json!("not-a-number"), &byte, &registry).is_err());

        let ok = coerce(&json!("250"), &byte, &registry).unwrap();
        assert_eq!(ok.take::<u8>().unwrap(), 250);
    }

    #[test]
    fn dates_parse_through_chrono() {
        let registry = TypeRegistry::new();
        let date = registry.decode("chrono::NaiveDate").unwrap();
        let value = coerce(&json!("2026-08-27"), &date, &registry).unwrap();
        assert_eq!(
            value.take::<chrono::NaiveDate>().unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 8, 27).unwrap()
        );
        assert!(coerce(&json!("2026-13-27"), &date, &registry).is_err());
    }
}
