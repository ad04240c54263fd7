use crate::convert::{ConvertCx, Converter, PopulateOutcome, PopulateReport};
use crate::error::ReflectError;
use crate::info::VisibilityFilter;
use crate::member::Member;
use crate::reflection::{Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// ScalarConverter

/// Leaf converter for primitive values and fieldless enums.
///
/// Highest-priority built-in: an exact scalar registration beats every
/// shape-based match.
pub struct ScalarConverter;

impl Converter for ScalarConverter {
    fn priority(&self, tag: &TypeTag, registry: &TypeRegistry) -> u32 {
        match registry.meta(tag) {
            Some(meta) if meta.kind() == ReflectKind::Scalar => 10_000,
            _ => 0,
        }
    }

    fn serialize(
        &self,
        value: &dyn Reflect,
        declared: &TypeTag,
        name: Option<&str>,
        _recursive: bool,
        _filter: VisibilityFilter,
        _cx: &mut ConvertCx<'_, '_>,
    ) -> Result<Member, ReflectError> {
        match value.reflect_ref() {
            ReflectRef::Scalar(scalar) => Ok(Member::leaf(
                name.map(str::to_owned),
                Some(value.type_tag().canonical()),
                scalar.to_value(),
            )),
            _ => Err(ReflectError::ValueMismatch {
                expected: declared.clone(),
            }),
        }
    }

    fn deserialize(
        &self,
        member: &Member,
        tag: &TypeTag,
        cx: &mut ConvertCx<'_, '_>,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        let meta = cx
            .registry()
            .meta(tag)
            .ok_or_else(|| ReflectError::TypeNotFound {
                identity: tag.canonical(),
            })?;

        // Default-construct, or fall back to the token ctor for enums that
        // have no default variant.
        let mut instance = meta
            .default_value()
            .or_else(|| {
                member
                    .value
                    .as_ref()
                    .and_then(serde_json::Value::as_str)
                    .and_then(|token| meta.from_token(token))
            })
            .ok_or_else(|| ReflectError::UninstantiableType { tag: tag.clone() })?;

        if let Some(value) = member.value.as_ref().filter(|v| !v.is_null()) {
            match instance.reflect_mut() {
                ReflectMut::Scalar(scalar) => {
                    scalar
                        .set_from_value(value)
                        .map_err(|reason| ReflectError::ScalarMismatch {
                            tag: tag.clone(),
                            reason,
                        })?;
                }
                _ => {
                    return Err(ReflectError::ValueMismatch {
                        expected: tag.clone(),
                    });
                }
            }
        }
        Ok(instance)
    }

    fn populate(
        &self,
        target: &mut dyn Reflect,
        member: &Member,
        _filter: VisibilityFilter,
        cx: &mut ConvertCx<'_, '_>,
        report: &mut PopulateReport,
    ) -> bool {
        let path = cx.current_path();
        let ReflectMut::Scalar(scalar) = target.reflect_mut() else {
            report.record(
                path,
                PopulateOutcome::Failed("target is not a scalar".into()),
            );
            return false;
        };

        match member.value.as_ref().filter(|v| !v.is_null()) {
            Some(value) => match scalar.set_from_value(value) {
                Ok(()) => {
                    report.record(path, PopulateOutcome::Applied);
                    true
                }
                Err(reason) => {
                    report.record(path, PopulateOutcome::Failed(reason));
                    false
                }
            },
            // Nothing to apply: the member carried no payload.
            None => {
                report.record(path, PopulateOutcome::Applied);
                true
            }
        }
    }
}
