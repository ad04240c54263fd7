use crate::convert::{ConvertCx, Converter, PopulateOutcome, PopulateReport};
use crate::error::ReflectError;
use crate::info::VisibilityFilter;
use crate::member::Member;
use crate::reflection::{Reflect, ReflectKind};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// TokenConverter

/// Converter for opaque single-token types.
///
/// Some types serialize as one self-describing string rather than a member
/// tree; a type descriptor is the canonical example. Claiming them here
/// keeps the universal struct fallback from trying (and failing) to walk
/// their members.
pub struct TokenConverter;

impl Converter for TokenConverter {
    fn priority(&self, tag: &TypeTag, registry: &TypeRegistry) -> u32 {
        match registry.meta(tag) {
            Some(meta) if meta.kind() == ReflectKind::Opaque && meta.has_token_ctor() => 5_000,
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
        let token = value
            .as_token()
            .ok_or_else(|| ReflectError::ValueMismatch {
                expected: declared.clone(),
            })?;
        Ok(Member::leaf(
            name.map(str::to_owned),
            Some(value.type_tag().canonical()),
            serde_json::Value::String(token),
        ))
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
        let token = member
            .value
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ReflectError::ScalarMismatch {
                tag: tag.clone(),
                reason: "expected a token string".to_owned(),
            })?;
        meta.from_token(token)
            .ok_or_else(|| ReflectError::ScalarMismatch {
                tag: tag.clone(),
                reason: format!("unknown token `{token}`"),
            })
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
        let tag = target.type_tag();
        match self.deserialize(member, &tag, cx) {
            Ok(value) => match target.set(value) {
                Ok(()) => {
                    report.record(path, PopulateOutcome::Applied);
                    true
                }
                Err(_) => {
                    report.record(
                        path,
                        PopulateOutcome::Failed(format!("value does not match `{tag}`")),
                    );
                    false
                }
            },
            Err(err) => {
                report.record(path, PopulateOutcome::Failed(err.to_string()));
                false
            }
        }
    }
}
