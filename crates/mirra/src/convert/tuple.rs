use crate::convert::{ConvertCx, Converter, PopulateOutcome, PopulateReport};
use crate::error::ReflectError;
use crate::info::VisibilityFilter;
use crate::member::Member;
use crate::reflection::{Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::registry::TypeRegistry;
use crate::tag::{TagKind, TypeTag};

// -----------------------------------------------------------------------------
// TupleConverter

/// Shape converter for fixed-arity positional aggregates.
pub struct TupleConverter;

impl Converter for TupleConverter {
    fn priority(&self, tag: &TypeTag, registry: &TypeRegistry) -> u32 {
        // Tuple identities are recognizable even before registration.
        if let TagKind::Named { module, .. } = tag.kind() {
            if module == "core::tuple" {
                return 6_000;
            }
        }
        match registry.meta(tag) {
            Some(meta) if meta.kind() == ReflectKind::Tuple => 6_000,
            _ => 0,
        }
    }

    fn serialize(
        &self,
        value: &dyn Reflect,
        declared: &TypeTag,
        name: Option<&str>,
        recursive: bool,
        filter: VisibilityFilter,
        cx: &mut ConvertCx<'_, '_>,
    ) -> Result<Member, ReflectError> {
        let ReflectRef::Tuple(tuple) = value.reflect_ref() else {
            return Err(ReflectError::ValueMismatch {
                expected: declared.clone(),
            });
        };

        let mut member = Member {
            name: name.map(str::to_owned),
            type_name: Some(value.type_tag().canonical()),
            ..Member::default()
        };
        if !recursive {
            return Ok(member);
        }

        for index in 0..tuple.element_len() {
            let Some(element) = tuple.element(index) else { break };
            let element_declared = element.type_tag();
            let child = cx.serialize_value(
                element,
                &element_declared,
                Some(&index.to_string()),
                recursive,
                filter,
            )?;
            member.items.push(child);
        }
        Ok(member)
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
        let mut instance = meta
            .default_value()
            .ok_or_else(|| ReflectError::UninstantiableType { tag: tag.clone() })?;

        {
            let ReflectMut::Tuple(tuple) = instance.reflect_mut() else {
                return Err(ReflectError::ValueMismatch {
                    expected: tag.clone(),
                });
            };
            for (index, item) in member.items.iter().enumerate() {
                let Some(slot) = tuple.element_mut(index) else {
                    return Err(ReflectError::UnknownMember {
                        tag: tag.clone(),
                        member: index.to_string(),
                    });
                };
                let slot_tag = slot.type_tag();
                let element = cx.deserialize_member(item, &slot_tag)?;
                slot.set(element).map_err(|_| ReflectError::ValueMismatch {
                    expected: slot_tag,
                })?;
            }
        }
        Ok(instance)
    }

    fn populate(
        &self,
        target: &mut dyn Reflect,
        member: &Member,
        filter: VisibilityFilter,
        cx: &mut ConvertCx<'_, '_>,
        report: &mut PopulateReport,
    ) -> bool {
        let path = cx.current_path();
        let ReflectMut::Tuple(tuple) = target.reflect_mut() else {
            report.record(path, PopulateOutcome::Failed("target is not a tuple".into()));
            return false;
        };

        let mut ok = true;
        for (index, item) in member.items.iter().enumerate() {
            let Some(slot) = tuple.element_mut(index) else {
                report.record(
                    format!("{path}/{index}"),
                    PopulateOutcome::Failed("index out of arity".into()),
                );
                ok = false;
                continue;
            };
            ok &= cx.populate_value(slot, item, filter, report);
        }
        ok
    }
}
