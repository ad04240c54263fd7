use serde_json::Value;

use crate::convert::{ConvertCx, Converter, PopulateOutcome, PopulateReport};
use crate::error::ReflectError;
use crate::info::{MemberKind, VisibilityFilter};
use crate::journal::JournalLevel;
use crate::member::Member;
use crate::reflection::{Reflect, ReflectMut, ReflectRef};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// StructConverter

/// The universal fallback: walks named members through the reflection table.
///
/// Lowest non-zero priority, so any shape- or type-specific converter beats
/// it. Handles every struct the derive has touched, splitting members into
/// the wire's `fields` and `props` lists.
pub struct StructConverter;

impl Converter for StructConverter {
    fn priority(&self, _tag: &TypeTag, _registry: &TypeRegistry) -> u32 {
        100
    }

    fn serialize(
        &self,
        value: &dyn Reflect,
        _declared: &TypeTag,
        name: Option<&str>,
        recursive: bool,
        filter: VisibilityFilter,
        cx: &mut ConvertCx<'_, '_>,
    ) -> Result<Member, ReflectError> {
        let mut member = Member {
            name: name.map(str::to_owned),
            type_name: Some(value.type_tag().canonical()),
            ..Member::default()
        };

        let ReflectRef::Struct(value) = value.reflect_ref() else {
            // No structural access: emit an identity-only node.
            return Ok(member);
        };
        if !recursive {
            return Ok(member);
        }

        for info in value.member_infos() {
            if !filter.admits(info) {
                continue;
            }
            let Some(child) = value.member(info.name()) else {
                continue;
            };
            let serialized =
                cx.serialize_value(child, &info.tag(), Some(info.name()), recursive, filter)?;
            match info.kind() {
                MemberKind::Field => member.fields.push(serialized),
                MemberKind::Property => member.props.push(serialized),
            }
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

        match instance.reflect_mut() {
            ReflectMut::Struct(target) => {
                let infos = target.member_infos();
                for child in member.fields.iter().chain(&member.props) {
                    let Some(name) = child.name.as_deref() else {
                        continue;
                    };
                    let Some(info) = infos.iter().find(|info| info.name() == name) else {
                        cx.note(
                            JournalLevel::Warn,
                            &format!("ignoring unknown member `{name}`"),
                        );
                        continue;
                    };
                    let Some(slot) = target.member_mut(name) else {
                        continue;
                    };
                    if child.value == Some(Value::Null) {
                        if !slot.set_null() {
                            return Err(ReflectError::ValueMismatch {
                                expected: info.tag(),
                            });
                        }
                        continue;
                    }
                    let value = cx.deserialize_member(child, &info.tag())?;
                    slot.set(value).map_err(|_| ReflectError::ValueMismatch {
                        expected: info.tag(),
                    })?;
                }
            }
            _ if member.is_empty() => {}
            _ => {
                return Err(ReflectError::ValueMismatch {
                    expected: tag.clone(),
                });
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
        let ReflectMut::Struct(target) = target.reflect_mut() else {
            report.record(
                path,
                PopulateOutcome::Failed("target has no named members".into()),
            );
            return false;
        };

        let infos = target.member_infos();
        let mut ok = true;
        for child in member.fields.iter().chain(&member.props) {
            let Some(name) = child.name.as_deref() else {
                continue;
            };
            let child_path = format!("{path}/{name}");

            let Some(info) = infos.iter().find(|info| info.name() == name) else {
                report.record(child_path, PopulateOutcome::UnknownMember);
                continue;
            };
            if !filter.admits(info) {
                report.record(child_path, PopulateOutcome::Filtered);
                continue;
            }
            if info.is_read_only() {
                report.record(child_path, PopulateOutcome::MemberNotWritable);
                ok = false;
                continue;
            }
            let Some(slot) = target.member_mut(name) else {
                report.record(child_path, PopulateOutcome::UnknownMember);
                continue;
            };
            ok &= cx.populate_value(slot, child, filter, report);
        }
        ok
    }
}
