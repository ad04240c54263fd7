use crate::convert::{ConvertCx, Converter, PopulateOutcome, PopulateReport};
use crate::error::ReflectError;
use crate::info::VisibilityFilter;
use crate::journal::JournalLevel;
use crate::member::Member;
use crate::reflection::{Reflect, ReflectKind, ReflectMut, ReflectRef};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// ListConverter

/// Shape converter for ordered sequences.
///
/// Elements travel as index-named members under `items`; populate replaces
/// the whole sequence rather than merging positionally.
pub struct ListConverter;

impl Converter for ListConverter {
    fn priority(&self, tag: &TypeTag, registry: &TypeRegistry) -> u32 {
        if tag.is_array() {
            return 8_000;
        }
        match registry.meta(tag) {
            Some(meta) if meta.kind() == ReflectKind::List => 8_000,
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
        let ReflectRef::List(list) = value.reflect_ref() else {
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

        let element_declared = list.element_tag();
        for index in 0..list.len() {
            let Some(element) = list.get(index) else { break };
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
            let ReflectMut::List(list) = instance.reflect_mut() else {
                return Err(ReflectError::ValueMismatch {
                    expected: tag.clone(),
                });
            };
            let element_tag = list.element_tag();
            for item in &member.items {
                let element = cx.deserialize_member(item, &element_tag)?;
                list.push(element).map_err(|_| ReflectError::ValueMismatch {
                    expected: element_tag.clone(),
                })?;
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
        let ReflectMut::List(list) = target.reflect_mut() else {
            report.record(path, PopulateOutcome::Failed("target is not a list".into()));
            return false;
        };

        // In-place list population is wholesale replacement.
        list.clear();
        let element_tag = list.element_tag();
        let mut ok = true;
        for item in &member.items {
            match cx.deserialize_member(item, &element_tag) {
                Ok(element) => {
                    if list.push(element).is_err() {
                        let index = item.name.as_deref().unwrap_or("?");
                        report.record(
                            format!("{path}/{index}"),
                            PopulateOutcome::Failed(format!(
                                "element does not match `{element_tag}`"
                            )),
                        );
                        ok = false;
                    }
                }
                Err(err) => {
                    cx.note(JournalLevel::Warn, &format!("skipping element: {err}"));
                    let index = item.name.as_deref().unwrap_or("?");
                    report.record(
                        format!("{path}/{index}"),
                        PopulateOutcome::Failed(err.to_string()),
                    );
                    ok = false;
                }
            }
        }
        if ok {
            report.record(path, PopulateOutcome::Applied);
        }
        ok
    }
}
