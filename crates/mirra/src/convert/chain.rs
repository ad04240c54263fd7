use serde_json::Value;

use crate::context::GraphContext;
use crate::convert::{PopulateOutcome, PopulateReport};
use crate::error::ReflectError;
use crate::info::VisibilityFilter;
use crate::journal::{Journal, JournalLevel};
use crate::member::Member;
use crate::reflection::{Reflect, ReflectKind, ReflectRef};
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Converter

/// A conversion strategy for one family of types.
///
/// Converters are stateless; per-call traversal state travels in the
/// [`ConvertCx`], and recursion into child values goes back through the
/// context so the chain re-selects per child.
pub trait Converter: Send + Sync {
    /// Scores this converter's fit for `tag`. Zero means "cannot handle";
    /// the chain picks the highest non-zero score.
    fn priority(&self, tag: &TypeTag, registry: &TypeRegistry) -> u32;

    /// Converts `value` into a wire member.
    ///
    /// `declared` is the type the surrounding position declares for the
    /// value, which may be wider than the value's own tag. With `recursive`
    /// off, aggregates emit their identity without descending into children.
    fn serialize(
        &self,
        value: &dyn Reflect,
        declared: &TypeTag,
        name: Option<&str>,
        recursive: bool,
        filter: VisibilityFilter,
        cx: &mut ConvertCx<'_, '_>,
    ) -> Result<Member, ReflectError>;

    /// Builds a fresh value of `tag` from a wire member.
    fn deserialize(
        &self,
        member: &Member,
        tag: &TypeTag,
        cx: &mut ConvertCx<'_, '_>,
    ) -> Result<Box<dyn Reflect>, ReflectError>;

    /// Applies a wire member onto an existing value in place.
    ///
    /// Never aborts the walk: per-member outcomes land in `report`, and the
    /// return value is `true` only when every incoming member applied.
    fn populate(
        &self,
        target: &mut dyn Reflect,
        member: &Member,
        filter: VisibilityFilter,
        cx: &mut ConvertCx<'_, '_>,
        report: &mut PopulateReport,
    ) -> bool;
}

// -----------------------------------------------------------------------------
// ConverterChain

/// The registered converter set, in registration order.
pub struct ConverterChain {
    converters: Vec<Box<dyn Converter>>,
}

impl Default for ConverterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterChain {
    /// A chain pre-loaded with the built-in converters.
    pub fn new() -> Self {
        let mut chain = Self::empty();
        chain.register(Box::new(crate::convert::ScalarConverter));
        chain.register(Box::new(crate::convert::ListConverter));
        chain.register(Box::new(crate::convert::TupleConverter));
        chain.register(Box::new(crate::convert::TokenConverter));
        chain.register(Box::new(crate::convert::StructConverter));
        chain
    }

    /// A chain with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    /// Appends a converter. Order matters only for breaking score ties:
    /// the earlier registration wins.
    pub fn register(&mut self, converter: Box<dyn Converter>) {
        self.converters.push(converter);
    }

    /// Picks the converter for `tag`: highest non-zero score, first
    /// registered on ties.
    pub fn select(&self, tag: &TypeTag, registry: &TypeRegistry) -> Option<&dyn Converter> {
        let mut best: Option<(&dyn Converter, u32)> = None;
        for converter in &self.converters {
            let score = converter.priority(tag, registry);
            if score == 0 {
                continue;
            }
            // Strictly greater keeps the earlier registration on ties.
            if best.is_none_or(|(_, held)| score > held) {
                best = Some((converter.as_ref(), score));
            }
        }
        best.map(|(converter, _)| converter)
    }

    /// Number of registered converters.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

// -----------------------------------------------------------------------------
// ConvertCx

/// Everything one conversion call carries: the search scope, the chain, the
/// traversal state, and the optional journal.
///
/// Shared-node bookkeeping lives here rather than in any converter: the
/// context registers a node's identity before descending and hands out
/// reference markers on re-entry, so cyclic graphs stay finite regardless of
/// which converters run underneath.
// The journal lives on its own lifetime: the caller's sink outlives the
// per-call registry guard and graph, and `&mut` invariance would otherwise
// shackle them together.
pub struct ConvertCx<'a, 'j> {
    registry: &'a TypeRegistry,
    chain: &'a ConverterChain,
    graph: &'a mut GraphContext,
    journal: Option<&'j mut dyn Journal>,
}

impl<'a, 'j> ConvertCx<'a, 'j> {
    pub fn new(
        registry: &'a TypeRegistry,
        chain: &'a ConverterChain,
        graph: &'a mut GraphContext,
        journal: Option<&'j mut dyn Journal>,
    ) -> Self {
        Self {
            registry,
            chain,
            graph,
            journal,
        }
    }

    /// The decode scope for this call.
    #[inline]
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// The document path of the node currently being converted.
    pub fn current_path(&self) -> String {
        self.graph.current_path()
    }

    /// Current recursion depth.
    pub fn depth(&self) -> usize {
        self.graph.depth()
    }

    /// Emits a journal event at the current depth, if a sink is attached.
    pub fn note(&mut self, level: JournalLevel, message: &str) {
        let depth = self.graph.depth();
        if let Some(journal) = self.journal.as_deref_mut() {
            journal.event(level, depth, message);
        }
    }

    /// Resolves a member's declared identity against the registry, falling
    /// back to the position's declared tag when the wire omits one.
    pub fn resolve_tag(
        &self,
        member: &Member,
        fallback: &TypeTag,
    ) -> Result<TypeTag, ReflectError> {
        match member.type_name.as_deref() {
            Some(identity) => {
                self.registry
                    .decode(identity)
                    .ok_or_else(|| ReflectError::TypeNotFound {
                        identity: identity.to_owned(),
                    })
            }
            None => Ok(fallback.clone()),
        }
    }

    // ---- serialize ----------------------------------------------------------

    /// Converts `value` into a wire member, dispatching through the chain.
    pub fn serialize_value(
        &mut self,
        value: &dyn Reflect,
        declared: &TypeTag,
        name: Option<&str>,
        recursive: bool,
        filter: VisibilityFilter,
    ) -> Result<Member, ReflectError> {
        if let Some(name) = name {
            self.graph.enter(name);
        }
        let path = self.graph.current_path();
        let result = self
            .serialize_dispatch(value, declared, name, recursive, filter)
            .map_err(|err| err.at(&path));
        // `enter` no-ops on an empty segment; the pop must mirror that.
        if name.is_some_and(|name| !name.is_empty()) {
            self.graph.exit();
        }
        result
    }

    fn serialize_dispatch(
        &mut self,
        value: &dyn Reflect,
        declared: &TypeTag,
        name: Option<&str>,
        recursive: bool,
        filter: VisibilityFilter,
    ) -> Result<Member, ReflectError> {
        // Absent nullables short-circuit to an explicit null leaf.
        if value.is_null() {
            return Ok(Member::leaf(
                name.map(str::to_owned),
                Some(declared.canonical()),
                Value::Null,
            ));
        }

        // Shared nodes are handled here, before any converter: register the
        // identity, and emit a marker instead of descending a second time.
        if let ReflectRef::Shared(node) = value.reflect_ref() {
            let id = node.object_id();
            if !self.graph.try_register(id) {
                let target = self.graph.path_of(id);
                self.note(
                    JournalLevel::Info,
                    &format!("already visited, emitting reference to `{target}`"),
                );
                return Ok(Member::reference(name.map(str::to_owned), target));
            }

            let inner_declared = node.inner_tag();
            let mut out: Option<Result<Member, ReflectError>> = None;
            node.with_inner(&mut |inner| {
                if out.is_none() {
                    out = Some(self.serialize_value(
                        inner,
                        &inner_declared,
                        None,
                        recursive,
                        filter,
                    ));
                }
            });
            self.graph.unregister(id);

            let mut member = match out {
                Some(result) => result?,
                None => {
                    return Err(ReflectError::ValueMismatch {
                        expected: inner_declared,
                    });
                }
            };
            member.name = name.map(str::to_owned);
            member.type_name = Some(value.type_tag().canonical());
            return Ok(member);
        }

        let tag = value.type_tag();
        let chain = self.chain;
        let registry = self.registry;
        let converter =
            chain
                .select(&tag, registry)
                .ok_or_else(|| ReflectError::NoConverterAvailable { tag: tag.clone() })?;
        converter.serialize(value, declared, name, recursive, filter, self)
    }

    // ---- deserialize --------------------------------------------------------

    /// Builds a fresh value from a wire member, dispatching through the chain.
    pub fn deserialize_member(
        &mut self,
        member: &Member,
        fallback: &TypeTag,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        let named = member.name.as_deref().unwrap_or("");
        self.graph.enter(named);
        let path = self.graph.current_path();
        let result = self
            .deserialize_dispatch(member, fallback)
            .map_err(|err| err.at(&path));
        if !named.is_empty() {
            self.graph.exit();
        }
        result
    }

    fn deserialize_dispatch(
        &mut self,
        member: &Member,
        fallback: &TypeTag,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        if let Some(target) = member.reference_path() {
            return self
                .graph
                .resolve_alias(target)
                .ok_or_else(|| ReflectError::CycleResolutionFailed {
                    path: target.to_owned(),
                });
        }

        let tag = self.resolve_tag(member, fallback)?;

        // Shared wrappers are materialized here: the alias is recorded before
        // the inner value is filled, so a marker inside the subtree can point
        // back at this very node.
        if self
            .registry
            .meta(&tag)
            .is_some_and(|meta| meta.kind() == ReflectKind::Shared)
        {
            return self.deserialize_shared(member, &tag);
        }

        let chain = self.chain;
        let registry = self.registry;
        let converter =
            chain
                .select(&tag, registry)
                .ok_or_else(|| ReflectError::NoConverterAvailable { tag: tag.clone() })?;
        converter.deserialize(member, &tag, self)
    }

    fn deserialize_shared(
        &mut self,
        member: &Member,
        tag: &TypeTag,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        let meta = self
            .registry
            .meta(tag)
            .ok_or_else(|| ReflectError::TypeNotFound {
                identity: tag.canonical(),
            })?;
        let handle = meta
            .default_value()
            .ok_or_else(|| ReflectError::UninstantiableType { tag: tag.clone() })?;

        let ReflectRef::Shared(node) = handle.reflect_ref() else {
            return Err(ReflectError::ValueMismatch {
                expected: tag.clone(),
            });
        };
        self.graph
            .record_alias(self.graph.current_path(), node.alias());

        let inner_tag = node.inner_tag();
        // The member's own children describe the inner value; strip the
        // wrapper identity so the inner converter resolves against it.
        let mut inner_member = member.clone();
        inner_member.name = None;
        inner_member.type_name = None;

        let inner_value = self.deserialize_dispatch(&inner_member, &inner_tag)?;

        let ReflectRef::Shared(node) = handle.reflect_ref() else {
            return Err(ReflectError::ValueMismatch {
                expected: tag.clone(),
            });
        };
        let mut pending = Some(inner_value);
        let mut stored = true;
        node.with_inner_mut(&mut |slot| {
            if let Some(value) = pending.take() {
                stored = slot.set(value).is_ok();
            }
        });
        if !stored {
            return Err(ReflectError::ValueMismatch {
                expected: inner_tag,
            });
        }
        Ok(handle)
    }

    // ---- populate -----------------------------------------------------------

    /// Applies a wire member onto an existing value in place. Outcomes land
    /// in `report`; the return value is `true` only when everything applied.
    pub fn populate_value(
        &mut self,
        target: &mut dyn Reflect,
        member: &Member,
        filter: VisibilityFilter,
        report: &mut PopulateReport,
    ) -> bool {
        let named = member.name.as_deref().unwrap_or("");
        self.graph.enter(named);
        let ok = self.populate_dispatch(target, member, filter, report);
        if !named.is_empty() {
            self.graph.exit();
        }
        ok
    }

    fn populate_dispatch(
        &mut self,
        target: &mut dyn Reflect,
        member: &Member,
        filter: VisibilityFilter,
        report: &mut PopulateReport,
    ) -> bool {
        let path = self.graph.current_path();

        if member.is_reference() {
            report.record(
                path,
                PopulateOutcome::Failed("reference markers cannot be populated in place".into()),
            );
            return false;
        }

        // Explicit null clears nullable targets.
        if member.value == Some(Value::Null) {
            if target.set_null() {
                report.record(path, PopulateOutcome::Applied);
                return true;
            }
            report.record(
                path,
                PopulateOutcome::Failed("null payload on a non-nullable member".into()),
            );
            return false;
        }

        // Absent nullables need a value to write into.
        if target.is_null() && !target.ensure_present() {
            report.record(
                path,
                PopulateOutcome::Failed("absent member could not be materialized".into()),
            );
            return false;
        }

        // Shared targets populate through the lock.
        if target.reflect_kind() == ReflectKind::Shared {
            let crate::reflection::ReflectMut::Shared(node) = target.reflect_mut() else {
                report.record(path, PopulateOutcome::Failed("shared access failed".into()));
                return false;
            };
            let mut inner_member = member.clone();
            inner_member.name = None;
            inner_member.type_name = None;
            let mut ok = true;
            node.with_inner_mut(&mut |inner| {
                ok = self.populate_dispatch(inner, &inner_member, filter, report);
            });
            return ok;
        }

        let tag = target.type_tag();
        let chain = self.chain;
        let registry = self.registry;
        let Some(converter) = chain.select(&tag, registry) else {
            report.record(
                path,
                PopulateOutcome::Failed(format!("no converter available for `{tag}`")),
            );
            return false;
        };
        converter.populate(target, member, filter, self, report)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(u32);

    impl Converter for Stub {
        fn priority(&self, _tag: &TypeTag, _registry: &TypeRegistry) -> u32 {
            self.0
        }

        fn serialize(
            &self,
            _value: &dyn Reflect,
            _declared: &TypeTag,
            _name: Option<&str>,
            _recursive: bool,
            _filter: VisibilityFilter,
            _cx: &mut ConvertCx<'_, '_>,
        ) -> Result<Member, ReflectError> {
            unimplemented!("selection-only stub")
        }

        fn deserialize(
            &self,
            _member: &Member,
            _tag: &TypeTag,
            _cx: &mut ConvertCx<'_, '_>,
        ) -> Result<Box<dyn Reflect>, ReflectError> {
            unimplemented!("selection-only stub")
        }

        fn populate(
            &self,
            _target: &mut dyn Reflect,
            _member: &Member,
            _filter: VisibilityFilter,
            _cx: &mut ConvertCx<'_, '_>,
            _report: &mut PopulateReport,
        ) -> bool {
            unimplemented!("selection-only stub")
        }
    }

    #[test]
    fn selection_is_deterministic_under_registration_order() {
        let registry = TypeRegistry::new();
        let tag = registry.decode("i32").unwrap();

        let first = Box::new(Stub(7_000));
        let second = Box::new(Stub(7_000));
        let first_ptr = std::ptr::from_ref::<dyn Converter>(&*first).cast::<()>();

        let mut chain = ConverterChain::empty();
        chain.register(first);
        chain.register(second);

        // Equal scores: the earlier registration wins, every time.
        for _ in 0..3 {
            let selected = chain.select(&tag, &registry).unwrap();
            let selected_ptr = std::ptr::from_ref::<dyn Converter>(selected).cast::<()>();
            assert_eq!(selected_ptr, first_ptr);
        }
    }

    #[test]
    fn higher_score_beats_earlier_registration() {
        let registry = TypeRegistry::new();
        let tag = registry.decode("i32").unwrap();

        let low = Box::new(Stub(1_000));
        let high = Box::new(Stub(9_000));
        let high_ptr = std::ptr::from_ref::<dyn Converter>(&*high).cast::<()>();

        let mut chain = ConverterChain::empty();
        chain.register(low);
        chain.register(high);

        let selected = chain.select(&tag, &registry).unwrap();
        let selected_ptr = std::ptr::from_ref::<dyn Converter>(selected).cast::<()>();
        assert_eq!(selected_ptr, high_ptr);
    }

    #[test]
    fn empty_child_name_leaves_the_path_alone() {
        let registry = TypeRegistry::new();
        let chain = ConverterChain::new();
        let mut graph = GraphContext::new();
        graph.enter("parent");

        let declared = registry.decode("i32").unwrap();
        let mut cx = ConvertCx::new(&registry, &chain, &mut graph, None);
        cx.serialize_value(&1_i32, &declared, Some(""), true, VisibilityFilter::Public)
            .unwrap();
        drop(cx);

        // An empty segment is a no-op on both the push and the pop side.
        assert_eq!(graph.current_path(), "#/parent");
        assert_eq!(graph.depth(), 1);
    }

    #[test]
    fn zero_score_is_never_selected() {
        let registry = TypeRegistry::new();
        let tag = registry.decode("i32").unwrap();

        let mut chain = ConverterChain::empty();
        chain.register(Box::new(Stub(0)));
        assert!(chain.select(&tag, &registry).is_none());
    }
}
