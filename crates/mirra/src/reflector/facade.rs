use std::sync::Arc;

use serde_json::{Map, Value};

use crate::cache::MetaCache;
use crate::context::GraphContext;
use crate::convert::{ConvertCx, Converter, ConverterChain, PopulateReport};
use crate::error::{InvokeError, ReflectError};
use crate::info::VisibilityFilter;
use crate::invoke::{MatchLevel, OpHandler, OperationDescriptor, OperationRegistry};
use crate::journal::Journal;
use crate::member::Member;
use crate::reflection::Reflect;
use crate::reflector::{OperationSchema, TypeSchema};
use crate::registry::{Register, TypeRegistryArc};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Reflector

/// The engine facade.
///
/// Owns the type registry, the converter chain, the metadata cache, and the
/// operation registry. Conversion calls each get a fresh traversal context,
/// so a `Reflector` behind an `Arc` serves concurrent callers; setup
/// (registering converters and operations) takes `&mut self` and belongs
/// before sharing.
///
/// # Example
///
/// ```
/// use mirra::reflector::Reflector;
/// use mirra::info::VisibilityFilter;
///
/// let reflector = Reflector::new();
/// let member = reflector
///     .serialize(&42_i32, VisibilityFilter::Public)
///     .unwrap();
/// assert_eq!(member.value, Some(serde_json::json!(42)));
/// ```
pub struct Reflector {
    registry: TypeRegistryArc,
    chain: ConverterChain,
    cache: MetaCache,
    operations: OperationRegistry,
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new()
    }
}

impl Reflector {
    /// A reflector over a fresh registry pre-loaded with the primitives and
    /// the built-in converter chain.
    pub fn new() -> Self {
        Self::with_registry(TypeRegistryArc::new(crate::registry::TypeRegistry::new()))
    }

    /// A reflector sharing an existing registry handle.
    pub fn with_registry(registry: TypeRegistryArc) -> Self {
        Self {
            registry,
            chain: ConverterChain::new(),
            cache: MetaCache::new(),
            operations: OperationRegistry::new(),
        }
    }

    /// The shared registry handle.
    #[inline]
    pub fn registry(&self) -> &TypeRegistryArc {
        &self.registry
    }

    /// Registers `T` (and its dependencies) and invalidates cached metadata.
    pub fn register_type<T: Register>(&self) {
        self.registry.write().register::<T>();
        self.cache.clear();
    }

    /// Appends a custom converter; ties against built-ins resolve in favor
    /// of whichever registered first.
    pub fn register_converter(&mut self, converter: Box<dyn Converter>) {
        self.chain.register(converter);
    }

    /// Registers an invokable operation.
    pub fn register_operation(&mut self, descriptor: OperationDescriptor, handler: OpHandler) {
        tracing::debug!(operation = %descriptor.qualified_name(), "register operation");
        self.operations.register(descriptor, handler);
    }

    /// The operation registry, for discovery queries.
    #[inline]
    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    // ---- conversion ---------------------------------------------------------

    /// Serializes a reflected value into a wire member.
    pub fn serialize(
        &self,
        value: &dyn Reflect,
        filter: VisibilityFilter,
    ) -> Result<Member, ReflectError> {
        self.serialize_with(value, filter, None)
    }

    /// [`serialize`](Self::serialize) with a journal attached.
    pub fn serialize_with(
        &self,
        value: &dyn Reflect,
        filter: VisibilityFilter,
        journal: Option<&mut dyn Journal>,
    ) -> Result<Member, ReflectError> {
        let declared = value.type_tag();
        tracing::debug!(tag = %declared, "serialize");
        let registry = self.registry.read();
        let mut graph = GraphContext::new();
        let mut cx = ConvertCx::new(&registry, &self.chain, &mut graph, journal);
        cx.serialize_value(value, &declared, None, true, filter)
    }

    /// Builds a fresh value from a wire member.
    ///
    /// `fallback` supplies the type when the wire omits `typeName` at the
    /// root; a document carrying its own identity does not need one.
    pub fn deserialize(
        &self,
        member: &Member,
        fallback: Option<&TypeTag>,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        self.deserialize_with(member, fallback, None)
    }

    /// [`deserialize`](Self::deserialize) with a journal attached.
    pub fn deserialize_with(
        &self,
        member: &Member,
        fallback: Option<&TypeTag>,
        journal: Option<&mut dyn Journal>,
    ) -> Result<Box<dyn Reflect>, ReflectError> {
        let fallback = match (member.type_name.as_deref(), fallback) {
            (_, Some(tag)) => tag.clone(),
            // The wire identity wins anyway; the placeholder is never read.
            (Some(_), None) => TypeTag::primitive("unit"),
            (None, None) => {
                return Err(ReflectError::TypeNotFound {
                    identity: "<unspecified>".to_owned(),
                });
            }
        };
        tracing::debug!(tag = %fallback, "deserialize");
        let registry = self.registry.read();
        let mut graph = GraphContext::new();
        let mut cx = ConvertCx::new(&registry, &self.chain, &mut graph, journal);
        cx.deserialize_member(member, &fallback)
    }

    /// Applies a wire member onto an existing value in place.
    ///
    /// Partial-failure tolerant: the report lists the outcome per member,
    /// and everything applicable is applied even when some members fail.
    pub fn populate(
        &self,
        target: &mut dyn Reflect,
        member: &Member,
        filter: VisibilityFilter,
    ) -> PopulateReport {
        self.populate_with(target, member, filter, None)
    }

    /// [`populate`](Self::populate) with a journal attached.
    pub fn populate_with(
        &self,
        target: &mut dyn Reflect,
        member: &Member,
        filter: VisibilityFilter,
        journal: Option<&mut dyn Journal>,
    ) -> PopulateReport {
        tracing::debug!(tag = %target.type_tag(), "populate");
        let registry = self.registry.read();
        let mut graph = GraphContext::new();
        let mut report = PopulateReport::new();
        let mut cx = ConvertCx::new(&registry, &self.chain, &mut graph, journal);
        cx.populate_value(target, member, filter, &mut report);
        report
    }

    // ---- construction -------------------------------------------------------

    /// Builds a default instance of the type named by a canonical identity.
    pub fn create_instance(&self, identity: &str) -> Result<Box<dyn Reflect>, ReflectError> {
        let registry = self.registry.read();
        let tag = registry
            .decode(identity)
            .ok_or_else(|| ReflectError::TypeNotFound {
                identity: identity.to_owned(),
            })?;
        registry
            .meta(&tag)
            .ok_or_else(|| ReflectError::TypeNotFound {
                identity: identity.to_owned(),
            })?
            .default_value()
            .ok_or(ReflectError::UninstantiableType { tag })
    }

    /// The default value for a registered tag, if constructible.
    pub fn get_default_value(&self, tag: &TypeTag) -> Option<Box<dyn Reflect>> {
        self.registry.read().meta(tag)?.default_value()
    }

    // ---- metadata -----------------------------------------------------------

    /// Snapshot of every registered tag, memoized until the next
    /// registration through this facade.
    pub fn all_types(&self) -> Arc<Vec<TypeTag>> {
        self.cache.all_types(&self.registry.read())
    }

    /// The metadata feed for one type: member names, identities, and
    /// descriptions, filtered by visibility.
    pub fn type_schema(&self, tag: &TypeTag, filter: VisibilityFilter) -> Option<TypeSchema> {
        let registry = self.registry.read();
        let meta = registry.meta(tag)?;
        let members = self.cache.members(&registry, tag, filter)?;
        Some(TypeSchema {
            identity: tag.canonical(),
            kind: meta.kind().to_string(),
            docs: meta.docs(),
            members: members
                .iter()
                .map(crate::reflector::MemberSchema::from_info)
                .collect(),
        })
    }

    /// The metadata feed for every registered operation.
    pub fn operation_schemas(&self) -> Vec<OperationSchema> {
        self.operations
            .descriptors()
            .map(OperationSchema::from_descriptor)
            .collect()
    }

    // ---- invocation ---------------------------------------------------------

    /// Locates and invokes a synchronous operation; see
    /// [`OperationRegistry::invoke`].
    pub fn invoke(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
        args: &Map<String, Value>,
    ) -> Result<Box<dyn Reflect>, InvokeError> {
        tracing::debug!(name = name_query, "invoke");
        let registry = self.registry.read();
        self.operations
            .invoke(type_query, type_level, name_query, name_level, args, &registry)
    }

    /// Async counterpart of [`invoke`](Self::invoke). Resolution and
    /// coercion happen before this returns; the future runs the handler.
    pub fn invoke_async(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
        args: &Map<String, Value>,
    ) -> futures_lite::future::Boxed<Result<Box<dyn Reflect>, InvokeError>> {
        tracing::debug!(name = name_query, "invoke (async)");
        let registry = self.registry.read();
        self.operations
            .invoke_async(type_query, type_level, name_query, name_level, args, &registry)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::Reflect;
    use crate::convert::PopulateOutcome;
    use crate::impls::Shared;
    use crate::invoke::ParamInfo;
    use crate::reflection::{Describe, ReflectRef, Scalar};

    #[derive(Reflect, Default)]
    struct Account {
        pub name: String,
        #[reflect(read_only)]
        pub id: u64,
        pub tags: Vec<String>,
        #[reflect(property)]
        pub active: bool,
        secret: String,
    }

    #[derive(Reflect, Default)]
    struct Node {
        pub label: String,
        pub next: Option<Shared<Node>>,
    }

    fn sample_account() -> Account {
        Account {
            name: "ada".into(),
            id: 7,
            tags: vec!["admin".into()],
            active: true,
            secret: "hunter2".into(),
        }
    }

    #[test]
    fn struct_round_trip() {
        let reflector = Reflector::new();
        reflector.register_type::<Account>();

        let member = reflector
            .serialize(&sample_account(), VisibilityFilter::All)
            .unwrap();
        assert_eq!(member.child("name").unwrap().value, Some(json!("ada")));
        assert_eq!(member.child("id").unwrap().value, Some(json!(7)));
        assert_eq!(
            member.child("tags").unwrap().items[0].value,
            Some(json!("admin"))
        );
        // Properties land in their own list.
        assert!(member.fields.iter().all(|m| m.name.as_deref() != Some("active")));
        assert_eq!(member.child("active").unwrap().value, Some(json!(true)));

        let rebuilt = reflector.deserialize(&member, None).unwrap();
        let rebuilt = rebuilt.take::<Account>().unwrap();
        assert_eq!(rebuilt.name, "ada");
        assert_eq!(rebuilt.id, 7);
        assert_eq!(rebuilt.tags, vec!["admin".to_owned()]);
        assert!(rebuilt.active);
        assert_eq!(rebuilt.secret, "hunter2");
    }

    #[test]
    fn public_filter_hides_private_members() {
        let reflector = Reflector::new();
        reflector.register_type::<Account>();

        let member = reflector
            .serialize(&sample_account(), VisibilityFilter::Public)
            .unwrap();
        assert!(member.child("secret").is_none());
        assert!(member.child("name").is_some());
    }

    #[test]
    fn cyclic_graph_serializes_to_reference_and_back() {
        let reflector = Reflector::new();
        reflector.register_type::<Node>();

        let a = Shared::new(Node {
            label: "a".into(),
            next: None,
        });
        let b = Shared::new(Node {
            label: "b".into(),
            next: Some(a.clone()),
        });
        a.with_mut(|node| node.next = Some(b.clone()));

        let member = reflector.serialize(&a, VisibilityFilter::All).unwrap();
        let back_edge = member
            .child("next")
            .and_then(|next| next.child("next"))
            .unwrap();
        assert!(back_edge.is_reference());
        assert_eq!(back_edge.reference_path(), Some("#"));

        // The document is finite and feeds straight through serde.
        let text = serde_json::to_string(&member).unwrap();
        let parsed: Member = serde_json::from_str(&text).unwrap();

        let rebuilt = reflector.deserialize(&parsed, None).unwrap();
        let rebuilt = rebuilt.take::<Shared<Node>>().unwrap();
        assert_eq!(rebuilt.with(|node| node.label.clone()), "a");

        let middle = rebuilt.with(|node| node.next.clone().unwrap());
        assert_eq!(middle.with(|node| node.label.clone()), "b");
        let looped = middle.with(|node| node.next.clone().unwrap());
        assert!(looped.ptr_eq(&rebuilt));
    }

    #[test]
    fn journal_outlives_the_conversion_pass() {
        let reflector = Reflector::new();
        reflector.register_type::<Node>();

        let a = Shared::new(Node {
            label: "a".into(),
            next: None,
        });
        a.with_mut(|node| node.next = Some(a.clone()));

        // The journal borrow spans the whole call even though the registry
        // guard and graph live only inside it.
        let mut journal = crate::journal::BufferJournal::new();
        let member = reflector
            .serialize_with(&a, VisibilityFilter::All, Some(&mut journal))
            .unwrap();

        assert!(member.child("next").is_some_and(Member::is_reference));
        let log = journal.render();
        assert!(log.contains("already visited"), "missing cycle event: {log}");
    }

    #[test]
    fn populate_applies_what_it_can() {
        let reflector = Reflector::new();
        reflector.register_type::<Account>();
        let mut account = sample_account();

        let mut patch = Member::default();
        patch
            .fields
            .push(Member::leaf(Some("name".into()), None, json!("grace")));
        patch
            .fields
            .push(Member::leaf(Some("id".into()), None, json!(99)));
        patch
            .fields
            .push(Member::leaf(Some("bogus".into()), None, json!(1)));

        let report = reflector.populate(&mut account, &patch, VisibilityFilter::All);

        assert_eq!(account.name, "grace");
        assert_eq!(account.id, 7, "read-only member must not change");
        assert!(!report.is_complete());
        assert_eq!(report.outcome_of("#/name"), Some(&PopulateOutcome::Applied));
        assert_eq!(
            report.outcome_of("#/id"),
            Some(&PopulateOutcome::MemberNotWritable)
        );
        assert_eq!(
            report.outcome_of("#/bogus"),
            Some(&PopulateOutcome::UnknownMember)
        );
    }

    struct ShoutingStrings;

    impl Converter for ShoutingStrings {
        fn priority(&self, tag: &TypeTag, _registry: &crate::registry::TypeRegistry) -> u32 {
            if tag.canonical() == "alloc::string::String" {
                20_000
            } else {
                0
            }
        }

        fn serialize(
            &self,
            value: &dyn Reflect,
            _declared: &TypeTag,
            name: Option<&str>,
            _recursive: bool,
            _filter: VisibilityFilter,
            _cx: &mut ConvertCx<'_, '_>,
        ) -> Result<Member, ReflectError> {
            let ReflectRef::Scalar(scalar) = value.reflect_ref() else {
                return Err(ReflectError::ValueMismatch {
                    expected: value.type_tag(),
                });
            };
            let text = scalar
                .to_value()
                .as_str()
                .map(str::to_uppercase)
                .unwrap_or_default();
            Ok(Member::leaf(
                name.map(str::to_owned),
                Some(value.type_tag().canonical()),
                json!(text),
            ))
        }

        fn deserialize(
            &self,
            member: &Member,
            _tag: &TypeTag,
            _cx: &mut ConvertCx<'_, '_>,
        ) -> Result<Box<dyn Reflect>, ReflectError> {
            let text = member
                .value
                .as_ref()
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            Ok(Box::new(text.to_lowercase()))
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
            let ok = match (target.reflect_mut(), &member.value) {
                (crate::reflection::ReflectMut::Scalar(scalar), Some(value)) => {
                    scalar.set_from_value(value).is_ok()
                }
                _ => false,
            };
            report.record(
                path,
                if ok {
                    PopulateOutcome::Applied
                } else {
                    PopulateOutcome::Failed("not a string".into())
                },
            );
            ok
        }
    }

    #[test]
    fn exact_converter_beats_builtin_scalar() {
        let mut reflector = Reflector::new();
        reflector.register_converter(Box::new(ShoutingStrings));

        let member = reflector
            .serialize(&"quiet".to_owned(), VisibilityFilter::Public)
            .unwrap();
        assert_eq!(member.value, Some(json!("QUIET")));

        // Other scalars still go through the built-in chain.
        let member = reflector.serialize(&3_i32, VisibilityFilter::Public).unwrap();
        assert_eq!(member.value, Some(json!(3)));
    }

    fn service_tag() -> TypeTag {
        TypeTag::named("billing", "InvoiceService")
    }

    fn add_descriptor() -> OperationDescriptor {
        OperationDescriptor::new(service_tag(), "Add")
            .statik()
            .with_param(ParamInfo::new("a", <i64 as Describe>::type_tag()))
            .with_param(ParamInfo::new("b", <i64 as Describe>::type_tag()))
            .with_return(<i64 as Describe>::type_tag())
    }

    fn add_handler() -> OpHandler {
        OpHandler::sync(|args| {
            let mut total = 0_i64;
            for arg in &args {
                total += arg.downcast_ref::<i64>().copied().ok_or("expected i64")?;
            }
            Ok(Box::new(total) as Box<dyn crate::reflection::Reflect>)
        })
    }

    #[test]
    fn invoke_discovers_and_coerces() {
        let mut reflector = Reflector::new();
        reflector.register_operation(add_descriptor(), add_handler());

        let mut args = Map::new();
        args.insert("a".to_owned(), json!(2));
        args.insert("b".to_owned(), json!("40"));

        // Fuzzy on both axes: type by prefix, name case-insensitively.
        let result = reflector
            .invoke("invoice", MatchLevel::PrefixCi, "add", MatchLevel::ExactCi, &args)
            .unwrap();
        assert_eq!(result.take::<i64>().unwrap(), 42);
    }

    #[test]
    fn invoke_async_round_trip() {
        let mut reflector = Reflector::new();
        let descriptor = OperationDescriptor::new(service_tag(), "Echo")
            .statik()
            .asynchronous()
            .with_param(ParamInfo::new("text", <String as Describe>::type_tag()));
        reflector.register_operation(
            descriptor,
            OpHandler::asynchronous(|mut args| {
                use futures_lite::FutureExt;
                async move {
                    let text = args
                        .remove(0)
                        .take::<String>()
                        .map_err(|_| "expected a string".to_owned())?;
                    Ok(Box::new(text) as Box<dyn crate::reflection::Reflect>)
                }
                .boxed()
            }),
        );

        let mut args = Map::new();
        args.insert("text".to_owned(), json!("ping"));
        let future = reflector.invoke_async(
            "InvoiceService",
            MatchLevel::ExactCs,
            "Echo",
            MatchLevel::ExactCs,
            &args,
        );
        let result = futures_lite::future::block_on(future).unwrap();
        assert_eq!(result.take::<String>().unwrap(), "ping");
    }

    #[test]
    fn create_instance_and_schemas() {
        let reflector = Reflector::new();
        reflector.register_type::<Account>();

        let instance = reflector.create_instance("i64").unwrap();
        assert_eq!(instance.take::<i64>().unwrap(), 0);

        let tag = <Account as Describe>::type_tag();
        let schema = reflector.type_schema(&tag, VisibilityFilter::Public).unwrap();
        assert!(schema.members.iter().any(|m| m.name == "name"));
        assert!(schema.members.iter().all(|m| m.name != "secret"));

        let all = reflector.all_types();
        assert!(all.iter().any(|t| t == &tag));
    }
}
