//! End-to-end checks through the public API, the way a host crate uses it.

use mirra::info::VisibilityFilter;
use mirra::invoke::{MatchLevel, OpHandler, OperationDescriptor, ParamInfo};
use mirra::reflection::Describe;
use mirra::reflector::Reflector;
use mirra::{Member, Reflect, ReflectError, TypeTag};
use serde_json::{Map, json};

fn root_cause(err: &ReflectError) -> &ReflectError {
    match err {
        ReflectError::AtPath { source, .. } => source,
        other => other,
    }
}

#[derive(Reflect, Default, Debug, PartialEq)]
enum Status {
    #[default]
    Active,
    Suspended,
    Closed,
}

/// A support ticket.
#[derive(Reflect, Default)]
struct Ticket {
    pub title: String,
    pub status: Status,
    #[reflect(read_only)]
    pub id: u64,
}

#[derive(Reflect, Default)]
struct Outer {
    pub inner: Inner,
}

#[derive(Reflect, Default)]
#[reflect(nested_in(Outer))]
struct Inner {
    pub depth: i32,
}

#[test]
fn wire_document_shape() {
    let reflector = Reflector::new();
    reflector.register_type::<Ticket>();

    let ticket = Ticket {
        title: "printer on fire".into(),
        status: Status::Suspended,
        id: 3,
    };
    let member = reflector.serialize(&ticket, VisibilityFilter::Public).unwrap();
    let doc = serde_json::to_value(&member).unwrap();

    assert_eq!(doc["typeName"], json!("engine::Ticket"));
    let fields = doc["fields"].as_array().unwrap();
    assert_eq!(fields[0]["name"], json!("title"));
    assert_eq!(fields[0]["value"], json!("printer on fire"));
    assert_eq!(fields[1]["value"], json!("Suspended"));
}

#[test]
fn deserialize_accepts_hand_written_documents() {
    let reflector = Reflector::new();

    let member: Member =
        serde_json::from_str(r#"{ "typeName": "i64", "value": 9 }"#).unwrap();
    let value = reflector.deserialize(&member, None).unwrap();
    assert_eq!(value.take::<i64>().unwrap(), 9);

    // No identity on the wire: the fallback tag decides.
    let member: Member = serde_json::from_str(r#"{ "value": "tock" }"#).unwrap();
    let tag = <String as Describe>::type_tag();
    let value = reflector.deserialize(&member, Some(&tag)).unwrap();
    assert_eq!(value.take::<String>().unwrap(), "tock");
}

#[test]
fn nested_type_identity_round_trips() {
    let tag = <Inner as Describe>::type_tag();
    assert_eq!(tag.canonical(), "engine::Outer+Inner");

    let reflector = Reflector::new();
    reflector.register_type::<Outer>();
    let instance = reflector.create_instance("engine::Outer+Inner").unwrap();
    let inner = instance.take::<Inner>().unwrap();
    assert_eq!(inner.depth, 0);
}

#[test]
fn enum_tokens_populate_case_insensitively() {
    let reflector = Reflector::new();
    reflector.register_type::<Ticket>();
    let mut ticket = Ticket::default();

    let mut patch = Member::default();
    patch
        .fields
        .push(Member::leaf(Some("status".into()), None, json!("suspended")));
    let report = reflector.populate(&mut ticket, &patch, VisibilityFilter::Public);

    assert!(report.is_complete());
    assert_eq!(ticket.status, Status::Suspended);

    let mut patch = Member::default();
    patch
        .fields
        .push(Member::leaf(Some("status".into()), None, json!("retired")));
    let report = reflector.populate(&mut ticket, &patch, VisibilityFilter::Public);
    assert!(!report.is_complete());
    assert_eq!(ticket.status, Status::Suspended, "bad token leaves the value alone");
}

#[test]
fn omitted_arguments_take_declared_defaults() {
    let mut reflector = Reflector::new();
    let descriptor = OperationDescriptor::new(TypeTag::named("ops", "Counter"), "Bump")
        .statik()
        .with_param(ParamInfo::new("value", <i64 as Describe>::type_tag()))
        .with_param(ParamInfo::new("step", <i64 as Describe>::type_tag()).with_default(json!(10)))
        .with_return(<i64 as Describe>::type_tag());
    reflector.register_operation(
        descriptor,
        OpHandler::sync(|args| {
            let value = args[0].downcast_ref::<i64>().copied().ok_or("expected i64")?;
            let step = args[1].downcast_ref::<i64>().copied().ok_or("expected i64")?;
            Ok(Box::new(value + step) as Box<dyn mirra::reflection::Reflect>)
        }),
    );

    let mut args = Map::new();
    args.insert("value".to_owned(), json!(5));
    let result = reflector
        .invoke("Counter", MatchLevel::ExactCs, "bump", MatchLevel::ExactCi, &args)
        .unwrap();
    assert_eq!(result.take::<i64>().unwrap(), 15);
}

#[test]
fn dangling_reference_reports_the_bad_path() {
    let reflector = Reflector::new();

    // A marker that points at a node the document never visited.
    let member: Member =
        serde_json::from_str(r##"{ "typeName": "$ref", "value": "#/nowhere" }"##).unwrap();
    let err = reflector.deserialize(&member, None).unwrap_err();

    match root_cause(&err) {
        ReflectError::CycleResolutionFailed { path } => assert_eq!(path, "#/nowhere"),
        other => panic!("expected a cycle resolution failure, got {other}"),
    }
}

#[test]
fn token_only_types_cannot_be_instantiated() {
    let reflector = Reflector::new();
    // TypeTag registers token parsing but no default constructor.
    reflector.register_type::<TypeTag>();

    let err = reflector.create_instance("mirra::tag::TypeTag").unwrap_err();
    assert!(matches!(err, ReflectError::UninstantiableType { .. }));
}

#[test]
fn null_payload_for_non_nullable_member_is_rejected() {
    let reflector = Reflector::new();
    reflector.register_type::<Ticket>();

    let mut doc = Member::default();
    doc.type_name = Some("engine::Ticket".to_owned());
    doc.fields
        .push(Member::leaf(Some("title".into()), None, json!(null)));

    let err = reflector.deserialize(&doc, None).unwrap_err();
    match root_cause(&err) {
        ReflectError::ValueMismatch { expected } => {
            assert_eq!(expected.canonical(), "alloc::string::String");
        }
        other => panic!("expected a value mismatch, got {other}"),
    }

    // The same null lands fine on a nullable slot.
    let mut holder = Member::default();
    holder.type_name = Some("engine::Holder".to_owned());
    holder
        .fields
        .push(Member::leaf(Some("note".into()), None, json!(null)));
    reflector.register_type::<Holder>();
    let value = reflector.deserialize(&holder, None).unwrap();
    let holder = value.take::<Holder>().unwrap();
    assert_eq!(holder.note, None);
}

#[derive(Reflect, Default)]
struct Holder {
    pub note: Option<String>,
}

#[cfg(feature = "auto_register")]
mod auto {
    use super::*;
    use mirra::registry::TypeRegistry;

    #[derive(Reflect, Default)]
    #[reflect(auto_register)]
    struct Widget {
        pub id: u64,
    }

    #[test]
    fn submitted_types_register_in_bulk() {
        let mut registry = TypeRegistry::new();
        registry.auto_register();

        let tag = registry.decode("engine::auto::Widget").unwrap();
        assert_eq!(tag, <Widget as Describe>::type_tag());
    }
}
