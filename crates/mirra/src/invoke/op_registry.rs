use std::collections::HashMap;

use futures_lite::future::{self, Boxed, FutureExt};
use serde_json::{Map, Value};

use crate::error::InvokeError;
use crate::invoke::{MatchLevel, OperationDescriptor, coerce};
use crate::reflection::Reflect;
use crate::registry::TypeRegistry;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// OpHandler

type SyncFn = dyn Fn(Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, String> + Send + Sync;
type AsyncFn =
    dyn Fn(Vec<Box<dyn Reflect>>) -> Boxed<Result<Box<dyn Reflect>, String>> + Send + Sync;

/// The callable half of a registered operation.
///
/// Handlers receive the coerced arguments in declaration order; instance
/// binding is the registrant's business (capture the receiver in the
/// closure, or take it as the first parameter).
pub enum OpHandler {
    Sync(Box<SyncFn>),
    Async(Box<AsyncFn>),
}

impl OpHandler {
    /// Wraps a plain function.
    pub fn sync(
        f: impl Fn(Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, String> + Send + Sync + 'static,
    ) -> Self {
        OpHandler::Sync(Box::new(f))
    }

    /// Wraps a future-returning function.
    pub fn asynchronous(
        f: impl Fn(Vec<Box<dyn Reflect>>) -> Boxed<Result<Box<dyn Reflect>, String>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        OpHandler::Async(Box::new(f))
    }
}

struct Operation {
    descriptor: OperationDescriptor,
    handler: OpHandler,
}

// -----------------------------------------------------------------------------
// OperationRegistry

/// The searchable set of registered operations.
///
/// Discovery walks two axes independently: the declaring type's bare name
/// and the operation name, each under its own [`MatchLevel`]. Invocation
/// narrows overloads against the supplied argument names, coerces each
/// argument to its parameter's declared type, and dispatches.
#[derive(Default)]
pub struct OperationRegistry {
    ops: Vec<Operation>,
    by_type: HashMap<TypeTag, Vec<usize>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation. Overloads (same declaring type and name with
    /// different parameter lists) are allowed.
    pub fn register(&mut self, descriptor: OperationDescriptor, handler: OpHandler) {
        let index = self.ops.len();
        self.by_type
            .entry(descriptor.declaring().clone())
            .or_default()
            .push(index);
        self.ops.push(Operation {
            descriptor,
            handler,
        });
    }

    /// All registered descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.ops.iter().map(|op| &op.descriptor)
    }

    /// The descriptors declared on one type.
    pub fn descriptors_for(&self, declaring: &TypeTag) -> Vec<&OperationDescriptor> {
        self.by_type
            .get(declaring)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| &self.ops[index].descriptor)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fuzzy discovery over both axes.
    pub fn discover(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
    ) -> Vec<&OperationDescriptor> {
        self.discover_indices(type_query, type_level, name_query, name_level)
            .into_iter()
            .map(|index| &self.ops[index].descriptor)
            .collect()
    }

    fn discover_indices(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
    ) -> Vec<usize> {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, op)| {
                type_level.admits(op.descriptor.declaring().ident(), type_query)
                    && name_level.admits(op.descriptor.name(), name_query)
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Locates, coerces, and invokes a synchronous operation.
    ///
    /// An async handler is refused here; use
    /// [`invoke_async`](Self::invoke_async).
    pub fn invoke(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
        args: &Map<String, Value>,
        registry: &TypeRegistry,
    ) -> Result<Box<dyn Reflect>, InvokeError> {
        let (op, coerced) =
            self.prepare(type_query, type_level, name_query, name_level, args, registry)?;
        match &op.handler {
            OpHandler::Sync(f) => f(coerced).map_err(|message| InvokeError::HandlerFailed {
                name: op.descriptor.qualified_name(),
                message,
            }),
            OpHandler::Async(_) => Err(InvokeError::RequiresAsync {
                name: op.descriptor.qualified_name(),
            }),
        }
    }

    /// Like [`invoke`](Self::invoke), but accepts async handlers.
    ///
    /// Discovery, narrowing, and coercion all happen before this returns;
    /// the future owns its arguments and suspends only inside the handler,
    /// so it outlives any lock the caller resolved the registry under.
    pub fn invoke_async(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
        args: &Map<String, Value>,
        registry: &TypeRegistry,
    ) -> Boxed<Result<Box<dyn Reflect>, InvokeError>> {
        let (op, coerced) =
            match self.prepare(type_query, type_level, name_query, name_level, args, registry) {
                Ok(prepared) => prepared,
                Err(err) => return future::ready(Err(err)).boxed(),
            };
        let name = op.descriptor.qualified_name();
        match &op.handler {
            OpHandler::Sync(f) => {
                let result = f(coerced)
                    .map_err(|message| InvokeError::HandlerFailed { name, message });
                future::ready(result).boxed()
            }
            OpHandler::Async(f) => {
                let pending = f(coerced);
                async move {
                    pending
                        .await
                        .map_err(|message| InvokeError::HandlerFailed { name, message })
                }
                .boxed()
            }
        }
    }

    /// Candidate narrowing and argument coercion, shared by both entry
    /// points.
    fn prepare(
        &self,
        type_query: &str,
        type_level: MatchLevel,
        name_query: &str,
        name_level: MatchLevel,
        args: &Map<String, Value>,
        registry: &TypeRegistry,
    ) -> Result<(&Operation, Vec<Box<dyn Reflect>>), InvokeError> {
        let candidates = self.discover_indices(type_query, type_level, name_query, name_level);
        if candidates.is_empty() {
            return Err(InvokeError::OperationNotFound {
                name: name_query.to_owned(),
            });
        }

        // Narrow overloads: every supplied argument must name a parameter,
        // every parameter must be supplied or defaulted; among the viable,
        // the one covering the most supplied arguments wins.
        let mut viable: Vec<usize> = Vec::new();
        let mut best_score = 0usize;
        for &index in &candidates {
            let descriptor = &self.ops[index].descriptor;
            let params = descriptor.params();
            let args_known = args
                .keys()
                .all(|key| params.iter().any(|p| p.name() == key));
            let params_covered = params
                .iter()
                .all(|p| args.contains_key(p.name()) || p.default().is_some());
            if !args_known || !params_covered {
                continue;
            }
            let score = params
                .iter()
                .filter(|p| args.contains_key(p.name()))
                .count();
            if viable.is_empty() || score > best_score {
                viable.clear();
                viable.push(index);
                best_score = score;
            } else if score == best_score {
                viable.push(index);
            }
        }

        match viable.len() {
            0 => {
                // Nothing fit; if exactly one candidate was in play, say
                // which argument it was missing.
                if candidates.len() == 1 {
                    let descriptor = &self.ops[candidates[0]].descriptor;
                    if let Some(missing) = descriptor
                        .params()
                        .iter()
                        .find(|p| !args.contains_key(p.name()) && p.default().is_none())
                    {
                        return Err(InvokeError::MissingArgument {
                            name: descriptor.qualified_name(),
                            param: missing.name().to_owned(),
                        });
                    }
                }
                Err(InvokeError::OperationNotFound {
                    name: name_query.to_owned(),
                })
            }
            1 => {
                let op = &self.ops[viable[0]];
                let coerced = self.coerce_args(&op.descriptor, args, registry)?;
                Ok((op, coerced))
            }
            _ => Err(InvokeError::AmbiguousOperation {
                name: name_query.to_owned(),
                candidates: viable
                    .iter()
                    .map(|&index| self.ops[index].descriptor.qualified_name())
                    .collect(),
            }),
        }
    }

    fn coerce_args(
        &self,
        descriptor: &OperationDescriptor,
        args: &Map<String, Value>,
        registry: &TypeRegistry,
    ) -> Result<Vec<Box<dyn Reflect>>, InvokeError> {
        let mut coerced = Vec::with_capacity(descriptor.params().len());
        for param in descriptor.params() {
            let supplied = args.get(param.name()).or_else(|| param.default());
            let Some(value) = supplied else {
                return Err(InvokeError::MissingArgument {
                    name: descriptor.qualified_name(),
                    param: param.name().to_owned(),
                });
            };
            let built = coerce(value, param.tag(), registry).map_err(|reason| {
                InvokeError::ArgumentCoercionFailed {
                    param: param.name().to_owned(),
                    value: value.to_string(),
                    reason,
                }
            })?;
            coerced.push(built);
        }
        Ok(coerced)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoke::ParamInfo;
    use crate::reflection::Describe;
    use serde_json::json;

    fn declaring() -> TypeTag {
        TypeTag::named("demo", "Calculator")
    }

    fn sample_registry() -> OperationRegistry {
        let mut ops = OperationRegistry::new();
        ops.register(
            OperationDescriptor::new(declaring(), "Process")
                .with_param(ParamInfo::new("amount", <i64 as Describe>::type_tag())),
            OpHandler::sync(|mut args| {
                let amount = args.remove(0).take::<i64>().map_err(|_| "bad arg")?;
                Ok(Box::new(amount * 2) as Box<dyn Reflect>)
            }),
        );
        ops.register(
            OperationDescriptor::new(declaring(), "ProcessAll"),
            OpHandler::sync(|_| Ok(Box::new(0_i64) as Box<dyn Reflect>)),
        );
        ops
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn match_levels_narrow_discovery() {
        let ops = sample_registry();

        let loose = ops.discover("", MatchLevel::Any, "process", MatchLevel::ContainsCi);
        assert_eq!(loose.len(), 2);

        let exact = ops.discover("", MatchLevel::Any, "Process", MatchLevel::ExactCs);
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].name(), "Process");
    }

    #[test]
    fn invoke_coerces_string_arguments() {
        let ops = sample_registry();
        let registry = TypeRegistry::new();

        let result = ops
            .invoke(
                "Calculator",
                MatchLevel::ExactCs,
                "Process",
                MatchLevel::ExactCs,
                &args(json!({ "amount": "21" })),
                &registry,
            )
            .unwrap();
        assert_eq!(result.take::<i64>().unwrap(), 42);
    }

    #[test]
    fn unmatched_name_is_not_found() {
        let ops = sample_registry();
        let registry = TypeRegistry::new();
        let err = ops
            .invoke(
                "",
                MatchLevel::Any,
                "Frobnicate",
                MatchLevel::ExactCs,
                &Map::new(),
                &registry,
            )
            .unwrap_err();
        assert!(matches!(err, InvokeError::OperationNotFound { .. }));
    }

    #[test]
    fn overloads_narrow_by_argument_names() {
        let mut ops = sample_registry();
        ops.register(
            OperationDescriptor::new(declaring(), "Process")
                .with_param(ParamInfo::new("amount", <i64 as Describe>::type_tag()))
                .with_param(
                    ParamInfo::new("scale", <i64 as Describe>::type_tag())
                        .with_default(json!(10)),
                ),
            OpHandler::sync(|mut args| {
                let amount = args.remove(0).take::<i64>().map_err(|_| "bad arg")?;
                let scale = args.remove(0).take::<i64>().map_err(|_| "bad arg")?;
                Ok(Box::new(amount * scale) as Box<dyn Reflect>)
            }),
        );
        let registry = TypeRegistry::new();

        // Supplying `scale` picks the two-parameter overload; its default
        // covers nothing extra.
        let result = ops
            .invoke(
                "Calculator",
                MatchLevel::ExactCs,
                "Process",
                MatchLevel::ExactCs,
                &args(json!({ "amount": 3, "scale": 5 })),
                &registry,
            )
            .unwrap();
        assert_eq!(result.take::<i64>().unwrap(), 15);

        // Supplying only `amount` fits both equally well: ambiguous.
        let err = ops
            .invoke(
                "Calculator",
                MatchLevel::ExactCs,
                "Process",
                MatchLevel::ExactCs,
                &args(json!({ "amount": 3 })),
                &registry,
            )
            .unwrap_err();
        assert!(matches!(err, InvokeError::AmbiguousOperation { ref candidates, .. }
            if candidates.len() == 2));
    }

    #[test]
    fn async_handler_requires_async_entry_point() {
        let mut ops = OperationRegistry::new();
        ops.register(
            OperationDescriptor::new(declaring(), "Fetch").asynchronous(),
            OpHandler::asynchronous(|_| {
                async { Ok(Box::new("done".to_owned()) as Box<dyn Reflect>) }.boxed()
            }),
        );
        let registry = TypeRegistry::new();

        let err = ops
            .invoke(
                "",
                MatchLevel::Any,
                "Fetch",
                MatchLevel::ExactCs,
                &Map::new(),
                &registry,
            )
            .unwrap_err();
        assert!(matches!(err, InvokeError::RequiresAsync { .. }));

        let result = futures_lite::future::block_on(ops.invoke_async(
            "",
            MatchLevel::Any,
            "Fetch",
            MatchLevel::ExactCs,
            &Map::new(),
            &registry,
        ))
        .unwrap();
        assert_eq!(result.take::<String>().unwrap(), "done");
    }

    #[test]
    fn coercion_failure_names_the_parameter() {
        let ops = sample_registry();
        let registry = TypeRegistry::new();
        let err = ops
            .invoke(
                "Calculator",
                MatchLevel::ExactCs,
                "Process",
                MatchLevel::ExactCs,
                &args(json!({ "amount": "" })),
                &registry,
            )
            .unwrap_err();
        assert!(matches!(err, InvokeError::ArgumentCoercionFailed { ref param, .. }
            if param == "amount"));
    }
}
