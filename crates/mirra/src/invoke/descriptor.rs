use serde_json::Value;

use crate::info::Visibility;
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// ParamInfo

/// One declared parameter of an operation.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    name: String,
    tag: TypeTag,
    default: Option<Value>,
    docs: Option<String>,
}

impl ParamInfo {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            default: None,
            docs: None,
        }
    }

    /// Attaches a default value; the parameter becomes optional.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    /// The declared default, if the parameter is optional.
    #[inline]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[inline]
    pub fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }
}

// -----------------------------------------------------------------------------
// OperationDescriptor

/// Metadata for one invokable operation.
///
/// Everything discovery and schema generation need, independent of the
/// handler that actually runs.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    declaring: TypeTag,
    name: String,
    params: Vec<ParamInfo>,
    returns: Option<TypeTag>,
    is_static: bool,
    is_async: bool,
    visibility: Visibility,
    docs: Option<String>,
}

impl OperationDescriptor {
    pub fn new(declaring: TypeTag, name: impl Into<String>) -> Self {
        Self {
            declaring,
            name: name.into(),
            params: Vec::new(),
            returns: None,
            is_static: false,
            is_async: false,
            visibility: Visibility::Public,
            docs: None,
        }
    }

    /// Appends a parameter; declaration order is invocation order.
    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_return(mut self, tag: TypeTag) -> Self {
        self.returns = Some(tag);
        self
    }

    /// Marks the operation as unbound to an instance.
    pub fn statik(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the handler as asynchronous.
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }

    #[inline]
    pub fn declaring(&self) -> &TypeTag {
        &self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    #[inline]
    pub fn returns(&self) -> Option<&TypeTag> {
        self.returns.as_ref()
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    /// `Type::name` rendering for error messages and ambiguity listings.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring.ident(), self.name)
    }
}
