use crate::info::MemberInfo;
use crate::reflection::{Describe, Reflect, ReflectKind};
use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// TypeMeta

/// Everything the engine knows about one registered type.
///
/// Built once per type by [`Register::type_meta`] (derive-generated) and
/// stored in the [`TypeRegistry`](crate::registry::TypeRegistry). The
/// construction vtables are plain function pointers so a meta stays `Copy`-ish
/// cheap and never borrows the registry.
#[derive(Clone)]
pub struct TypeMeta {
    tag: TypeTag,
    kind: ReflectKind,
    members: &'static [MemberInfo],
    docs: Option<&'static str>,
    default_fn: Option<fn() -> Box<dyn Reflect>>,
    from_token: Option<fn(&str) -> Option<Box<dyn Reflect>>>,
    variants: &'static [&'static str],
}

impl TypeMeta {
    /// Creates a meta with no members and no vtables.
    pub fn new<T: Describe>(kind: ReflectKind) -> Self {
        Self {
            tag: T::type_tag(),
            kind,
            members: &[],
            docs: None,
            default_fn: None,
            from_token: None,
            variants: &[],
        }
    }

    /// Attaches the member table (structs).
    pub fn with_members(mut self, members: &'static [MemberInfo]) -> Self {
        self.members = members;
        self
    }

    /// Attaches the type-level description.
    pub fn with_docs(mut self, docs: &'static str) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Attaches the default-construction vtable.
    pub fn with_default(mut self, default_fn: fn() -> Box<dyn Reflect>) -> Self {
        self.default_fn = Some(default_fn);
        self
    }

    /// Attaches the token-construction vtable and variant list (fieldless enums).
    pub fn with_tokens(
        mut self,
        variants: &'static [&'static str],
        from_token: fn(&str) -> Option<Box<dyn Reflect>>,
    ) -> Self {
        self.variants = variants;
        self.from_token = Some(from_token);
        self
    }

    /// The type's descriptor.
    #[inline]
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    /// The type's reflection kind.
    #[inline]
    pub fn kind(&self) -> ReflectKind {
        self.kind
    }

    /// Member metadata in declaration order; empty for non-structs.
    #[inline]
    pub fn members(&self) -> &'static [MemberInfo] {
        self.members
    }

    /// Type-level description, if any.
    #[inline]
    pub fn docs(&self) -> Option<&'static str> {
        self.docs
    }

    /// Whether a fresh instance can be constructed.
    #[inline]
    pub fn is_instantiable(&self) -> bool {
        self.default_fn.is_some() || self.from_token.is_some()
    }

    /// Constructs a default instance, if the type supports it.
    pub fn default_value(&self) -> Option<Box<dyn Reflect>> {
        self.default_fn.map(|f| f())
    }

    /// Whether the type can be constructed from a single token.
    #[inline]
    pub fn has_token_ctor(&self) -> bool {
        self.from_token.is_some()
    }

    /// Constructs an instance from an enum token, case-insensitive.
    pub fn from_token(&self, token: &str) -> Option<Box<dyn Reflect>> {
        self.from_token.and_then(|f| f(token))
    }

    /// Declared enum variant names; empty for non-enums.
    #[inline]
    pub fn variants(&self) -> &'static [&'static str] {
        self.variants
    }
}

impl std::fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("members", &self.members.len())
            .field("instantiable", &self.is_instantiable())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Register

/// A type that can enter the [`TypeRegistry`](crate::registry::TypeRegistry).
///
/// Implemented by `#[derive(Reflect)]` and the built-in impls. Dependency
/// registration is recursive: registering a struct registers its member types,
/// registering `Vec<T>` registers `T`, and so on.
pub trait Register: Describe {
    /// Builds this type's registry entry.
    fn type_meta() -> TypeMeta;

    /// Registers the types this type's members refer to.
    fn register_dependencies(_registry: &mut crate::registry::TypeRegistry) {}
}
