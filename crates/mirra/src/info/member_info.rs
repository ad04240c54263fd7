use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// MemberKind / Visibility

/// Whether a member is surfaced as a field or a property.
///
/// Rust has no property members; the derive classifies a field as a property
/// when it carries `#[reflect(property)]`. The wire format keeps the two
/// lists separate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum MemberKind {
    Field,
    Property,
}

/// Declared visibility of a member, taken from the field's `pub`-ness.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Visibility {
    Public,
    Private,
}

/// Which members an operation may see.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum VisibilityFilter {
    /// Only `pub` members.
    Public,
    /// Every reflectable member.
    All,
}

impl VisibilityFilter {
    /// Whether a member passes this filter.
    #[inline]
    pub fn admits(&self, info: &MemberInfo) -> bool {
        match self {
            VisibilityFilter::All => true,
            VisibilityFilter::Public => info.visibility() == Visibility::Public,
        }
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

/// Static metadata for one reflectable member.
///
/// Stored in declaration order in a `static` table per type; the member's
/// [`TypeTag`] is built lazily through a function pointer, the same trick the
/// registry uses for type metadata.
#[derive(Copy, Clone, Debug)]
pub struct MemberInfo {
    name: &'static str,
    tag: fn() -> TypeTag,
    kind: MemberKind,
    visibility: Visibility,
    read_only: bool,
    optional: bool,
    docs: Option<&'static str>,
}

impl MemberInfo {
    /// Creates metadata for a public field of type `T`.
    pub const fn new<T: crate::reflection::Describe>(name: &'static str) -> Self {
        Self {
            name,
            tag: T::type_tag,
            kind: MemberKind::Field,
            visibility: Visibility::Public,
            read_only: false,
            optional: false,
            docs: None,
        }
    }

    /// Classifies this member as a property.
    pub const fn property(mut self) -> Self {
        self.kind = MemberKind::Property;
        self
    }

    /// Marks this member private.
    pub const fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks this member read-only: serialized, never populated.
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Marks this member as nullable (`Option`-wrapped).
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Attaches a human-readable description.
    pub const fn with_docs(mut self, docs: &'static str) -> Self {
        self.docs = Some(docs);
        self
    }

    /// The member's label.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The member's type descriptor.
    #[inline]
    pub fn tag(&self) -> TypeTag {
        (self.tag)()
    }

    /// Field or property.
    #[inline]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Declared visibility.
    #[inline]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Whether populate must skip this member.
    #[inline]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether the member is nullable.
    #[inline]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Human-readable description, if any.
    #[inline]
    pub const fn docs(&self) -> Option<&'static str> {
        self.docs
    }
}
