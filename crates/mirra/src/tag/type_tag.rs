use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

// -----------------------------------------------------------------------------
// TypeTag

/// A runtime type descriptor.
///
/// Tags are structural: two independently built tags describing the same type
/// compare equal and hash identically, which makes them usable as registry
/// keys. Cloning is cheap (a single `Arc` bump).
///
/// The canonical string form is produced by [`canonical`](TypeTag::canonical)
/// and follows this grammar:
///
/// - namespace-qualified ident, `::`-separated: `alloc::vec::Vec`;
///   primitives carry no namespace: `i32`.
/// - generic arguments enclosed in `<`/`>`, recursively encoded, separated by
///   a comma and a single space, with no whitespace after the opening bracket:
///   `alloc::vec::Vec<i32>`.
/// - array ranks as bracket suffixes, `[]` per rank-1 level and `[,]`, `[,,]`
///   for multi-dimensional ranks. The element type's own suffixes appear
///   before the outer array's, so the rightmost suffix is the outermost
///   array: `i32[][,]` is a rank-2 array whose elements are `i32[]`.
/// - nested types separated from their enclosing type by `+`:
///   `demo::Outer+Inner`.
///
/// Nullable wrappers (`Option<T>`) never appear in an identity; they are
/// unwrapped to the underlying type before encoding. Optionality is
/// member-level metadata, not type identity.
///
/// # Examples
///
/// ```
/// use mirra::tag::TypeTag;
///
/// let vec_of_arrays = TypeTag::named("alloc::vec", "Vec")
///     .with_args(vec![TypeTag::primitive("i32").array(1)]);
///
/// assert_eq!(vec_of_arrays.canonical(), "alloc::vec::Vec<i32[]>");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeTag(Arc<TagKind>);

/// The structural shape behind a [`TypeTag`].
#[derive(PartialEq, Eq, Hash, Debug)]
pub enum TagKind {
    /// A (possibly generic, possibly nested) named type.
    Named {
        /// `::`-separated namespace; empty for primitives.
        module: Cow<'static, str>,
        /// The short type name, without namespace or generics.
        ident: Cow<'static, str>,
        /// The enclosing type for nested types (`Outer` in `Outer+Inner`).
        enclosing: Option<TypeTag>,
        /// Closed generic arguments; empty for non-generic types.
        args: Vec<TypeTag>,
    },
    /// An array of `rank` dimensions over `elem`.
    Array {
        /// The element type.
        elem: TypeTag,
        /// Number of dimensions, `1..`.
        rank: u8,
    },
}

impl TypeTag {
    /// Creates a tag for a namespaced, non-generic type.
    pub fn named(module: impl Into<Cow<'static, str>>, ident: impl Into<Cow<'static, str>>) -> Self {
        Self(Arc::new(TagKind::Named {
            module: module.into(),
            ident: ident.into(),
            enclosing: None,
            args: Vec::new(),
        }))
    }

    /// Creates a tag for a primitive (namespace-less) type such as `i32`.
    pub fn primitive(ident: impl Into<Cow<'static, str>>) -> Self {
        Self::named("", ident)
    }

    /// Returns this tag as a closed generic instantiation over `args`.
    ///
    /// Has no effect on array tags.
    pub fn with_args(self, args: Vec<TypeTag>) -> Self {
        match &*self.0 {
            TagKind::Named {
                module,
                ident,
                enclosing,
                ..
            } => Self(Arc::new(TagKind::Named {
                module: module.clone(),
                ident: ident.clone(),
                enclosing: enclosing.clone(),
                args,
            })),
            TagKind::Array { .. } => self,
        }
    }

    /// Returns a tag for a type named `ident` nested inside `self`.
    pub fn nested(self, ident: impl Into<Cow<'static, str>>) -> Self {
        Self(Arc::new(TagKind::Named {
            module: Cow::Borrowed(""),
            ident: ident.into(),
            enclosing: Some(self),
            args: Vec::new(),
        }))
    }

    /// Returns an array tag of the given `rank` over `self`.
    ///
    /// # Panics
    ///
    /// Panics if `rank` is zero; a zero-dimensional array is programmer error.
    pub fn array(self, rank: u8) -> Self {
        assert!(rank > 0, "array rank must be at least 1");
        Self(Arc::new(TagKind::Array { elem: self, rank }))
    }

    /// The structural kind of this tag.
    #[inline]
    pub fn kind(&self) -> &TagKind {
        &self.0
    }

    /// The short name of the type: ident for named types, the element's
    /// ident for arrays.
    pub fn ident(&self) -> &str {
        match &*self.0 {
            TagKind::Named { ident, .. } => ident,
            TagKind::Array { elem, .. } => elem.ident(),
        }
    }

    /// Generic arguments of a named tag; empty for everything else.
    pub fn args(&self) -> &[TypeTag] {
        match &*self.0 {
            TagKind::Named { args, .. } => args,
            TagKind::Array { .. } => &[],
        }
    }

    /// Whether this tag is a closed generic instantiation.
    pub fn is_generic(&self) -> bool {
        !self.args().is_empty()
    }

    /// Whether this tag is an array tag.
    pub fn is_array(&self) -> bool {
        matches!(&*self.0, TagKind::Array { .. })
    }

    /// The generic definition of this tag: the same named tag with its
    /// argument list emptied. Returns `self` unchanged for non-generic tags.
    pub fn definition(&self) -> TypeTag {
        match &*self.0 {
            TagKind::Named { args, .. } if !args.is_empty() => self.clone().with_args(Vec::new()),
            _ => self.clone(),
        }
    }

    /// Encodes this tag to its canonical identity string.
    ///
    /// Total and deterministic; a pure function of the descriptor.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match &*self.0 {
            TagKind::Named {
                module,
                ident,
                enclosing,
                args,
            } => {
                // `Option<T>` identities are the identity of `T`.
                if enclosing.is_none() && module == "core::option" && ident == "Option" {
                    if let [inner] = args.as_slice() {
                        inner.write_canonical(out);
                        return;
                    }
                }
                if let Some(outer) = enclosing {
                    outer.write_canonical(out);
                    out.push('+');
                } else if !module.is_empty() {
                    out.push_str(module);
                    out.push_str("::");
                }
                out.push_str(ident);
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.write_canonical(out);
                    }
                    out.push('>');
                }
            }
            TagKind::Array { elem, rank } => {
                elem.write_canonical(out);
                out.push('[');
                for _ in 1..*rank {
                    out.push(',');
                }
                out.push(']');
            }
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.canonical())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_canonical() {
        assert_eq!(TypeTag::primitive("i32").canonical(), "i32");
    }

    #[test]
    fn namespaced_canonical() {
        let tag = TypeTag::named("alloc::string", "String");
        assert_eq!(tag.canonical(), "alloc::string::String");
    }

    #[test]
    fn generic_spacing() {
        let tag = TypeTag::named("std::collections", "HashMap").with_args(vec![
            TypeTag::named("alloc::string", "String"),
            TypeTag::primitive("i32"),
        ]);
        assert_eq!(
            tag.canonical(),
            "std::collections::HashMap<alloc::string::String, i32>"
        );
    }

    #[test]
    fn array_suffix_order() {
        // Rightmost suffix is the outermost array.
        let jagged_in_grid = TypeTag::primitive("i32").array(1).array(2);
        assert_eq!(jagged_in_grid.canonical(), "i32[][,]");

        let grid_in_jagged = TypeTag::primitive("i32").array(2).array(1);
        assert_eq!(grid_in_jagged.canonical(), "i32[,][]");
    }

    #[test]
    fn nested_canonical() {
        let tag = TypeTag::named("demo", "Outer").nested("Inner");
        assert_eq!(tag.canonical(), "demo::Outer+Inner");
    }

    #[test]
    fn option_unwraps_to_inner() {
        let tag = TypeTag::named("core::option", "Option")
            .with_args(vec![TypeTag::primitive("bool")]);
        assert_eq!(tag.canonical(), "bool");
    }

    #[test]
    fn structural_equality() {
        let a = TypeTag::named("alloc::vec", "Vec").with_args(vec![TypeTag::primitive("u8")]);
        let b = TypeTag::named("alloc::vec", "Vec").with_args(vec![TypeTag::primitive("u8")]);
        assert_eq!(a, b);
        assert_ne!(a, a.clone().array(1));
    }

    #[test]
    fn definition_strips_args() {
        let closed = TypeTag::named("alloc::vec", "Vec").with_args(vec![TypeTag::primitive("u8")]);
        assert_eq!(closed.definition().canonical(), "alloc::vec::Vec");
    }
}
