use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::registry::{Register, TypeMeta};
use crate::tag::{self, TagKind, TypeTag};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The central store of reflectable types.
///
/// Keys are structural [`TypeTag`]s, so a tag built independently (for example
/// by decoding an identity string) finds the same entry the original
/// registration created. Bare type names are indexed too, with ambiguous
/// names tracked and refused rather than resolved arbitrarily.
///
/// # Example
///
/// ```
/// use mirra::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new();
///
/// let tag = registry.decode("alloc::string::String").unwrap();
/// let value = registry.meta(&tag).unwrap().default_value().unwrap();
/// assert_eq!(value.take::<String>().unwrap(), "");
/// ```
pub struct TypeRegistry {
    metas: HashMap<TypeTag, TypeMeta>,
    ident_index: HashMap<&'static str, TypeTag>,
    ambiguous_idents: HashSet<&'static str>,
    /// Canonical strings of generic definitions with at least one registered
    /// closed instantiation; lets `decode` accept unseen instantiations whose
    /// arguments all resolve.
    generic_defs: HashSet<String>,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty registry with no registrations at all.
    pub fn empty() -> Self {
        Self {
            metas: HashMap::new(),
            ident_index: HashMap::new(),
            ambiguous_idents: HashSet::new(),
            generic_defs: HashSet::new(),
        }
    }

    /// Creates a registry pre-loaded with the primitive scalar types.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<()>();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<chrono::NaiveDate>();
        registry.register::<chrono::NaiveDateTime>();
        registry
    }

    /// Registers `T` and, if it was new, its dependencies.
    pub fn register<T: Register>(&mut self) {
        if self.insert_meta(T::type_meta()) {
            T::register_dependencies(self);
        }
    }

    /// Inserts a prebuilt meta. Returns `true` when the tag was new.
    pub fn insert_meta(&mut self, meta: TypeMeta) -> bool {
        let tag = meta.tag().clone();
        if self.metas.contains_key(&tag) {
            return false;
        }

        if let TagKind::Named { args, .. } = tag.kind() {
            if !args.is_empty() {
                self.generic_defs.insert(tag.definition().canonical());
            }
        }

        let ident = leak_free_ident(&tag);
        if !self.ambiguous_idents.contains(ident) {
            if self.ident_index.contains_key(ident) && self.ident_index[ident] != tag {
                self.ident_index.remove(ident);
                self.ambiguous_idents.insert(ident);
            } else {
                self.ident_index.insert(ident, tag.clone());
            }
        }

        self.metas.insert(tag, meta);
        true
    }

    /// Registers every type submitted through
    /// `#[reflect(auto_register)]` / [`inventory`].
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) {
        for entry in inventory::iter::<crate::registry::AutoRegistration> {
            entry.apply(self);
        }
    }

    /// Whether the exact tag is registered.
    #[inline]
    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.metas.contains_key(tag)
    }

    /// The meta registered for `tag`, if any.
    #[inline]
    pub fn meta(&self, tag: &TypeTag) -> Option<&TypeMeta> {
        self.metas.get(tag)
    }

    /// Looks a type up by bare ident (`"String"`); ambiguous names return
    /// `None`.
    pub fn meta_by_ident(&self, ident: &str) -> Option<&TypeMeta> {
        self.ident_index.get(ident).and_then(|tag| self.metas.get(tag))
    }

    /// Whether a bare ident matches more than one registered type.
    #[inline]
    pub fn is_ambiguous(&self, ident: &str) -> bool {
        self.ambiguous_idents.contains(ident)
    }

    /// Decodes a canonical identity string against this registry's scope.
    ///
    /// Resolution order follows the codec contract: exact registered match
    /// first; then a generic identity resolves if its definition is known and
    /// every argument resolves; then an array identity resolves if its
    /// element does. Returns `None` for malformed or unknown identities.
    pub fn decode(&self, identity: &str) -> Option<TypeTag> {
        let tag = tag::parse(identity).ok()?;
        self.resolves(&tag).then_some(tag)
    }

    fn resolves(&self, tag: &TypeTag) -> bool {
        if self.metas.contains_key(tag) {
            return true;
        }
        match tag.kind() {
            TagKind::Array { elem, .. } => self.resolves(elem),
            TagKind::Named { args, .. } if !args.is_empty() => {
                args.iter().all(|arg| self.resolves(arg))
                    && self.generic_defs.contains(&tag.definition().canonical())
            }
            TagKind::Named { .. } => false,
        }
    }

    /// All registered tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &TypeTag> {
        self.metas.keys()
    }

    /// All registered metas, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeMeta> {
        self.metas.values()
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.metas.len()
    }
}

// Bare-ident indexing wants `&'static str` keys without leaking per-type
// strings; idents of registered types come from 'static tag data for all
// derive-produced tags, but hand-built tags may own their ident. Fall back to
// interning through a global once-per-ident table.
fn leak_free_ident(tag: &TypeTag) -> &'static str {
    use parking_lot::Mutex;
    use std::collections::HashSet as Set;
    use std::sync::OnceLock;

    static INTERNED: OnceLock<Mutex<Set<&'static str>>> = OnceLock::new();

    let ident = tag.ident();
    let mut interned = INTERNED.get_or_init(|| Mutex::new(Set::new())).lock();
    match interned.get(ident) {
        Some(existing) => existing,
        None => {
            let leaked: &'static str = Box::leak(ident.to_owned().into_boxed_str());
            interned.insert(leaked);
            leaked
        }
    }
}

// -----------------------------------------------------------------------------
// TypeRegistryArc

/// A shared, clonable handle to a [`TypeRegistry`].
///
/// Registration is a setup-time operation; traversal takes read locks only.
#[derive(Clone, Default)]
pub struct TypeRegistryArc {
    internal: Arc<RwLock<TypeRegistry>>,
}

impl TypeRegistryArc {
    /// Wraps a registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying registry.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read()
    }

    /// Takes a write lock on the underlying registry.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal.write()
    }
}

impl std::fmt::Debug for TypeRegistryArc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistryArc")
            .field("types", &self.internal.read().len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_exact_primitive() {
        let registry = TypeRegistry::new();
        let tag = registry.decode("i32").unwrap();
        assert_eq!(tag.canonical(), "i32");
        assert!(registry.meta(&tag).is_some());
    }

    #[test]
    fn decode_unknown_fails() {
        let registry = TypeRegistry::new();
        assert!(registry.decode("no::such::Type").is_none());
        assert!(registry.decode("i32[[").is_none());
    }

    #[test]
    fn decode_array_of_registered_element() {
        let registry = TypeRegistry::new();
        let tag = registry.decode("i32[]").unwrap();
        assert!(tag.is_array());
        assert_eq!(tag.canonical(), "i32[]");
    }

    #[test]
    fn decode_generic_via_definition() {
        let mut registry = TypeRegistry::new();
        registry.register::<Vec<i32>>();

        // `Vec<u8>` was never registered, but `Vec`'s definition is known and
        // `u8` resolves, so the closed identity decodes.
        assert!(registry.decode("alloc::vec::Vec<u8>").is_some());
        assert!(registry.decode("alloc::vec::Vec<no::such::Type>").is_none());
    }

    #[test]
    fn bare_ident_lookup() {
        let registry = TypeRegistry::new();
        let meta = registry.meta_by_ident("String").unwrap();
        assert_eq!(meta.tag().canonical(), "alloc::string::String");
    }

    #[test]
    fn encode_decode_round_trip_all_registered() {
        let mut registry = TypeRegistry::new();
        registry.register::<Vec<i32>>();
        registry.register::<Vec<Vec<String>>>();

        let tags: Vec<_> = registry.tags().cloned().collect();
        for tag in tags {
            let decoded = registry.decode(&tag.canonical()).unwrap();
            assert_eq!(decoded, tag, "round-trip failed for {tag}");
        }
    }
}
