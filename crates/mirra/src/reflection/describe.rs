use crate::tag::TypeTag;

// -----------------------------------------------------------------------------
// Describe

/// Static access to a type's [`TypeTag`].
///
/// The compile-time counterpart of [`Reflect::type_tag`]: every reflectable
/// type can name its own descriptor without an instance. Implemented by
/// `#[derive(Reflect)]` and by the built-in impls.
///
/// Nullable wrappers are transparent here: `Option<T>::type_tag()` is
/// `T::type_tag()`. Optionality is recorded on the member that holds the
/// value, never in the type identity.
///
/// [`Reflect::type_tag`]: crate::reflection::Reflect::type_tag
pub trait Describe: 'static {
    /// The descriptor of this type.
    fn type_tag() -> TypeTag;
}
