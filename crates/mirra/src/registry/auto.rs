use crate::registry::TypeRegistry;

// -----------------------------------------------------------------------------
// AutoRegistration

/// A registration hook submitted at link time.
///
/// The derive macro emits one of these for every type annotated with
/// `#[reflect(auto_register)]`; [`TypeRegistry::auto_register`] drains the
/// collected set. Manual submission works too:
///
/// ```ignore
/// inventory::submit! {
///     mirra::registry::AutoRegistration::of::<MyType>()
/// }
/// ```
pub struct AutoRegistration {
    register: fn(&mut TypeRegistry),
}

impl AutoRegistration {
    /// Creates a hook that registers `T` and its dependencies.
    pub const fn of<T: crate::registry::Register>() -> Self {
        Self {
            register: |registry| {
                registry.register::<T>();
            },
        }
    }

    /// Runs the hook against `registry`.
    pub fn apply(&self, registry: &mut TypeRegistry) {
        (self.register)(registry);
    }
}

inventory::collect!(AutoRegistration);
