//! Derive macros for the `mirra` reflection engine.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

// -----------------------------------------------------------------------------
// Modules

mod attrs;
mod enums;
mod structs;

// -----------------------------------------------------------------------------
// Macros

/// Derives full reflection support.
///
/// Supported shapes:
///
/// - named-field structs, which reflect as member aggregates;
/// - fieldless enums, which reflect as scalar tokens (the variant name).
///
/// Structs additionally require [`Default`], which the engine uses to
/// construct instances during deserialization. Enums default to their first
/// variant.
///
/// # Type-level attributes
///
/// - `#[reflect(clone)]` — expose cloning through reflection (requires
///   `Clone`).
/// - `#[reflect(auto_register)]` — submit the type for link-time
///   registration (`auto_register` feature).
/// - `#[reflect(nested_in(Outer))]` — identity of a nested type:
///   `module::Outer+Inner`.
///
/// # Field-level attributes
///
/// - `#[reflect(property)]` — surface the field in the wire's property list
///   rather than the field list.
/// - `#[reflect(read_only)]` — serialized, never populated.
/// - `#[reflect(skip)]` — invisible to reflection entirely.
///
/// ```rust, ignore
/// #[derive(Reflect, Default)]
/// struct Account {
///     pub name: String,
///     #[reflect(read_only)]
///     pub id: u64,
///     #[reflect(skip)]
///     session_key: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = match &input.data {
        syn::Data::Struct(data) => structs::expand(&input, data),
        syn::Data::Enum(data) => enums::expand(&input, data),
        syn::Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "`#[derive(Reflect)]` does not support unions",
        )),
    };
    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
