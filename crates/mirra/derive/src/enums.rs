use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

use crate::attrs::{self, TypeAttrs};
use crate::structs::{auto_register_impl, describe_impl};

// -----------------------------------------------------------------------------
// Expansion

/// Fieldless enums reflect as scalars whose payload is the variant name.
pub(crate) fn expand(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`#[derive(Reflect)]` does not support generic types",
        ));
    }

    let type_attrs = TypeAttrs::parse(&input.attrs)?;

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "`#[derive(Reflect)]` supports only fieldless enum variants",
            ));
        }
        variants.push(&variant.ident);
    }
    let Some(first_variant) = variants.first().copied() else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "`#[derive(Reflect)]` requires at least one enum variant",
        ));
    };

    let ident = &input.ident;
    let name = attrs::lit(&ident.to_string());
    let tokens: Vec<_> = variants
        .iter()
        .map(|variant| attrs::lit(&variant.to_string()))
        .collect();

    let describe_impl = describe_impl(input, &type_attrs);
    let auto_register = auto_register_impl(ident, &type_attrs);

    let clone_fn = type_attrs.clone.then(|| {
        quote! {
            fn reflect_clone(&self) -> ::core::option::Option<::std::boxed::Box<dyn mirra::reflection::Reflect>> {
                ::core::option::Option::Some(::std::boxed::Box::new(
                    <Self as ::core::clone::Clone>::clone(self),
                ))
            }
        }
    });

    let docs = attrs::docs(&input.attrs).map(|docs| {
        let docs = attrs::lit(&docs);
        quote!(.with_docs(#docs))
    });

    // Token matching is case-insensitive; the variant list preserves the
    // declared casing for schemas.
    let token_arms = variants.iter().zip(&tokens).map(|(variant, token)| {
        quote! {
            if token.eq_ignore_ascii_case(#token) {
                return ::core::option::Option::Some(Self::#variant);
            }
        }
    });

    let name_arms = variants.iter().zip(&tokens).map(|(variant, token)| {
        quote!(Self::#variant => #token,)
    });

    Ok(quote! {
        const _: () = {
            static VARIANTS: &[&str] = &[#(#tokens),*];

            impl #ident {
                fn variant_token(&self) -> &'static str {
                    match self {
                        #(#name_arms)*
                    }
                }

                fn from_variant_token(token: &str) -> ::core::option::Option<Self> {
                    #(#token_arms)*
                    ::core::option::Option::None
                }
            }

            #describe_impl

            impl mirra::reflection::Reflect for #ident {
                fn type_tag(&self) -> mirra::tag::TypeTag {
                    <Self as mirra::reflection::Describe>::type_tag()
                }

                fn reflect_kind(&self) -> mirra::reflection::ReflectKind {
                    mirra::reflection::ReflectKind::Scalar
                }

                fn reflect_ref(&self) -> mirra::reflection::ReflectRef<'_> {
                    mirra::reflection::ReflectRef::Scalar(self)
                }

                fn reflect_mut(&mut self) -> mirra::reflection::ReflectMut<'_> {
                    mirra::reflection::ReflectMut::Scalar(self)
                }

                fn set(
                    &mut self,
                    value: ::std::boxed::Box<dyn mirra::reflection::Reflect>,
                ) -> ::core::result::Result<(), ::std::boxed::Box<dyn mirra::reflection::Reflect>> {
                    *self = value.take::<Self>()?;
                    ::core::result::Result::Ok(())
                }

                #clone_fn

                fn reflect_partial_eq(
                    &self,
                    other: &dyn mirra::reflection::Reflect,
                ) -> ::core::option::Option<bool> {
                    let other = other.downcast_ref::<Self>()?;
                    ::core::option::Option::Some(
                        ::core::mem::discriminant(self) == ::core::mem::discriminant(other),
                    )
                }

                fn reflect_debug(
                    &self,
                    f: &mut ::core::fmt::Formatter<'_>,
                ) -> ::core::fmt::Result {
                    ::core::write!(f, "{}::{}", #name, self.variant_token())
                }
            }

            impl mirra::reflection::Scalar for #ident {
                fn to_value(&self) -> mirra::__macro_exports::serde_json::Value {
                    mirra::__macro_exports::serde_json::Value::String(
                        self.variant_token().to_owned(),
                    )
                }

                fn set_from_value(
                    &mut self,
                    value: &mirra::__macro_exports::serde_json::Value,
                ) -> ::core::result::Result<(), ::std::string::String> {
                    let token = value.as_str().ok_or_else(|| {
                        ::std::format!("expected a variant name string, got {value}")
                    })?;
                    match Self::from_variant_token(token) {
                        ::core::option::Option::Some(variant) => {
                            *self = variant;
                            ::core::result::Result::Ok(())
                        }
                        ::core::option::Option::None => ::core::result::Result::Err(
                            ::std::format!("unknown variant `{token}`"),
                        ),
                    }
                }
            }

            impl mirra::registry::Register for #ident {
                fn type_meta() -> mirra::registry::TypeMeta {
                    mirra::registry::TypeMeta::new::<Self>(mirra::reflection::ReflectKind::Scalar)
                        .with_default(|| ::std::boxed::Box::new(Self::#first_variant))
                        .with_tokens(VARIANTS, |token| {
                            Self::from_variant_token(token).map(|variant| {
                                ::std::boxed::Box::new(variant)
                                    as ::std::boxed::Box<dyn mirra::reflection::Reflect>
                            })
                        })
                        #docs
                }
            }

            #auto_register
        };
    })
}
