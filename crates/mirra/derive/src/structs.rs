use proc_macro2::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Fields};

use crate::attrs::{self, FieldAttrs, TypeAttrs};

// -----------------------------------------------------------------------------
// Field model

struct ReflectField<'a> {
    ident: &'a syn::Ident,
    name: String,
    ty: &'a syn::Type,
    attrs: FieldAttrs,
    public: bool,
    optional: bool,
    docs: Option<String>,
}

fn collect_fields(data: &DataStruct) -> syn::Result<Vec<ReflectField<'_>>> {
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "`#[derive(Reflect)]` supports only named-field structs",
        ));
    };

    let mut out = Vec::new();
    for field in &fields.named {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "named field expected"))?;
        out.push(ReflectField {
            ident,
            name: ident.to_string(),
            ty: &field.ty,
            public: matches!(field.vis, syn::Visibility::Public(_)),
            optional: attrs::is_option(&field.ty),
            docs: attrs::docs(&field.attrs),
            attrs,
        });
    }
    Ok(out)
}

// -----------------------------------------------------------------------------
// Expansion

pub(crate) fn expand(input: &DeriveInput, data: &DataStruct) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`#[derive(Reflect)]` does not support generic types",
        ));
    }

    let type_attrs = TypeAttrs::parse(&input.attrs)?;
    let fields = collect_fields(data)?;

    let ident = &input.ident;

    let member_infos = fields.iter().map(|field| {
        let ty = field.ty;
        let field_name = attrs::lit(&field.name);
        let mut entry = quote! {
            mirra::info::MemberInfo::new::<#ty>(#field_name)
        };
        if field.attrs.property {
            entry = quote!(#entry.property());
        }
        if !field.public {
            entry = quote!(#entry.private());
        }
        if field.attrs.read_only {
            entry = quote!(#entry.read_only());
        }
        if field.optional {
            entry = quote!(#entry.optional());
        }
        if let Some(docs) = &field.docs {
            let docs = attrs::lit(docs);
            entry = quote!(#entry.with_docs(#docs));
        }
        entry
    });

    let describe_impl = describe_impl(input, &type_attrs);
    let reflect_impl = reflect_impl(input, &type_attrs, &fields);
    let struct_impl = struct_impl(&fields);
    let register_impl = register_impl(input, &fields);
    let auto_register = auto_register_impl(ident, &type_attrs);

    Ok(quote! {
        const _: () = {
            static MEMBER_INFOS: &[mirra::info::MemberInfo] = &[
                #(#member_infos,)*
            ];

            #describe_impl

            #reflect_impl

            impl mirra::reflection::Struct for #ident {
                #struct_impl
            }

            impl mirra::registry::Register for #ident {
                #register_impl
            }

            #auto_register
        };
    })
}

pub(crate) fn describe_impl(input: &DeriveInput, type_attrs: &TypeAttrs) -> TokenStream {
    let ident = &input.ident;
    let name = attrs::lit(&ident.to_string());
    let tag = match &type_attrs.nested_in {
        Some(outer) => quote! {
            <#outer as mirra::reflection::Describe>::type_tag().nested(#name)
        },
        None => quote! {
            mirra::tag::TypeTag::named(::core::module_path!(), #name)
        },
    };
    quote! {
        impl mirra::reflection::Describe for #ident {
            fn type_tag() -> mirra::tag::TypeTag {
                #tag
            }
        }
    }
}

fn reflect_impl(
    input: &DeriveInput,
    type_attrs: &TypeAttrs,
    fields: &[ReflectField<'_>],
) -> TokenStream {
    let ident = &input.ident;
    let name = attrs::lit(&ident.to_string());

    let clone_fn = type_attrs.clone.then(|| {
        quote! {
            fn reflect_clone(&self) -> ::core::option::Option<::std::boxed::Box<dyn mirra::reflection::Reflect>> {
                ::core::option::Option::Some(::std::boxed::Box::new(
                    <Self as ::core::clone::Clone>::clone(self),
                ))
            }
        }
    });

    let eq_members = fields.iter().map(|field| {
        let member = field.ident;
        quote! {
            if !::core::matches!(
                mirra::reflection::Reflect::reflect_partial_eq(&self.#member, &other.#member),
                ::core::option::Option::Some(true)
            ) {
                return ::core::option::Option::Some(false);
            }
        }
    });

    let debug_members = fields.iter().map(|field| {
        let member = field.ident;
        let member_name = attrs::lit(&field.name);
        quote! {
            .field(#member_name, &(&self.#member as &dyn mirra::reflection::Reflect))
        }
    });

    quote! {
        impl mirra::reflection::Reflect for #ident {
            fn type_tag(&self) -> mirra::tag::TypeTag {
                <Self as mirra::reflection::Describe>::type_tag()
            }

            fn reflect_kind(&self) -> mirra::reflection::ReflectKind {
                mirra::reflection::ReflectKind::Struct
            }

            fn reflect_ref(&self) -> mirra::reflection::ReflectRef<'_> {
                mirra::reflection::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> mirra::reflection::ReflectMut<'_> {
                mirra::reflection::ReflectMut::Struct(self)
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
                #(#eq_members)*
                ::core::option::Option::Some(true)
            }

            fn reflect_debug(
                &self,
                f: &mut ::core::fmt::Formatter<'_>,
            ) -> ::core::fmt::Result {
                f.debug_struct(#name)
                    #(#debug_members)*
                    .finish()
            }
        }
    }
}

fn struct_impl(fields: &[ReflectField<'_>]) -> TokenStream {
    let member_arms = fields.iter().map(|field| {
        let member = field.ident;
        let member_name = attrs::lit(&field.name);
        quote!(#member_name => ::core::option::Option::Some(&self.#member),)
    });
    let member_mut_arms = fields.iter().map(|field| {
        let member = field.ident;
        let member_name = attrs::lit(&field.name);
        quote!(#member_name => ::core::option::Option::Some(&mut self.#member),)
    });
    let member_at_arms = fields.iter().enumerate().map(|(index, field)| {
        let member = field.ident;
        quote!(#index => ::core::option::Option::Some(&self.#member),)
    });
    let member_len = fields.len();

    quote! {
        fn member(&self, name: &str) -> ::core::option::Option<&dyn mirra::reflection::Reflect> {
            match name {
                #(#member_arms)*
                _ => ::core::option::Option::None,
            }
        }

        fn member_mut(
            &mut self,
            name: &str,
        ) -> ::core::option::Option<&mut dyn mirra::reflection::Reflect> {
            match name {
                #(#member_mut_arms)*
                _ => ::core::option::Option::None,
            }
        }

        fn member_at(
            &self,
            index: usize,
        ) -> ::core::option::Option<&dyn mirra::reflection::Reflect> {
            match index {
                #(#member_at_arms)*
                _ => ::core::option::Option::None,
            }
        }

        fn member_len(&self) -> usize {
            #member_len
        }

        fn member_infos(&self) -> &'static [mirra::info::MemberInfo] {
            MEMBER_INFOS
        }
    }
}

fn register_impl(input: &DeriveInput, fields: &[ReflectField<'_>]) -> TokenStream {
    let docs = attrs::docs(&input.attrs).map(|docs| {
        let docs = attrs::lit(&docs);
        quote!(.with_docs(#docs))
    });
    let dependencies = fields.iter().map(|field| {
        let ty = field.ty;
        quote!(registry.register::<#ty>();)
    });

    quote! {
        fn type_meta() -> mirra::registry::TypeMeta {
            mirra::registry::TypeMeta::new::<Self>(mirra::reflection::ReflectKind::Struct)
                .with_members(MEMBER_INFOS)
                .with_default(|| ::std::boxed::Box::new(
                    <Self as ::core::default::Default>::default(),
                ))
                #docs
        }

        fn register_dependencies(registry: &mut mirra::registry::TypeRegistry) {
            #(#dependencies)*
        }
    }
}

pub(crate) fn auto_register_impl(ident: &syn::Ident, type_attrs: &TypeAttrs) -> TokenStream {
    if !type_attrs.auto_register || !cfg!(feature = "auto_register") {
        return TokenStream::new();
    }
    quote! {
        mirra::__macro_exports::inventory::submit! {
            mirra::registry::AutoRegistration::of::<#ident>()
        }
    }
}
