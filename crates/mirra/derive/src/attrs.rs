use syn::{Attribute, LitStr};

use crate::REFLECT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Attribute parsing

/// `#[reflect(..)]` flags valid on the type itself.
#[derive(Default)]
pub(crate) struct TypeAttrs {
    pub clone: bool,
    pub auto_register: bool,
    pub nested_in: Option<syn::Path>,
}

impl TypeAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("clone") {
                    out.clone = true;
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    out.auto_register = true;
                    Ok(())
                } else if meta.path.is_ident("nested_in") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    out.nested_in = Some(content.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unknown `reflect` attribute on type"))
                }
            })?;
        }
        Ok(out)
    }
}

/// `#[reflect(..)]` flags valid on a named field.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub property: bool,
    pub read_only: bool,
    pub skip: bool,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("property") {
                    out.property = true;
                    Ok(())
                } else if meta.path.is_ident("read_only") {
                    out.read_only = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown `reflect` attribute on field"))
                }
            })?;
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Doc capture

/// Collects `///` lines into one trimmed description, `None` when absent.
pub(crate) fn docs(attrs: &[Attribute]) -> Option<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let syn::Meta::NameValue(meta) = &attr.meta {
            if let syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) = &meta.value
            {
                lines.push(lit.value().trim().to_owned());
            }
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Whether a field's type is syntactically `Option<..>`.
pub(crate) fn is_option(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Option")
}

/// Renders a string literal at the call site.
pub(crate) fn lit(value: &str) -> LitStr {
    LitStr::new(value, proc_macro2::Span::call_site())
}
