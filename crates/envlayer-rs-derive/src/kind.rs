//! Field kind inference from Rust types.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, LitStr, PathArguments, PathSegment, Result, Type};

/// How a field is described.
pub(crate) enum Kind<'a> {
    /// Leaf field with this `FieldKind` expression.
    Leaf(TokenStream),
    /// Nested record whose table comes from this type's `Settings` impl.
    Record(&'a Type),
}

pub(crate) fn classify(ty: &Type) -> Result<Kind<'_>> {
    let Some(segment) = last_segment(ty) else {
        return Err(syn::Error::new_spanned(
            ty,
            "cannot describe this type; add #[envlayer(kind = \"...\")]",
        ));
    };
    let kind = quote!(::envlayer_rs::schema::FieldKind);
    let tokens = match segment.ident.to_string().as_str() {
        "Option" | "Box" => return classify(type_argument(segment, 0, ty)?),
        "bool" => quote!(#kind::Bool),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => quote!(#kind::Integer),
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => quote!(#kind::Unsigned),
        "f32" | "f64" => quote!(#kind::Float),
        "String" | "char" | "PathBuf" => quote!(#kind::String),
        "Duration" => quote!(#kind::Duration),
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => {
            let inner = element(type_argument(segment, 0, ty)?)?;
            quote!(#kind::list(#inner))
        }
        "HashMap" | "BTreeMap" => {
            let inner = element(type_argument(segment, 1, ty)?)?;
            quote!(#kind::map(#inner))
        }
        _ => return Ok(Kind::Record(ty)),
    };
    Ok(Kind::Leaf(tokens))
}

/// `FieldKind` expression for an explicit `kind = "..."` option.
pub(crate) fn named(name: &LitStr) -> Result<TokenStream> {
    let kind = quote!(::envlayer_rs::schema::FieldKind);
    Ok(match name.value().as_str() {
        "bool" => quote!(#kind::Bool),
        "integer" => quote!(#kind::Integer),
        "unsigned" => quote!(#kind::Unsigned),
        "float" => quote!(#kind::Float),
        "string" => quote!(#kind::String),
        "duration" => quote!(#kind::Duration),
        other => {
            return Err(syn::Error::new(
                name.span(),
                format!("unknown kind {other:?}"),
            ));
        }
    })
}

fn element(ty: &Type) -> Result<TokenStream> {
    match classify(ty)? {
        Kind::Leaf(tokens) => Ok(tokens),
        Kind::Record(_) => Err(syn::Error::new_spanned(
            ty,
            "list and map elements must be scalar",
        )),
    }
}

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

fn type_argument<'a>(segment: &'a PathSegment, index: usize, ty: &Type) -> Result<&'a Type> {
    if let PathArguments::AngleBracketed(args) = &segment.arguments {
        let found = args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .nth(index);
        if let Some(found) = found {
            return Ok(found);
        }
    }
    Err(syn::Error::new_spanned(ty, "expected a type argument"))
}
