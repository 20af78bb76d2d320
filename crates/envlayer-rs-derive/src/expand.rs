//! Code generation for `#[derive(Settings)]`.

use crate::attr::{FieldAttrs, apply_rename_all, rename_all};
use crate::kind::{self, Kind};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DataStruct, DeriveInput, Fields, Result, Type};

pub(crate) fn settings(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(DataStruct {
        fields: Fields::Named(named),
        ..
    }) = &input.data
    else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Settings can only be derived for structs with named fields",
        ));
    };

    let rule = rename_all(&input.attrs)?;
    let mut descriptors = Vec::new();
    for field in &named.named {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        if attrs.flatten {
            return Err(syn::Error::new_spanned(
                field,
                "flattened fields cannot be described; nest them as a record",
            ));
        }
        if attrs.skip_if {
            return Err(syn::Error::new_spanned(
                field,
                "skip_serializing_if hides the field from the loader; use skip or remove it",
            ));
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = match (&attrs.rename, &rule) {
            (Some(name), _) => name.clone(),
            (None, Some(rule)) => apply_rename_all(rule, &ident.unraw().to_string())?,
            (None, None) => ident.unraw().to_string(),
        };
        descriptors.push(descriptor(&name, &field.ty, &attrs)?);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::envlayer_rs::schema::Settings for #ident #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::envlayer_rs::schema::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }
        }
    })
}

fn descriptor(name: &str, ty: &Type, attrs: &FieldAttrs) -> Result<TokenStream> {
    let schema = quote!(::envlayer_rs::schema);
    let base = match &attrs.kind {
        Some(named) => {
            let kind = kind::named(named)?;
            quote!(#schema::FieldDescriptor::new(#name, #kind))
        }
        None => match kind::classify(ty)? {
            Kind::Leaf(kind) => quote!(#schema::FieldDescriptor::new(#name, #kind)),
            Kind::Record(inner) => {
                if attrs.required || attrs.default.is_some() {
                    return Err(syn::Error::new_spanned(
                        ty,
                        "required and default apply to leaf fields only",
                    ));
                }
                quote!(#schema::FieldDescriptor::record(
                    #name,
                    <#inner as #schema::Settings>::fields(),
                ))
            }
        },
    };

    let mut options = Vec::new();
    if attrs.required {
        options.push(quote!(.required()));
    }
    if let Some(env) = &attrs.env {
        options.push(quote!(.env(#env)));
    }
    if let Some(literal) = &attrs.default {
        options.push(quote!(.default_value(#literal)));
    }
    if attrs.ignored {
        options.push(quote!(.ignored()));
    }
    if let Some(text) = &attrs.describe {
        options.push(quote!(.describe(#text)));
    }
    Ok(quote!(#base #(#options)*))
}
