//! `#[derive(Settings)]` for envlayer config structs.
//!
//! Generates `Settings::fields()` from the struct definition, so the
//! descriptor table always names the fields serde actually writes. Use it
//! through the `envlayer-rs` crate, which re-exports it next to the trait.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attr;
mod expand;
mod kind;

/// Derive the descriptor table of a struct with named fields.
///
/// Field names follow `#[serde(rename = "...")]` and the container's
/// `#[serde(rename_all = "...")]`. Fields marked `#[serde(skip)]` are left
/// out. Kinds are inferred from the field type: integers, floats, `bool`,
/// `String`, `Duration`, `Vec`/sets of those, string-keyed maps of those,
/// and `Option`/`Box` of any of them. Any other type is a nested record and
/// must implement `Settings` itself.
///
/// Field options, all given in `#[envlayer(...)]`:
///
/// - `env = "NAME"`: read this variable verbatim instead of the derived name.
/// - `required`: fail the load when no source supplies the field.
/// - `default = "literal"`: applied when neither the file nor the environment does.
/// - `ignored`: never read the field from the environment.
/// - `describe = "text"`: usage help. Doc comments are used when absent.
/// - `kind = "string"`: treat a leaf as `bool`, `integer`, `unsigned`,
///   `float`, `string` or `duration` regardless of its type.
#[proc_macro_derive(Settings, attributes(envlayer))]
pub fn derive_settings(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::settings(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
