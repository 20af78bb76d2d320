//! Field and container attributes.

use heck::{ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToUpperCamelCase};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Result, Token};

/// Options collected from `#[envlayer(...)]`, `#[serde(...)]` and doc comments.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) env: Option<LitStr>,
    pub(crate) required: bool,
    pub(crate) default: Option<String>,
    pub(crate) ignored: bool,
    pub(crate) describe: Option<String>,
    pub(crate) kind: Option<LitStr>,
    pub(crate) rename: Option<String>,
    pub(crate) skip: bool,
    pub(crate) skip_if: bool,
    pub(crate) flatten: bool,
}

impl FieldAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut out = FieldAttrs::default();
        let mut docs = Vec::new();
        for attr in attrs {
            if attr.path().is_ident("envlayer") {
                attr.parse_nested_meta(|meta| out.envlayer(meta))?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| out.serde(meta))?;
            } else if let Some(line) = doc_line(attr) {
                docs.push(line);
            }
        }
        if out.describe.is_none() {
            let text = docs.join(" ");
            if !text.is_empty() {
                out.describe = Some(text);
            }
        }
        Ok(out)
    }

    fn envlayer(&mut self, meta: ParseNestedMeta<'_>) -> Result<()> {
        if meta.path.is_ident("env") {
            self.env = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("required") {
            self.required = true;
        } else if meta.path.is_ident("default") {
            let lit: Lit = meta.value()?.parse()?;
            self.default = Some(literal_text(&lit)?);
        } else if meta.path.is_ident("ignored") {
            self.ignored = true;
        } else if meta.path.is_ident("describe") {
            let text: LitStr = meta.value()?.parse()?;
            self.describe = Some(text.value());
        } else if meta.path.is_ident("kind") {
            self.kind = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("unknown envlayer option"));
        }
        Ok(())
    }

    fn serde(&mut self, meta: ParseNestedMeta<'_>) -> Result<()> {
        if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
            let name: LitStr = meta.value()?.parse()?;
            self.rename = Some(name.value());
        } else if meta.path.is_ident("skip")
            || meta.path.is_ident("skip_serializing")
            || meta.path.is_ident("skip_deserializing")
        {
            self.skip = true;
        } else if meta.path.is_ident("skip_serializing_if") {
            self.skip_if = true;
            skip_value(&meta)?;
        } else if meta.path.is_ident("flatten") {
            self.flatten = true;
        } else {
            skip_value(&meta)?;
        }
        Ok(())
    }
}

/// Container-level `#[serde(rename_all = "...")]`.
pub(crate) fn rename_all(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut rule = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                rule = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                skip_value(&meta)
            }
        })?;
    }
    Ok(rule)
}

/// Serialized name of a snake_case field under a serde `rename_all` rule.
pub(crate) fn apply_rename_all(rule: &LitStr, field: &str) -> Result<String> {
    Ok(match rule.value().as_str() {
        "lowercase" | "snake_case" => field.to_string(),
        "UPPERCASE" => field.to_ascii_uppercase(),
        "PascalCase" => field.to_upper_camel_case(),
        "camelCase" => field.to_lower_camel_case(),
        "SCREAMING_SNAKE_CASE" => field.to_shouty_snake_case(),
        "kebab-case" => field.to_kebab_case(),
        "SCREAMING-KEBAB-CASE" => field.to_shouty_kebab_case(),
        other => {
            return Err(syn::Error::new(
                rule.span(),
                format!("unknown rename_all rule {other:?}"),
            ));
        }
    })
}

/// Consume the value of a serde option this derive does not care about.
fn skip_value(meta: &ParseNestedMeta<'_>) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_value(&nested))?;
    }
    Ok(())
}

fn doc_line(attr: &Attribute) -> Option<String> {
    if !attr.path().is_ident("doc") {
        return None;
    }
    let Meta::NameValue(pair) = &attr.meta else {
        return None;
    };
    let Expr::Lit(ExprLit {
        lit: Lit::Str(text),
        ..
    }) = &pair.value
    else {
        return None;
    };
    let line = text.value().trim().to_string();
    (!line.is_empty()).then_some(line)
}

fn literal_text(lit: &Lit) -> Result<String> {
    match lit {
        Lit::Str(text) => Ok(text.value()),
        Lit::Int(int) => Ok(int.base10_digits().to_string()),
        Lit::Float(float) => Ok(float.base10_digits().to_string()),
        Lit::Bool(flag) => Ok(flag.value.to_string()),
        other => Err(syn::Error::new(
            other.span(),
            "default must be a string, number or bool literal",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{Field, parse_quote};

    fn attrs(field: Field) -> FieldAttrs {
        FieldAttrs::parse(&field.attrs).expect("parse")
    }

    #[test]
    fn reads_envlayer_options_and_docs() {
        let parsed = attrs(parse_quote! {
            /// Listen
            /// port.
            #[envlayer(required, env = "PORT", default = 8080)]
            #[serde(rename = "listen", default, with = "crate::duration")]
            port: u16
        });
        assert!(parsed.required);
        assert_eq!(parsed.env.map(|env| env.value()).as_deref(), Some("PORT"));
        assert_eq!(parsed.default.as_deref(), Some("8080"));
        assert_eq!(parsed.rename.as_deref(), Some("listen"));
        assert_eq!(parsed.describe.as_deref(), Some("Listen port."));
        assert!(!parsed.skip);
    }

    #[test]
    fn flags_fields_hidden_from_serde() {
        let skipped = attrs(parse_quote! { #[serde(skip)] cache: u8 });
        assert!(skipped.skip);
        let conditional = attrs(parse_quote! {
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<String>
        });
        assert!(conditional.skip_if);
        assert!(!conditional.skip);
    }

    #[test]
    fn rejects_unknown_options() {
        let field: Field = parse_quote! { #[envlayer(secret)] token: String };
        assert!(FieldAttrs::parse(&field.attrs).is_err());
    }

    #[test]
    fn renames_like_serde() {
        let rule = |text: &str| LitStr::new(text, proc_macro2::Span::call_site());
        assert_eq!(apply_rename_all(&rule("camelCase"), "max_conns").unwrap(), "maxConns");
        assert_eq!(apply_rename_all(&rule("PascalCase"), "max_conns").unwrap(), "MaxConns");
        assert_eq!(apply_rename_all(&rule("kebab-case"), "max_conns").unwrap(), "max-conns");
        assert_eq!(
            apply_rename_all(&rule("SCREAMING_SNAKE_CASE"), "max_conns").unwrap(),
            "MAX_CONNS"
        );
        assert!(apply_rename_all(&rule("Title Case"), "max_conns").is_err());
    }
}
