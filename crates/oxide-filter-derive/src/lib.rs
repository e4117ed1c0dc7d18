//! Derive macro for filterable models.
//!
//! This crate provides the `#[derive(Filterable)]` macro, which implements
//! `oxide_filter_core::Model` by listing one field descriptor per field.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Token, parse_macro_input};

/// Derives `Model` for a struct with named fields.
///
/// # Field Attributes
///
/// - `#[filter(tag = "name")]` - Tag used by textual filters (optional,
///   defaults to the serde name of the field)
/// - `#[filter(column = "column_name")]` - SQL column name (optional,
///   defaults to the tag)
/// - `#[filter(skip)]` - The field cannot be filtered on
///
/// # Serde Attributes
///
/// `#[serde(rename = "...")]` on a field and `#[serde(rename_all = "...")]`
/// on the struct are honored when picking the default tag, so textual
/// filters use the same names as the serialized form.
///
/// # Generated Items
///
/// For a struct `User`, this macro generates `impl Model for User` with
/// `NAME = "User"` and a descriptor per field whose path is `"User.<field>"`.
#[proc_macro_derive(Filterable, attributes(filter))]
pub fn derive_filterable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_filterable_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_filterable_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Filterable derive does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Filterable derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Filterable derive only supports structs",
            ));
        }
    };

    let rename_all = get_rename_all(&input.attrs)?;

    let mut descriptors: Vec<TokenStream2> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_filter_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        let name = unraw(field_name);
        let tag = match (attrs.tag, get_serde_rename(&field.attrs)?) {
            (Some(tag), _) | (None, Some(tag)) => tag,
            (None, None) => rename_all.map_or_else(|| name.clone(), |rule| rule.apply(&name)),
        };
        let column = attrs.column.unwrap_or_else(|| tag.clone());
        let path = format!("{struct_name}.{name}");
        let field_type = &field.ty;

        descriptors.push(quote! {
            ::oxide_filter_core::schema::FieldDescriptor::new(
                #name,
                #tag,
                #column,
                #path,
                ::core::mem::offset_of!(#struct_name, #field_name),
                <#field_type as ::oxide_filter_core::value::FieldType>::VALUE_TYPE,
            )
        });
    }

    let model_name = struct_name.to_string();
    let expanded = quote! {
        impl ::oxide_filter_core::schema::Model for #struct_name {
            const NAME: &'static str = #model_name;
            const FIELDS: &'static [::oxide_filter_core::schema::FieldDescriptor] = &[
                #(#descriptors),*
            ];
        }
    };

    Ok(expanded)
}

#[derive(Default)]
struct FilterAttrs {
    tag: Option<String>,
    column: Option<String>,
    skip: bool,
}

/// Serde `rename_all` rules that produce valid tags.
#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
}

impl RenameRule {
    fn parse(rule: &str) -> Option<Self> {
        match rule {
            "lowercase" => Some(Self::Lower),
            "UPPERCASE" => Some(Self::Upper),
            "PascalCase" => Some(Self::Pascal),
            "camelCase" => Some(Self::Camel),
            "snake_case" => Some(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnake),
            _ => None,
        }
    }

    /// Applies the rule to a snake_case field name.
    fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => to_pascal_case(field),
            Self::Camel => {
                let pascal = to_pascal_case(field);
                let mut chars = pascal.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_lowercase().to_string() + chars.as_str()
                })
            }
        }
    }
}

fn string_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

/// Reads a string value that must be usable as a textual filter tag.
fn tag_value(meta: &ParseNestedMeta) -> syn::Result<String> {
    let value = string_value(meta)?;
    if !is_valid_tag(&value) {
        return Err(meta.error(format!(
            "\"{value}\" is not a valid filter tag (expected [A-Za-z_][A-Za-z0-9_]*)"
        )));
    }
    Ok(value)
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Consumes an attribute entry this macro does not care about.
fn skip_meta(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| skip_meta(&nested))?;
    }
    Ok(())
}

fn parse_filter_attrs(attrs: &[Attribute]) -> syn::Result<FilterAttrs> {
    let mut result = FilterAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("filter") {
            // Handle empty attribute like #[filter]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("tag") {
                    result.tag = Some(tag_value(&meta)?);
                } else if meta.path.is_ident("column") {
                    result.column = Some(string_value(&meta)?);
                } else {
                    return Err(meta.error("unknown filter attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn get_serde_rename(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;
    for attr in attrs {
        if attr.path().is_ident("serde") && matches!(attr.meta, Meta::List(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    rename = Some(tag_value(&meta)?);
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
    }
    Ok(rename)
}

fn get_rename_all(attrs: &[Attribute]) -> syn::Result<Option<RenameRule>> {
    let mut rule = None;
    for attr in attrs {
        if attr.path().is_ident("serde") && matches!(attr.meta, Meta::List(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                    let value = string_value(&meta)?;
                    rule = RenameRule::parse(&value);
                    if rule.is_none() {
                        return Err(meta.error(format!(
                            "rename_all = \"{value}\" does not produce valid filter tags"
                        )));
                    }
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
    }
    Ok(rule)
}

/// Field name without a raw identifier prefix.
fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").map_or(name.clone(), String::from)
}

fn to_pascal_case(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}
