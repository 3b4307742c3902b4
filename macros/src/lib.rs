use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta, Token, parse_macro_input};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(syn::LitStr),
    Flag,
}

const KNOWN_KEYS: &[&str] = &["env", "cmd", "doc", "secret", "nested", "skip"];

/// Derive `lodr::Record` for a struct with named fields.
///
/// Field attributes, all optional:
/// - `#[lodr(env = "NAME")]`: environment variable (suffix when a prefix is set)
/// - `#[lodr(cmd = "name")]`: command-line flag
/// - `#[lodr(doc = "...")]`: description, defaults to the first doc-comment line
/// - `#[lodr(secret)]`: never render the value in docs or `--help`
/// - `#[lodr(nested)]`: the field is itself a `Record`
/// - `#[lodr(skip)]`: hide the field from every loader except files
///
/// `nested` and `skip` exclude each other and every other key.
///
/// Any other field must implement `lodr::Scalar`.
#[proc_macro_derive(Record, attributes(lodr))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Extract fields from the struct
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Ok(empty_impl(input)),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut pushes = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let config = parse_field_config(&field.attrs)?;

        // Extract cfg attributes for feature gating
        let cfg_attrs: Vec<&Attribute> = field
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .collect();

        let name = field_name.unraw().to_string();
        let doc = config.doc.unwrap_or_else(|| doc_comment(&field.attrs));
        let env = optional_str(config.env.as_deref());
        let cmd = optional_str(config.cmd.as_deref());
        let secret = config.secret;
        let meta = quote! {
            ::lodr::FieldMeta {
                name: #name,
                doc: #doc,
                env: #env,
                cmd: #cmd,
                secret: #secret,
            }
        };

        let push = match config.mode {
            FieldMode::Scalar => quote! {
                #(#cfg_attrs)*
                fields.push(::lodr::Field::scalar(#meta, &mut self.#field_name));
            },
            FieldMode::Nested => quote! {
                #(#cfg_attrs)*
                fields.push(::lodr::Field::nested(#meta, &mut self.#field_name));
            },
            FieldMode::Skip => continue,
        };
        pushes.push(push);
    }

    let capacity = pushes.len();

    Ok(quote! {
        impl #impl_generics ::lodr::Record for #struct_name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::lodr::Field<'_>> {
                #[allow(unused_mut)]
                let mut fields = ::std::vec::Vec::with_capacity(#capacity);
                #(#pushes)*
                fields
            }
        }
    })
}

fn empty_impl(input: &DeriveInput) -> proc_macro2::TokenStream {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    quote! {
        impl #impl_generics ::lodr::Record for #struct_name #ty_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::lodr::Field<'_>> {
                ::std::vec::Vec::new()
            }
        }
    }
}

fn optional_str(value: Option<&str>) -> proc_macro2::TokenStream {
    match value {
        Some(s) => quote! { ::std::option::Option::Some(#s) },
        None => quote! { ::std::option::Option::None },
    }
}

/// First non-empty line of the field's `///` comments
fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .flat_map(|doc| doc.lines().map(|l| l.trim().to_string()).collect::<Vec<_>>())
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
struct FieldConfig {
    env: Option<String>,
    cmd: Option<String>,
    doc: Option<String>,
    secret: bool,
    mode: FieldMode,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum FieldMode {
    #[default]
    Scalar,
    Nested,
    Skip,
}

/// Parse #[lodr(env = "X", cmd = "y", nested)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(meta.error(format!(
                "unknown lodr attribute `{key}`, expected one of: env, cmd, doc, nested, skip"
            )));
        }

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;
            let value: syn::LitStr = meta.input.parse()?;
            values.insert(key, MetaValue::Str(value));
        } else {
            values.insert(key, MetaValue::Flag);
        }

        Ok(())
    })?;

    Ok(values)
}

fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("lodr")) {
        let parsed = match &attr.meta {
            Meta::List(list) => parse_field_list(list)?,
            _ => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "lodr attribute must be a list: #[lodr(env = \"...\", ...)]",
                ));
            }
        };

        for (key, value) in parsed {
            match (key.as_str(), value) {
                ("env", MetaValue::Str(s)) => config.env = Some(non_empty(&s)?),
                ("cmd", MetaValue::Str(s)) => config.cmd = Some(non_empty(&s)?),
                ("doc", MetaValue::Str(s)) => config.doc = Some(s.value().trim().to_string()),
                ("secret", MetaValue::Flag) => config.secret = true,
                ("nested", MetaValue::Flag) => set_mode(&mut config, FieldMode::Nested, attr)?,
                ("skip", MetaValue::Flag) => set_mode(&mut config, FieldMode::Skip, attr)?,
                ("secret" | "nested" | "skip", MetaValue::Str(s)) => {
                    return Err(syn::Error::new_spanned(
                        s,
                        format!("`{key}` takes no value"),
                    ));
                }
                (_, _) => {
                    return Err(syn::Error::new_spanned(
                        attr,
                        format!("`{key}` must be a string literal: {key} = \"...\""),
                    ));
                }
            }
        }

        if config.mode != FieldMode::Scalar
            && (config.env.is_some() || config.cmd.is_some() || config.secret)
        {
            return Err(syn::Error::new_spanned(
                attr,
                "nested and skipped fields cannot carry env, cmd or secret",
            ));
        }
    }

    Ok(config)
}

fn set_mode(config: &mut FieldConfig, mode: FieldMode, attr: &Attribute) -> syn::Result<()> {
    if config.mode != FieldMode::Scalar && config.mode != mode {
        return Err(syn::Error::new_spanned(
            attr,
            "`nested` and `skip` cannot be combined",
        ));
    }
    config.mode = mode;
    Ok(())
}

fn non_empty(lit: &syn::LitStr) -> syn::Result<String> {
    let value = lit.value();
    if value.trim().is_empty() {
        return Err(syn::Error::new_spanned(lit, "name must not be empty"));
    }
    Ok(value)
}
