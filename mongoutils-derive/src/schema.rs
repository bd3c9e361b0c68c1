use crate::case::{unraw, RenameRule};
use proc_macro::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{DataStruct, DeriveInput, LitBool, LitStr, Result, Token};

struct IndexAttr {
    name: Option<String>,
    fields: LitStr,
    unique: bool,
}

struct IndexColumn {
    name: String,
    descending: bool,
}

pub(crate) fn generate_schema_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut schema_name = name.to_string();
    let mut rename_rule: Option<RenameRule> = None;
    let mut indexes = Vec::new();

    for attr in &ast.attrs {
        if attr.path().is_ident("schema") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value = meta.value()?;
                    let s: LitStr = value.parse()?;
                    if s.value().trim().is_empty() {
                        return Err(syn::Error::new_spanned(s, "Schema name cannot be empty"));
                    }
                    schema_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("index") {
                    indexes.push(parse_index(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("Unknown schema attribute, expected `name` or `index`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    rename_rule = Some(parse_rename_all(&meta)?);
                    Ok(())
                } else {
                    skip_meta(&meta)
                }
            })?;
        }
    }

    let mut field_names: Vec<String> = Vec::with_capacity(data.fields.len());
    for field in &data.fields {
        let ident = match &field.ident {
            Some(ident) => ident,
            None => continue,
        };

        let mut rename: Option<String> = None;
        let mut skipped = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("serde") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if let Some(serialized) = parse_rename(&meta)? {
                        rename = Some(serialized);
                    }
                    Ok(())
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    skipped = true;
                    Ok(())
                } else if meta.path.is_ident("flatten") {
                    Err(meta.error("#[serde(flatten)] is not supported, declare the fields explicitly"))
                } else {
                    skip_meta(&meta)
                }
            })?;
        }

        if skipped {
            continue;
        }

        let key = match rename {
            Some(rename) => rename,
            None => match rename_rule {
                Some(rule) => rule.apply(&unraw(ident)),
                None => unraw(ident),
            },
        };
        field_names.push(key);
    }

    let mut indexes_code = Vec::with_capacity(indexes.len());
    for index in &indexes {
        let columns = parse_columns(&index.fields, &field_names)?;
        let columns_code = columns.iter().map(|column| {
            let column_name = &column.name;
            if column.descending {
                quote! { mongoutils::index::IndexColumnConfig::desc(#column_name) }
            } else {
                quote! { mongoutils::index::IndexColumnConfig::asc(#column_name) }
            }
        });
        let unique = index.unique;
        let name_code = match &index.name {
            Some(index_name) => quote! { .name(#index_name) },
            None => quote! {},
        };
        indexes_code.push(quote! {
            mongoutils::index::IndexConfig::new()
                .columns_from(vec![#(#columns_code),*])
                .unique(#unique)
                #name_code
        });
    }

    let schema_indexes_code = if indexes_code.is_empty() {
        quote! {}
    } else {
        quote! {
            fn schema_indexes() -> Vec<mongoutils::index::IndexConfig> {
                vec![#(#indexes_code),*]
            }
        }
    };

    let gen = quote! {
        impl #impl_generics mongoutils::schema::Schema for #name #ty_generics #where_clause {
            fn schema_name() -> &'static str {
                #schema_name
            }

            fn field_names() -> &'static [&'static str] {
                &[#(#field_names),*]
            }

            #schema_indexes_code
        }
    };

    Ok(TokenStream::from(gen))
}

fn parse_index(meta: &ParseNestedMeta) -> Result<IndexAttr> {
    let mut name: Option<String> = None;
    let mut fields: Option<LitStr> = None;
    let mut unique = false;

    meta.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            let value = meta.value()?;
            let s: LitStr = value.parse()?;
            if !s.value().is_empty() {
                name = Some(s.value());
            }
            Ok(())
        } else if meta.path.is_ident("fields") {
            let value = meta.value()?;
            fields = Some(value.parse()?);
            Ok(())
        } else if meta.path.is_ident("unique") {
            if meta.input.peek(Token![=]) {
                let value = meta.value()?;
                let b: LitBool = value.parse()?;
                unique = b.value;
            } else {
                unique = true;
            }
            Ok(())
        } else {
            Err(meta.error("Unknown index attribute, expected `name`, `fields` or `unique`"))
        }
    })?;

    match fields {
        Some(fields) => Ok(IndexAttr {
            name,
            fields,
            unique,
        }),
        None => Err(meta.error("Index fields are required")),
    }
}

/// Parses `"word:desc, definition"` and checks every column against the
/// document keys.
fn parse_columns(fields: &LitStr, field_names: &[String]) -> Result<Vec<IndexColumn>> {
    let value = fields.value();
    let mut columns = Vec::new();
    for entry in value.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (name, order) = match entry.split_once(':') {
            Some((name, order)) => (name.trim(), order.trim()),
            None => (entry, "asc"),
        };

        let descending = match order.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => false,
            "desc" | "descending" | "-1" => true,
            other => {
                return Err(syn::Error::new_spanned(
                    fields,
                    format!("Unknown sort order '{}' for index column '{}'", other, name),
                ))
            }
        };

        let head = name.split('.').next().unwrap_or(name);
        if !field_names.iter().any(|field| field == head) {
            return Err(syn::Error::new_spanned(
                fields,
                format!(
                    "Index key '{}' not found, expected one of: {}",
                    name,
                    field_names.join(", ")
                ),
            ));
        }

        columns.push(IndexColumn {
            name: name.to_string(),
            descending,
        });
    }

    if columns.is_empty() {
        return Err(syn::Error::new_spanned(
            fields,
            "Index must have at least one column",
        ));
    }
    Ok(columns)
}

fn parse_rename_all(meta: &ParseNestedMeta) -> Result<RenameRule> {
    let rule = match parse_rename(meta)? {
        Some(rule) => rule,
        None => return Err(meta.error("rename_all needs a serialize rule")),
    };
    match RenameRule::parse(&rule) {
        Some(rule) => Ok(rule),
        None => Err(meta.error(format!("Unknown rename_all rule '{}'", rule))),
    }
}

/// Reads `rename = "x"` or the serialize half of `rename(serialize = "x")`.
fn parse_rename(meta: &ParseNestedMeta) -> Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let value = meta.value()?;
        let s: LitStr = value.parse()?;
        return Ok(Some(s.value()));
    }

    let mut serialize: Option<String> = None;
    meta.parse_nested_meta(|meta| {
        if meta.path.is_ident("serialize") {
            let value = meta.value()?;
            let s: LitStr = value.parse()?;
            serialize = Some(s.value());
            Ok(())
        } else {
            skip_meta(&meta)
        }
    })?;
    Ok(serialize)
}

/// Consumes a serde attribute this macro does not care about.
fn skip_meta(meta: &ParseNestedMeta) -> Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}
