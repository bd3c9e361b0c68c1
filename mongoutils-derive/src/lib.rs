#![recursion_limit = "128"]
//! # mongoutils Derive Macros
//!
//! This crate provides the `Schema` derive macro for the `mongoutils` crate.
//!
//! ## Macros
//!
//! ### `Schema`
//!
//! Derives the `mongoutils::schema::Schema` trait for structs with named
//! fields. The list of document keys is computed from the struct's fields
//! after applying serde's `rename`, `rename_all` and `skip` attributes, so it
//! matches what the BSON encoder produces.
//!
//! - **Supported for**: Structs with named fields
//! - **Container attribute**: `#[schema(name = "...", index(...))]`
//!
//! # Examples
//!
//! ```rust,ignore
//! use mongodb::bson::oid::ObjectId;
//! use mongoutils_derive::Schema;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Schema)]
//! #[schema(name = "Item", index(name = "by_word", fields = "word:desc, definition", unique))]
//! pub struct Item {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub word: String,
//!     pub definition: String,
//! }
//! ```
//!
//! ## Error Messages
//!
//! Index columns are checked while compiling: naming a field the struct does
//! not have, or a sort order other than `asc` / `desc`, is a compile error.
//! `#[serde(flatten)]` is rejected because the flattened keys cannot be known
//! from the struct alone.

extern crate proc_macro;
mod case;
mod schema;

use crate::schema::generate_schema_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput, Fields};

/// Derives the `Schema` trait.
///
/// # Attributes
///
/// - `#[schema(name = "...")]` - Schema name, defaults to the struct name
/// - `#[schema(index(fields = "...", name = "...", unique))]` - An index to
///   create when the collection is ensured; `fields` is a comma separated
///   list of `field` or `field:asc|desc`
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, a tuple struct or a unit struct
/// - An index names a field that is not a key of the document
/// - A field uses `#[serde(flatten)]`
///
/// # Examples
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize, Schema)]
/// #[serde(rename_all = "camelCase")]
/// pub struct Account {
///     pub user_name: String,
///     pub created_at: i64,
/// }
///
/// assert_eq!(Account::field_names(), &["userName", "createdAt"]);
/// ```
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => {
            if !matches!(data.fields, Fields::Named(_)) {
                let error = syn::Error::new_spanned(
                    &ast,
                    "Cannot derive Schema for tuple or unit structs. Only structs with named fields are supported.",
                );
                return error.to_compile_error().into();
            }

            match generate_schema_for_struct(&ast, data) {
                Ok(token_stream) => token_stream,
                Err(e) => {
                    let error = syn::Error::new(
                        e.span(),
                        format!("Failed to derive Schema for struct '{}': {}", ast.ident, e),
                    );
                    error.to_compile_error().into()
                }
            }
        }
        Data::Enum(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Schema for enums. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
        Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Schema for unions. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
    }
}
