#![recursion_limit = "128"]
//! # docrepo Derive Macros
//!
//! This crate provides the `Document` derive macro for the `docrepo` crate.
//!
//! ## `Document`
//!
//! Implements `docrepo::document::Document` for a struct with named fields,
//! and `docrepo::document::PartitionedDocument` when a partition field is
//! named. The struct must also derive `Clone`, `Serialize` and `Deserialize`.
//!
//! - **Supported for**: Structs with named fields only
//! - **Struct attribute**: `#[document(name = "...", key = "...", partition = "...")]`
//!
//! | Attribute   | Default       | Meaning                                   |
//! |-------------|---------------|-------------------------------------------|
//! | `name`      | the type name | canonical collection name                 |
//! | `key`       | `id`          | field holding the document key            |
//! | `partition` | none          | `String` or `Option<String>` partition field |
//!
//! # Examples
//!
//! ```rust,ignore
//! use docrepo_derive::Document;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Document, Clone, Serialize, Deserialize)]
//! #[document(name = "orders", partition = "tenant")]
//! pub struct Order {
//!     pub id: Uuid,
//!     pub tenant: Option<String>,
//!     pub total: f64,
//! }
//!
//! #[derive(Document, Clone, Serialize, Deserialize)]
//! #[document(key = "sku")]
//! pub struct Product {
//!     pub sku: String,
//!     pub name: String,
//! }
//! ```

extern crate proc_macro;
mod document;

use crate::document::generate_document_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives the `Document` trait.
///
/// The key type is the type of the key field. A `partition` field turns the
/// type into a partitioned document whose instances are stored in the
/// collection of their partition.
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, a tuple struct or a unit struct
/// - The key or partition field does not exist
/// - An unknown `document` attribute is used
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_document_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new(
                    e.span(),
                    format!(
                        "Failed to derive Document for struct '{}': {}.\n\
                         Example: #[derive(Document)] #[document(key = \"id\")] pub struct MyDocument {{ id: Uuid }}",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Enum(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Document for enums. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
        Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Document for unions. Only structs are supported.",
            );
            error.to_compile_error().into()
        }
    }
}
