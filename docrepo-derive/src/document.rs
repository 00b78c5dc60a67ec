use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Field, Fields, LitStr, Result};

pub(crate) fn generate_document_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    if !matches!(data.fields, Fields::Named(_)) {
        return Err(syn::Error::new_spanned(
            ast,
            "only structs with named fields are supported",
        ));
    }

    let mut collection_name: Option<String> = None;
    let mut key_field = "id".to_string();
    let mut partition_field: Option<String> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("document") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    if s.value().is_empty() {
                        return Err(meta.error("collection name cannot be empty"));
                    }
                    collection_name = Some(s.value());
                    Ok(())
                } else if meta.path.is_ident("key") {
                    let s: LitStr = meta.value()?.parse()?;
                    key_field = s.value();
                    Ok(())
                } else if meta.path.is_ident("partition") {
                    let s: LitStr = meta.value()?.parse()?;
                    partition_field = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown document attribute"))
                }
            })?;
        }
    }

    let key = find_field(ast, data, &key_field)?;
    let key_ident = &key.ident;
    let key_type = &key.ty;

    let collection_name_code = collection_name.map(|collection_name| {
        quote! {
            fn collection_name() -> String {
                #collection_name.to_string()
            }
        }
    });

    let (as_partitioned_code, partitioned_impl) = match partition_field {
        Some(ref partition_field) => {
            let partition_ident = &find_field(ast, data, partition_field)?.ident;
            (
                quote! {
                    fn as_partitioned(&self) -> Option<&dyn docrepo::document::PartitionedDocument> {
                        Some(self)
                    }
                },
                quote! {
                    impl #impl_generics docrepo::document::PartitionedDocument for #name #ty_generics #where_clause {
                        fn partition_key(&self) -> Option<&str> {
                            docrepo::document::AsPartitionKey::as_partition_key(&self.#partition_ident)
                        }
                    }
                },
            )
        }
        None => (quote! {}, quote! {}),
    };

    let gen = quote! {
        impl #impl_generics docrepo::document::Document<#key_type> for #name #ty_generics #where_clause {
            fn id(&self) -> &#key_type {
                &self.#key_ident
            }

            fn set_id(&mut self, id: #key_type) {
                self.#key_ident = id;
            }

            #collection_name_code
            #as_partitioned_code
        }

        #partitioned_impl
    };

    Ok(TokenStream::from(gen))
}

fn find_field<'a>(ast: &DeriveInput, data: &'a DataStruct, field_name: &str) -> Result<&'a Field> {
    data.fields
        .iter()
        .find(|field| {
            field
                .ident
                .as_ref()
                .is_some_and(|ident| ident == field_name)
        })
        .ok_or_else(|| {
            syn::Error::new_spanned(ast, format!("field {} not found in struct", field_name))
        })
}
