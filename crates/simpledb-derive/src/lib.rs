//! Derive macro for simpledb record types.
//!
//! `#[derive(Entity)]` declares a struct's fields once, at compile time, and
//! generates both the field-descriptor list used for DDL and the mapper that
//! builds the struct from a result row.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Meta, Type};

/// Derives `simpledb_core::entity::Entity` for a struct with named fields.
///
/// # Attributes
///
/// - `#[entity(table = "table_name")]` - Specifies the table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(name = "column_name")]` - Specifies the column name
///   (optional, defaults to field name)
/// - `#[column(skip)]` - The field is not stored. It is excluded from DDL and
///   left at `Default::default()` when mapping rows.
///
/// A field named `id` becomes the auto-incrementing primary key. `Option<T>`
/// fields are nullable. Every field type must implement `Default`.
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut field_infos = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "field has no name"));
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        let column_name = attrs
            .name
            .unwrap_or_else(|| field_name.to_string().trim_start_matches("r#").to_string());
        field_infos.push(FieldInfo {
            field_name,
            field_type: field.ty.clone(),
            column_name,
            skip: attrs.skip,
        });
    }

    let descriptors = field_infos.iter().map(|info| {
        let column_name = &info.column_name;
        let field_type = &info.field_type;
        let descriptor = quote! {
            ::simpledb_core::entity::FieldDescriptor::new(
                #column_name,
                <#field_type as ::simpledb_core::entity::FieldValue>::FIELD_TYPE,
            )
            .nullable(<#field_type as ::simpledb_core::entity::FieldValue>::NULLABLE)
        };
        if info.skip {
            quote! { #descriptor.transient() }
        } else {
            descriptor
        }
    });

    let initializers = field_infos.iter().map(|info| {
        let field_name = &info.field_name;
        let column_name = &info.column_name;
        if info.skip {
            quote! { #field_name: ::core::default::Default::default() }
        } else {
            quote! {
                #field_name: ::simpledb_core::entity::field_or_default(row, #column_name)?
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::simpledb_core::entity::Entity for #struct_name #ty_generics
            #where_clause
        {
            const TABLE: &'static str = #table_name;

            const FIELDS: &'static [::simpledb_core::entity::FieldDescriptor] = &[
                #(#descriptors),*
            ];

            fn from_row(
                row: &::simpledb_core::ResultRow,
            ) -> ::core::result::Result<Self, ::simpledb_core::ResultShapeError> {
                ::core::result::Result::Ok(Self {
                    #(#initializers),*
                })
            }
        }
    })
}

struct FieldInfo {
    field_name: Ident,
    field_type: Type,
    column_name: String,
    skip: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    skip: bool,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    let mut table_name = None;
    for attr in attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let value: LitStr = meta.value()?.parse()?;
                    table_name = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity attribute, expected `table`"))
                }
            })?;
        }
    }
    Ok(table_name.unwrap_or_else(|| to_snake_case(&struct_name.to_string())))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("column") || matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                result.name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported column attribute, expected `name` or `skip`"))
            }
        })?;
    }

    Ok(result)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Article"), "article");
        assert_eq!(to_snake_case("BlogPost"), "blog_post");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_rejects_tuple_struct() {
        let input: DeriveInput = syn::parse_quote! {
            struct Pair(i64, String);
        };
        let err = derive_entity_impl(&input).unwrap_err();
        assert!(err.to_string().contains("named fields"));
    }

    #[test]
    fn test_rejects_unknown_column_attribute() {
        let input: DeriveInput = syn::parse_quote! {
            struct Article {
                #[column(primary_key)]
                id: i64,
            }
        };
        assert!(derive_entity_impl(&input).is_err());
    }

    #[test]
    fn test_table_attribute_overrides_default() {
        let input: DeriveInput = syn::parse_quote! {
            #[entity(table = "posts")]
            struct BlogPost {
                id: i64,
            }
        };
        let tokens = derive_entity_impl(&input).unwrap().to_string();
        assert!(tokens.contains("\"posts\""));
        assert!(!tokens.contains("\"blog_post\""));
    }

    #[test]
    fn test_skipped_field_is_transient_and_defaulted() {
        let input: DeriveInput = syn::parse_quote! {
            struct Article {
                id: i64,
                #[column(skip)]
                cache: String,
                #[column(name = "is_blind")]
                blind: bool,
            }
        };
        let tokens = derive_entity_impl(&input).unwrap().to_string();
        assert!(tokens.contains("transient"));
        assert!(tokens.contains("\"is_blind\""));
        assert!(!tokens.contains("\"blind\""));
        assert!(tokens.contains("field_or_default"));
    }
}
