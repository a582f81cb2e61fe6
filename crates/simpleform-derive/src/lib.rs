//! Derive macro for binding validated form data onto structs.
//!
//! This crate provides `#[derive(Bind)]`, which implements
//! `simpleform::Bindable` for structs with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives `simpleform::Bindable` for a struct.
///
/// Every field type must implement `serde::Serialize` (to pre-fill a form
/// from an existing object) and `serde::de::DeserializeOwned` (to bind
/// validated data back onto it).
///
/// # Field Attributes
///
/// - `#[bind(skip)]` - Never read or written by forms
/// - `#[bind(rename = "form_name")]` - Uses a different form field name
///   (defaults to the field name)
///
/// # Generated Items
///
/// - `Bindable::field_names` listing the form field names in declaration
///   order
/// - `Bindable::has_field`, `Bindable::field_value` and `Bindable::set_field`
///   dispatching on the form field name
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_bind_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_bind_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Bind derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Bind derive only supports structs",
            ));
        }
    };

    let mut bound_fields: Vec<BoundField> = Vec::new();
    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_bind_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        bound_fields.push(BoundField {
            ident: field_ident.clone(),
            form_name: attrs
                .rename
                .unwrap_or_else(|| field_ident.to_string().trim_start_matches("r#").to_string()),
        });
    }

    let form_names: Vec<&str> = bound_fields.iter().map(|f| f.form_name.as_str()).collect();

    let has_field = if form_names.is_empty() {
        quote! { false }
    } else {
        quote! { ::core::matches!(name, #(#form_names)|*) }
    };

    let getters: Vec<TokenStream2> = bound_fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let name = &f.form_name;
            quote! {
                #name => ::simpleform::__private::serde_json::to_value(&self.#ident).ok(),
            }
        })
        .collect();

    let setters: Vec<TokenStream2> = bound_fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let name = &f.form_name;
            quote! {
                #name => {
                    self.#ident = ::simpleform::__private::serde_json::from_value(value)
                        .map_err(|e| e.to_string())?;
                    ::core::result::Result::Ok(())
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl #impl_generics ::simpleform::Bindable for #struct_name #ty_generics #where_clause {
            fn field_names(&self) -> ::std::vec::Vec<&str> {
                ::std::vec![#(#form_names),*]
            }

            fn has_field(&self, name: &str) -> bool {
                #has_field
            }

            fn field_value(
                &self,
                name: &str,
            ) -> ::core::option::Option<::simpleform::__private::serde_json::Value> {
                match name {
                    #(#getters)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_field(
                &mut self,
                name: &str,
                value: ::simpleform::__private::serde_json::Value,
            ) -> ::core::result::Result<(), ::std::string::String> {
                match name {
                    #(#setters)*
                    _ => ::core::result::Result::Err(
                        ::std::format!("no field named `{}`", name),
                    ),
                }
            }
        }
    };

    Ok(expanded)
}

struct BoundField {
    ident: Ident,
    form_name: String,
}

#[derive(Default)]
struct BindAttrs {
    skip: bool,
    rename: Option<String>,
}

fn parse_bind_attrs(attrs: &[Attribute]) -> syn::Result<BindAttrs> {
    let mut result = BindAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        // Handle empty attribute like #[bind]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: Expr = meta.value()?.parse()?;
                match value {
                    Expr::Lit(lit) => match lit.lit {
                        Lit::Str(s) => {
                            result.rename = Some(s.value());
                            Ok(())
                        }
                        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
                    },
                    other => Err(syn::Error::new_spanned(other, "expected a string literal")),
                }
            } else {
                Err(meta.error("unsupported bind attribute"))
            }
        })?;
    }

    Ok(result)
}
