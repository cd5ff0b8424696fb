//! Proc-macros for trellis.
//!
//! Currently provided:
//! - `#[derive(WithBuilders)]`: generates `with_<field>(...)` builder-style methods
//!   for each named field in a struct.
//!
//! ## Field control
//! - `#[with_builders(skip)]`: no builder is generated for the field. Use it for
//!   engine-computed outputs and for values that must go through a validating setter.
//! - `#[with_builders(into)]`: the builder accepts `impl Into<FieldType>`.
//!
//! ### Example
//! ```ignore
//! use trellis_macros::WithBuilders;
//!
//! #[derive(Clone, Debug, WithBuilders)]
//! pub struct ColumnDefinition {
//!     #[with_builders(into)]
//!     width: GridLength,
//!     min_width: f64,
//!     #[with_builders(skip)]
//!     actual_width: f64,
//! }
//!
//! let column = ColumnDefinition::default()
//!     .with_width(GridLength::Star(2.0))
//!     .with_min_width(40.0);
//! // .with_actual_width(...) is NOT generated.
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Fields};

/// Per-field options parsed from `#[with_builders(...)]`.
#[derive(Default)]
struct FieldOptions {
    skip: bool,
    into: bool,
}

/// Derive that generates `with_<field>` builder methods for structs with named fields.
///
/// Generated methods take `self` by value (builder style) and return `Self`.
///
/// Field attributes:
/// - `#[with_builders(skip)]`: do not generate a builder method for this field.
/// - `#[with_builders(into)]`: take `impl Into<T>` instead of `T`.
#[proc_macro_derive(WithBuilders, attributes(with_builders))]
pub fn derive_with_builders(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let ident = &input.ident;
    let generics = &input.generics;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(
            input.span(),
            "#[derive(WithBuilders)] only supports structs",
        )
        .to_compile_error()
        .into();
    };

    let Fields::Named(fields_named) = &data_struct.fields else {
        return syn::Error::new(
            data_struct.fields.span(),
            "#[derive(WithBuilders)] only supports structs with named fields",
        )
        .to_compile_error()
        .into();
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut methods = Vec::with_capacity(fields_named.named.len());
    for field in fields_named.named.iter() {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };

        let options = match field_options(field) {
            Ok(options) => options,
            Err(err) => return err.to_compile_error().into(),
        };
        if options.skip {
            continue;
        }

        let field_ty = &field.ty;
        let method_ident = format_ident!("with_{}", field_ident);
        let doc = format!("Set `{field_ident}` (builder style).");

        let method = if options.into {
            quote! {
                #[doc = #doc]
                #[inline]
                pub fn #method_ident(
                    mut self,
                    value: impl ::core::convert::Into<#field_ty>,
                ) -> Self {
                    self.#field_ident = value.into();
                    self
                }
            }
        } else {
            quote! {
                #[doc = #doc]
                #[inline]
                pub fn #method_ident(mut self, value: #field_ty) -> Self {
                    self.#field_ident = value;
                    self
                }
            }
        };
        methods.push(method);
    }

    quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#methods)*
        }
    }
    .into()
}

fn field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("with_builders") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("into") {
                options.into = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `into`"))
            }
        })?;
    }

    if options.skip && options.into {
        return Err(syn::Error::new(
            field.span(),
            "`skip` and `into` cannot be combined",
        ));
    }

    Ok(options)
}
