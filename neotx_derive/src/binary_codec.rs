//! Derive macro for automatic binary serialization.
//!
//! Generates `Encode` and `Decode` implementations for structs and enums.
//!
//! # Supported Types
//!
//! - **Named structs**: `struct Witness { invocation: Vec<u8>, verification: Vec<u8> }`
//! - **Tuple structs**: `struct UInt160([u8; 20])`
//! - **Enums**: `enum AttributeUsage { Url = 0x81 }`, with optional tuple or named fields
//!
//! Unions and unit structs are not supported.
//!
//! # Binary Format
//!
//! Fields are serialized in declaration order using each field's own `Encode`
//! implementation. Enums are prefixed with a single discriminant byte, taken
//! from the explicit `= value` when present. Decoding reads through a
//! `Reader` cursor and rejects unknown discriminants with
//! `EncodingError::InvalidValue`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Fields, parse_macro_input};

/// Derives `Encode` and `Decode` for a type.
///
/// # Example
///
/// ```ignore
/// use neotx_derive::BinaryCodec;
///
/// #[derive(BinaryCodec)]
/// pub struct CoinReference {
///     pub prev_hash: UInt256,
///     pub prev_index: u16,
/// }
/// ```
///
/// # Generated Code
///
/// ```ignore
/// impl Encode for CoinReference {
///     fn encode<S: EncodeSink>(&self, out: &mut S) {
///         self.prev_hash.encode(out);
///         self.prev_index.encode(out);
///     }
/// }
///
/// impl Decode for CoinReference {
///     fn decode(reader: &mut Reader<'_>) -> Result<Self, EncodingError> {
///         Ok(Self {
///             prev_hash: UInt256::decode(reader)?,
///             prev_index: u16::decode(reader)?,
///         })
///     }
/// }
/// ```
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => {
                generate_named_struct_impl(name, &impl_generics, &ty_generics, where_clause, fields)
            }
            Fields::Unnamed(fields) => {
                generate_tuple_struct_impl(name, &impl_generics, &ty_generics, where_clause, fields)
            }
            Fields::Unit => {
                syn::Error::new_spanned(&input, "BinaryCodec derive does not support unit structs")
                    .to_compile_error()
            }
        },
        Data::Enum(data_enum) => {
            match generate_enum_impl(name, &impl_generics, &ty_generics, where_clause, data_enum) {
                Ok(tokens) => tokens,
                Err(err) => err.to_compile_error(),
            }
        }
        Data::Union(_) => {
            syn::Error::new_spanned(&input, "BinaryCodec derive does not support unions")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Generates `Encode` and `Decode` for named-field structs.
fn generate_named_struct_impl(
    name: &syn::Ident,
    impl_generics: &syn::ImplGenerics,
    ty_generics: &syn::TypeGenerics,
    where_clause: Option<&syn::WhereClause>,
    fields: &syn::FieldsNamed,
) -> proc_macro2::TokenStream {
    let field_names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();

    let encode_fields = field_names.iter().map(|name| {
        quote! {
            crate::types::encoding::Encode::encode(&self.#name, out);
        }
    });

    let decode_fields = field_names.iter().map(|name| {
        quote! {
            #name: crate::types::encoding::Decode::decode(reader)?,
        }
    });

    quote! {
        impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
            fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                #(#encode_fields)*
            }
        }

        impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
            fn decode(
                reader: &mut crate::types::encoding::Reader<'_>,
            ) -> ::std::result::Result<Self, crate::types::encoding::EncodingError> {
                Ok(Self {
                    #(#decode_fields)*
                })
            }
        }
    }
}

/// Generates `Encode` and `Decode` for tuple structs, typically newtypes.
fn generate_tuple_struct_impl(
    name: &syn::Ident,
    impl_generics: &syn::ImplGenerics,
    ty_generics: &syn::TypeGenerics,
    where_clause: Option<&syn::WhereClause>,
    fields: &syn::FieldsUnnamed,
) -> proc_macro2::TokenStream {
    let indices: Vec<_> = (0..fields.unnamed.len()).map(syn::Index::from).collect();

    let encode_fields = indices.iter().map(|i| {
        quote! {
            crate::types::encoding::Encode::encode(&self.#i, out);
        }
    });

    let decode_fields = indices.iter().map(|_| {
        quote! {
            crate::types::encoding::Decode::decode(reader)?,
        }
    });

    quote! {
        impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
            fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                #(#encode_fields)*
            }
        }

        impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
            fn decode(
                reader: &mut crate::types::encoding::Reader<'_>,
            ) -> ::std::result::Result<Self, crate::types::encoding::EncodingError> {
                Ok(Self(#(#decode_fields)*))
            }
        }
    }
}

/// Generates `Encode` and `Decode` for enums.
///
/// Each variant is written as its one-byte discriminant followed by its fields.
fn generate_enum_impl(
    name: &syn::Ident,
    impl_generics: &syn::ImplGenerics,
    ty_generics: &syn::TypeGenerics,
    where_clause: Option<&syn::WhereClause>,
    data_enum: &DataEnum,
) -> syn::Result<proc_macro2::TokenStream> {
    let discriminants = compute_discriminants(data_enum)?;
    let type_name = name.to_string();

    let encode_arms = data_enum.variants.iter().zip(discriminants.iter()).map(|(variant, &idx)| {
        let variant_name = &variant.ident;

        match &variant.fields {
            Fields::Unit => {
                quote! {
                    Self::#variant_name => {
                        crate::types::encoding::Encode::encode(&#idx, out);
                    }
                }
            }
            Fields::Unnamed(fields) => {
                let field_names: Vec<_> = (0..fields.unnamed.len())
                    .map(|i| quote::format_ident!("f{}", i))
                    .collect();
                let encode_fields = field_names.iter().map(|f| {
                    quote! { crate::types::encoding::Encode::encode(#f, out); }
                });
                quote! {
                    Self::#variant_name(#(#field_names),*) => {
                        crate::types::encoding::Encode::encode(&#idx, out);
                        #(#encode_fields)*
                    }
                }
            }
            Fields::Named(fields) => {
                let field_names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
                let encode_fields = field_names.iter().map(|f| {
                    quote! { crate::types::encoding::Encode::encode(#f, out); }
                });
                quote! {
                    Self::#variant_name { #(#field_names),* } => {
                        crate::types::encoding::Encode::encode(&#idx, out);
                        #(#encode_fields)*
                    }
                }
            }
        }
    });

    let decode_arms = data_enum.variants.iter().zip(discriminants.iter()).map(|(variant, &idx)| {
        let variant_name = &variant.ident;

        match &variant.fields {
            Fields::Unit => {
                quote! {
                    #idx => Ok(Self::#variant_name),
                }
            }
            Fields::Unnamed(fields) => {
                let decode_fields = (0..fields.unnamed.len()).map(|_| {
                    quote! { crate::types::encoding::Decode::decode(reader)?, }
                });
                quote! {
                    #idx => Ok(Self::#variant_name(#(#decode_fields)*)),
                }
            }
            Fields::Named(fields) => {
                let decode_fields = fields.named.iter().map(|f| {
                    let field_name = &f.ident;
                    quote! { #field_name: crate::types::encoding::Decode::decode(reader)?, }
                });
                quote! {
                    #idx => Ok(Self::#variant_name { #(#decode_fields)* }),
                }
            }
        }
    });

    Ok(quote! {
        impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
            fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                match self {
                    #(#encode_arms)*
                }
            }
        }

        impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
            fn decode(
                reader: &mut crate::types::encoding::Reader<'_>,
            ) -> ::std::result::Result<Self, crate::types::encoding::EncodingError> {
                let tag: u8 = crate::types::encoding::Decode::decode(reader)?;
                match tag {
                    #(#decode_arms)*
                    other => Err(crate::types::encoding::EncodingError::InvalidValue(
                        format!("unknown {} tag 0x{:02x}", #type_name, other),
                    )),
                }
            }
        }
    })
}

/// Computes discriminant values for each enum variant.
///
/// Follows Rust's discriminant rules:
/// - If explicit value provided (e.g., `Url = 0x81`), use it
/// - Otherwise, increment from the previous variant's discriminant
/// - First variant defaults to 0 if no explicit value
fn compute_discriminants(data_enum: &DataEnum) -> syn::Result<Vec<u8>> {
    let mut discriminants = Vec::with_capacity(data_enum.variants.len());
    let mut next_discriminant: Option<u8> = Some(0);

    for variant in &data_enum.variants {
        let discriminant = match &variant.discriminant {
            Some((_, expr)) => parse_discriminant_expr(expr)?,
            None => next_discriminant.ok_or_else(|| {
                syn::Error::new_spanned(variant, "enum discriminant overflows u8")
            })?,
        };

        discriminants.push(discriminant);
        next_discriminant = discriminant.checked_add(1);
    }

    Ok(discriminants)
}

/// Parses a discriminant expression to extract its u8 value.
///
/// Accepts decimal and hex integer literals.
fn parse_discriminant_expr(expr: &syn::Expr) -> syn::Result<u8> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(lit_int),
            ..
        }) => lit_int.base10_parse::<u8>(),
        _ => Err(syn::Error::new_spanned(
            expr,
            "BinaryCodec discriminant must be an integer literal that fits in a u8",
        )),
    }
}
