//! Derive macros for the pyro firework engine.
//!
//! This crate provides one derive macro:
//!
//! - [`ParticleKind`] - Turns a closed enum into an indexable particle class
//!
//! # Usage
//!
//! The macro is re-exported from the main `pyro` crate. You don't need
//! to add this crate directly:
//!
//! ```ignore
//! use pyro::prelude::*;
//!
//! #[derive(ParticleKind, Clone, Copy, PartialEq, Eq, Debug)]
//! enum Shell {
//!     Peony,
//!     Willow,
//! }
//!
//! assert_eq!(Shell::count(), 2);
//! assert_eq!(Shell::ALL[1], Shell::Willow);
//! ```
//!
//! # The ParticleKind Macro
//!
//! `#[derive(ParticleKind)]` makes a unit-variant enum usable as a column
//! value in the particle pool and as an index into static config tables.
//!
//! It generates:
//! - `From<EnumName> for u32` - Convert variant to its sequential id
//! - `From<u32> for EnumName` - Convert back (invalid ids map to the first variant)
//! - `EnumName::count() -> u32` - Number of variants
//! - `EnumName::ALL` - Every variant in declaration order
//! - `index()` / `name()` - Table index and lower-case variant name

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive macro for particle class enums.
///
/// Variants are assigned sequential ids starting from 0, in declaration order.
///
/// # Generated Items
///
/// For an enum `Shell`:
///
/// - `impl From<Shell> for u32`
/// - `impl From<u32> for Shell` (invalid values default to the first variant)
/// - `Shell::count() -> u32`
/// - `Shell::ALL: [Shell; N]`
/// - `Shell::index(self) -> usize`
/// - `Shell::name(self) -> &'static str`
///
/// # Requirements
///
/// - Must be an enum (not a struct)
/// - All variants must be unit variants (no fields)
/// - The enum must be `Copy`
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to a struct or union
/// - Any variant has fields
/// - The enum has zero variants
#[proc_macro_derive(ParticleKind)]
pub fn derive_particle_kind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_particle_kind(&input).into()
}

fn expand_particle_kind(input: &DeriveInput) -> TokenStream2 {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => panic!("ParticleKind derive only supports enums"),
    };

    if variants.is_empty() {
        panic!("ParticleKind enum `{}` must have at least one variant", name);
    }

    for variant in variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            panic!(
                "ParticleKind enum variants must be unit variants (no fields). \
                 Found fields on variant '{}'",
                variant.ident
            );
        }
    }

    let into_arms: Vec<_> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let variant_name = &variant.ident;
            let idx = i as u32;
            quote! { #name::#variant_name => #idx }
        })
        .collect();

    let from_arms: Vec<_> = variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            let variant_name = &variant.ident;
            let idx = i as u32;
            quote! { #idx => #name::#variant_name }
        })
        .collect();

    let name_arms: Vec<_> = variants
        .iter()
        .map(|variant| {
            let variant_name = &variant.ident;
            let lower = variant_name.to_string().to_lowercase();
            quote! { #name::#variant_name => #lower }
        })
        .collect();

    let all_variants: Vec<_> = variants
        .iter()
        .map(|variant| {
            let variant_name = &variant.ident;
            quote! { #name::#variant_name }
        })
        .collect();

    let first_variant = &variants[0].ident;
    let variant_count = variants.len() as u32;
    let array_len = variants.len();

    quote! {
        impl From<#name> for u32 {
            fn from(value: #name) -> u32 {
                match value {
                    #(#into_arms),*
                }
            }
        }

        impl From<u32> for #name {
            fn from(value: u32) -> #name {
                match value {
                    #(#from_arms,)*
                    _ => #name::#first_variant,
                }
            }
        }

        impl #name {
            /// Every variant, in declaration order.
            pub const ALL: [#name; #array_len] = [#(#all_variants),*];

            /// Returns the number of variants in this particle class enum.
            pub const fn count() -> u32 {
                #variant_count
            }

            /// Position of this variant in [`Self::ALL`].
            #[inline]
            pub fn index(self) -> usize {
                u32::from(self) as usize
            }

            /// Lower-case variant name.
            pub fn name(self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    }
}
