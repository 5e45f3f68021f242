//! Derive macros for casebook case payloads.
//!
//! - `Describe`: implements `casebook::Describe` by looking up the conventional
//!   case fields (`name`/`scenario`, `debug`, `skip`) on a struct with named fields.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, Ident, PathArguments, Type, parse_macro_input};

/// String fields that can carry a case name, in lookup order.
const NAME_FIELDS: [&str; 4] = ["name", "scenario", "Name", "Scenario"];
const DEBUG_FIELDS: [&str; 2] = ["debug", "Debug"];
const SKIP_FIELDS: [&str; 2] = ["skip", "Skip"];

/// Generates the `casebook::Describe` implementation for a case payload.
///
/// Only fields with the exact conventional names are considered, and only when
/// their type is string-like (for names) or `bool` (for flags). Anything else,
/// including enums and tuple structs, gets the trait defaults.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Describe)]
/// struct Case {
///     name: &'static str,
///     input: i64,
///     skip: bool,
/// }
///
/// // Generates:
/// impl casebook::Describe for Case {
///     fn case_name(&self) -> Option<&str> { /* first non-blank of `name` */ }
///     fn is_debug(&self) -> bool { false }
///     fn is_skip(&self) -> bool { false || self.skip }
/// }
/// ```
#[proc_macro_derive(Describe)]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Only named struct fields are record fields for lookup purposes.
    let fields: Vec<(&Ident, &Type)> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
                .collect(),
            Fields::Unnamed(_) | Fields::Unit => vec![],
        },
        _ => vec![],
    };

    let lookup = |candidates: &[&str], accept: fn(&Type) -> bool| -> Vec<Ident> {
        candidates
            .iter()
            .filter_map(|candidate| {
                fields
                    .iter()
                    .find(|(ident, ty)| *ident == candidate && accept(ty))
                    .map(|(ident, _)| (*ident).clone())
            })
            .collect()
    };

    let name_fields = lookup(&NAME_FIELDS, is_string_type);
    let debug_fields = lookup(&DEBUG_FIELDS, is_bool_type);
    let skip_fields = lookup(&SKIP_FIELDS, is_bool_type);

    let expanded = quote! {
        impl #impl_generics ::casebook::Describe for #name #ty_generics #where_clause {
            fn case_name(&self) -> ::core::option::Option<&str> {
                #(
                    if let ::core::option::Option::Some(text) = ::casebook::case::describe::non_blank(
                        ::core::convert::AsRef::<str>::as_ref(&self.#name_fields),
                    ) {
                        return ::core::option::Option::Some(text);
                    }
                )*
                ::core::option::Option::None
            }

            fn is_debug(&self) -> bool {
                false #(|| self.#debug_fields)*
            }

            fn is_skip(&self) -> bool {
                false #(|| self.#skip_fields)*
            }
        }
    };

    TokenStream::from(expanded)
}

/// `String`, `&str`, and `str` behind `Box`/`Rc`/`Arc`/`Cow`.
fn is_string_type(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => is_str(&reference.elem),
        Type::Group(group) => is_string_type(&group.elem),
        Type::Paren(paren) => is_string_type(&paren.elem),
        Type::Path(path) if path.qself.is_none() => {
            let Some(segment) = path.path.segments.last() else {
                return false;
            };
            match segment.ident.to_string().as_str() {
                "String" => true,
                "Box" | "Rc" | "Arc" | "Cow" => last_type_argument_is_str(&segment.arguments),
                _ => false,
            }
        }
        _ => false,
    }
}

fn is_str(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if path.qself.is_none() && path.path.is_ident("str"))
}

fn last_type_argument_is_str(arguments: &PathArguments) -> bool {
    let PathArguments::AngleBracketed(arguments) = arguments else {
        return false;
    };
    arguments
        .args
        .iter()
        .rev()
        .find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(is_str(ty)),
            _ => None,
        })
        .unwrap_or(false)
}

fn is_bool_type(ty: &Type) -> bool {
    match ty {
        Type::Group(group) => is_bool_type(&group.elem),
        Type::Path(path) => path.qself.is_none() && path.path.is_ident("bool"),
        _ => false,
    }
}
