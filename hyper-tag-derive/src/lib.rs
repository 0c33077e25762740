//! # HyperTAG Derive Macros
//!
//! `#[derive(TagMapped)]` marks a type for the hyper-tag object mapper.
//!
//! ## Container Attributes
//! - *(none)*: an aggregate; every named field maps to a name/value pair
//! - `#[tag(self_describing)]`: the type implements `TagStruct` and `Default`
//! - `#[tag(registered)]`: the type only maps through a converter registered
//!   in the active `TypeRegistry`
//!
//! ## Field Attributes
//! - `#[tag(rename = "Name")]`: wire name of the member (default: the field name)
//! - `#[tag(skip)]`: never written; left at its default when read
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::{parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derives `TagMapped` (and `TagAggregate` for plain aggregates).
#[proc_macro_derive(TagMapped, attributes(tag))]
pub fn derive_tag_mapped(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Rule {
    Aggregate,
    SelfDescribing,
    Registered,
}

struct Member {
    ident: syn::Ident,
    name: LitStr,
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let rule = parse_container_attributes(&input.attrs)?;

    // Every type parameter must itself be mappable
    let params: Vec<syn::Ident> = input.generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = input.generics.make_where_clause();
    for param in params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::hyper_tag::mapping::TagMapped));
    }

    let rule_path = match rule {
        Rule::Aggregate => quote!(::hyper_tag::mapping::AggregateRule),
        Rule::SelfDescribing => quote!(::hyper_tag::mapping::SelfDescribingRule),
        Rule::Registered => quote!(::hyper_tag::mapping::NoRule),
    };

    let aggregate = match rule {
        Rule::Aggregate => generate_aggregate(&input)?,
        _ => TokenStream2::new(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #aggregate

        impl #impl_generics ::hyper_tag::mapping::TagMapped for #name #ty_generics #where_clause {
            fn to_tag(
                &self,
                ctx: &::hyper_tag::mapping::MappingContext<'_>,
            ) -> ::hyper_tag::Result<::hyper_tag::Tag> {
                ::hyper_tag::mapping::dispatch_to_tag(self, ctx, &#rule_path)
            }

            fn from_tag(
                tag: &::hyper_tag::Tag,
                ctx: &::hyper_tag::mapping::MappingContext<'_>,
            ) -> ::hyper_tag::Result<Self> {
                ::hyper_tag::mapping::dispatch_from_tag(tag, ctx, &#rule_path)
            }
        }
    })
}

fn parse_container_attributes(attrs: &[Attribute]) -> syn::Result<Rule> {
    let mut rule = Rule::Aggregate;
    for attr in attrs {
        if !attr.path().is_ident("tag") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let selected = if meta.path.is_ident("self_describing") {
                Rule::SelfDescribing
            } else if meta.path.is_ident("registered") {
                Rule::Registered
            } else {
                return Err(meta.error(
                    "Unknown tag attribute key. Supported: self_describing, registered",
                ));
            };
            if rule != Rule::Aggregate && rule != selected {
                return Err(meta.error("self_describing and registered are exclusive"));
            }
            rule = selected;
            Ok(())
        })?;
    }
    Ok(rule)
}

/// Returns the wire name, or `None` for a skipped field
fn parse_field_attributes(field: &syn::Field, ident: &syn::Ident) -> syn::Result<Option<LitStr>> {
    let mut name = LitStr::new(&ident.to_string(), ident.span());
    let mut skip = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("tag") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                name = meta.value()?.parse()?;
                return Ok(());
            }
            Err(meta.error("Unknown tag attribute key. Supported: rename, skip"))
        })?;
    }
    Ok((!skip).then_some(name))
}

fn collect_members(input: &DeriveInput) -> syn::Result<Vec<Member>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "TagMapped aggregates need named fields; \
                     use #[tag(self_describing)] or #[tag(registered)]",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "TagMapped aggregates must be structs; \
                 use #[tag(self_describing)] or #[tag(registered)]",
            ))
        }
    };

    let mut seen = HashSet::new();
    let mut members = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let Some(name) = parse_field_attributes(field, &ident)? else {
            continue;
        };
        if !seen.insert(name.value()) {
            return Err(syn::Error::new(name.span(), "Duplicate member name"));
        }
        members.push(Member { ident, name });
    }
    Ok(members)
}

fn generate_aggregate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let members = collect_members(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let names: Vec<&LitStr> = members.iter().map(|m| &m.name).collect();
    let idents: Vec<&syn::Ident> = members.iter().map(|m| &m.ident).collect();

    // Structs without members would leave the parameters unused
    let (silence_write, silence_read) = if members.is_empty() {
        (quote!(let _ = (out, ctx);), quote!(let _ = (value, ctx);))
    } else {
        (TokenStream2::new(), TokenStream2::new())
    };

    Ok(quote! {
        impl #impl_generics ::hyper_tag::mapping::TagAggregate for #name #ty_generics #where_clause {
            const MEMBER_NAMES: &'static [&'static str] = &[#(#names),*];

            fn write_members(
                &self,
                out: &mut ::hyper_tag::Tag,
                ctx: &::hyper_tag::mapping::MappingContext<'_>,
            ) -> ::hyper_tag::Result<()> {
                #silence_write
                #( out.push(ctx.member_to_tag(#names, &self.#idents)?); )*
                Ok(())
            }

            fn read_member(
                &mut self,
                name: &str,
                value: &::hyper_tag::Tag,
                ctx: &::hyper_tag::mapping::MappingContext<'_>,
            ) -> ::hyper_tag::Result<bool> {
                let known = match name {
                    #( #names => {
                        self.#idents = ctx.value_from_tag(value)?;
                        true
                    } )*
                    _ => false,
                };
                #silence_read
                Ok(known)
            }
        }
    })
}
