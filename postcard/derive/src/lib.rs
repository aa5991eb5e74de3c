/*!
`#[derive(ToPostcard, FromPostcard)]` for `hardy-postcard`.

Structs (named, tuple and unit) encode their fields in declaration order with
no names or tags. Enums encode the variant's declaration index as a u32
varint, followed by the variant's fields.

Fields marked `#[postcard(skip)]` are left off the wire and decode to
`Default::default()`:

```ignore
#[derive(ToPostcard, FromPostcard)]
struct Session {
    id: u64,
    #[postcard(skip)]
    cache: Vec<u8>,
}
```
*/

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Attribute, Data, DataEnum, DataStruct, DeriveInput, Field, Fields, Ident, Index, Type,
    parse_macro_input, parse_quote,
};

/// `#[postcard(...)]` is only meaningful on fields.
fn reject_attrs(attrs: &[Attribute]) -> syn::Result<()> {
    match attrs.iter().find(|a| a.path().is_ident("postcard")) {
        Some(attr) => Err(syn::Error::new_spanned(
            attr,
            "postcard attributes are only supported on fields",
        )),
        None => Ok(()),
    }
}

/// Checks the container and variant attributes of `input`.
fn check_attrs(input: &DeriveInput) -> syn::Result<()> {
    reject_attrs(&input.attrs)?;
    if let Data::Enum(data) = &input.data {
        for variant in &data.variants {
            reject_attrs(&variant.attrs)?;
        }
    }
    Ok(())
}

/// The types of every skipped field, which decode through `Default`.
fn skipped_types(input: &DeriveInput) -> syn::Result<Vec<Type>> {
    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => data.fields.iter().collect(),
        Data::Enum(data) => data.variants.iter().flat_map(|v| &v.fields).collect(),
        Data::Union(_) => Vec::new(),
    };
    let mut types = Vec::new();
    for f in fields {
        if should_skip(f)? {
            types.push(f.ty.clone());
        }
    }
    Ok(types)
}

fn should_skip(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("postcard")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown postcard attribute"))
            }
        })?;
    }
    Ok(skip)
}

/// Each field's binding name, and whether it is skipped.
fn field_bindings(fields: &Fields) -> syn::Result<Vec<(Ident, bool)>> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| -> syn::Result<_> {
            let binding = Ident::new(&format!("__field_{i}"), Span::call_site());
            Ok((binding, should_skip(f)?))
        })
        .collect()
}

/// Adds `bound` to every generic type parameter.
fn bounded_generics(input: &DeriveInput, bound: syn::Path) -> syn::Generics {
    let mut generics = input.generics.clone();
    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for ident in params {
        where_clause.predicates.push(parse_quote!(#ident: #bound));
    }
    generics
}

#[proc_macro_derive(ToPostcard, attributes(postcard))]
pub fn derive_to_postcard(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_to_postcard(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_to_postcard(input: &DeriveInput) -> syn::Result<TokenStream2> {
    check_attrs(input)?;
    let body = match &input.data {
        Data::Struct(data) => to_postcard_struct(data)?,
        Data::Enum(data) => to_postcard_enum(data)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "ToPostcard cannot be derived for unions",
            ));
        }
    };

    let name = &input.ident;
    let generics = bounded_generics(input, parse_quote!(::hardy_postcard::encode::ToPostcard));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::hardy_postcard::encode::ToPostcard for #name #ty_generics #where_clause {
            fn to_postcard<__O: ::hardy_postcard::encode::Output>(
                &self,
                __encoder: &mut ::hardy_postcard::encode::Encoder<__O>,
            ) -> ::core::result::Result<(), ::hardy_postcard::Error> {
                #body
            }
        }
    })
}

fn emit_fields<'a>(bindings: impl Iterator<Item = &'a (Ident, bool)>) -> TokenStream2 {
    let emits = bindings.filter(|(_, skip)| !skip).map(|(binding, _)| {
        quote! { ::hardy_postcard::encode::ToPostcard::to_postcard(#binding, __encoder)?; }
    });
    quote! { #(#emits)* }
}

/// The destructuring pattern for `fields`, binding each to its name from
/// `bindings`.
fn fields_pattern(fields: &Fields, bindings: &[(Ident, bool)]) -> TokenStream2 {
    match fields {
        Fields::Named(named) => {
            let pats = named.named.iter().zip(bindings).map(|(f, (binding, skip))| {
                let ident = &f.ident;
                if *skip {
                    quote! { #ident: _ }
                } else {
                    quote! { #ident: #binding }
                }
            });
            quote! { { #(#pats),* } }
        }
        Fields::Unnamed(_) => {
            let pats = bindings.iter().map(|(binding, skip)| {
                if *skip {
                    quote! { _ }
                } else {
                    quote! { #binding }
                }
            });
            quote! { ( #(#pats),* ) }
        }
        Fields::Unit => quote! {},
    }
}

fn to_postcard_struct(data: &DataStruct) -> syn::Result<TokenStream2> {
    let bindings = field_bindings(&data.fields)?;
    let emits = match &data.fields {
        Fields::Named(named) => {
            let emits = named
                .named
                .iter()
                .zip(&bindings)
                .filter(|(_, (_, skip))| !skip)
                .map(|(f, _)| {
                    let ident = &f.ident;
                    quote! { ::hardy_postcard::encode::ToPostcard::to_postcard(&self.#ident, __encoder)?; }
                });
            quote! { #(#emits)* }
        }
        Fields::Unnamed(_) => {
            let emits = bindings
                .iter()
                .enumerate()
                .filter(|(_, (_, skip))| !skip)
                .map(|(i, _)| {
                    let index = Index::from(i);
                    quote! { ::hardy_postcard::encode::ToPostcard::to_postcard(&self.#index, __encoder)?; }
                });
            quote! { #(#emits)* }
        }
        Fields::Unit => quote! {},
    };
    Ok(quote! {
        #emits
        ::core::result::Result::Ok(())
    })
}

fn to_postcard_enum(data: &DataEnum) -> syn::Result<TokenStream2> {
    let mut arms = Vec::new();
    for (idx, variant) in data.variants.iter().enumerate() {
        let idx = idx as u32;
        let ident = &variant.ident;
        let bindings = field_bindings(&variant.fields)?;
        let pattern = fields_pattern(&variant.fields, &bindings);
        let emits = emit_fields(bindings.iter());
        arms.push(quote! {
            Self::#ident #pattern => {
                __encoder.emit_variant(#idx)?;
                #emits
            }
        });
    }

    if arms.is_empty() {
        // No values exist to encode
        return Ok(quote! { match *self {} });
    }
    Ok(quote! {
        match self {
            #(#arms)*
        }
        ::core::result::Result::Ok(())
    })
}

#[proc_macro_derive(FromPostcard, attributes(postcard))]
pub fn derive_from_postcard(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_from_postcard(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_from_postcard(input: &DeriveInput) -> syn::Result<TokenStream2> {
    check_attrs(input)?;
    let body = match &input.data {
        Data::Struct(data) => {
            let fields = parse_fields(&data.fields)?;
            quote! { ::core::result::Result::Ok(Self #fields) }
        }
        Data::Enum(data) => from_postcard_enum(data)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "FromPostcard cannot be derived for unions",
            ));
        }
    };

    let name = &input.ident;
    let generics = from_postcard_generics(input)?;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::hardy_postcard::decode::FromPostcard for #name #ty_generics #where_clause {
            fn from_postcard(
                __decoder: &mut ::hardy_postcard::decode::Decoder<'_>,
            ) -> ::core::result::Result<Self, ::hardy_postcard::Error> {
                #body
            }
        }
    })
}

/// `FromPostcard` bounds on the type parameters, plus `Default` on the type
/// of every skipped field.
fn from_postcard_generics(input: &DeriveInput) -> syn::Result<syn::Generics> {
    let mut generics =
        bounded_generics(input, parse_quote!(::hardy_postcard::decode::FromPostcard));
    if input.generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for ty in skipped_types(input)? {
            where_clause
                .predicates
                .push(parse_quote!(#ty: ::core::default::Default));
        }
    }
    Ok(generics)
}

/// The constructor arguments for `fields`, decoded in declaration order.
fn parse_fields(fields: &Fields) -> syn::Result<TokenStream2> {
    let values = fields
        .iter()
        .map(|f| -> syn::Result<_> {
            let ty = &f.ty;
            let value = if should_skip(f)? {
                quote! { <#ty as ::core::default::Default>::default() }
            } else {
                quote! { <#ty as ::hardy_postcard::decode::FromPostcard>::from_postcard(__decoder)? }
            };
            Ok(match &f.ident {
                Some(ident) => quote! { #ident: #value },
                None => value,
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(match fields {
        Fields::Named(_) => quote! { { #(#values),* } },
        Fields::Unnamed(_) => quote! { ( #(#values),* ) },
        Fields::Unit => quote! {},
    })
}

fn from_postcard_enum(data: &DataEnum) -> syn::Result<TokenStream2> {
    let mut arms = Vec::new();
    for (idx, variant) in data.variants.iter().enumerate() {
        let idx = idx as u32;
        let ident = &variant.ident;
        let fields = parse_fields(&variant.fields)?;
        arms.push(quote! {
            #idx => ::core::result::Result::Ok(Self::#ident #fields),
        });
    }

    Ok(quote! {
        match __decoder.parse_variant()? {
            #(#arms)*
            d => ::core::result::Result::Err(::hardy_postcard::Error::BadEnum(d)),
        }
    })
}
