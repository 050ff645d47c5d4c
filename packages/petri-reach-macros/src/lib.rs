use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, GenericArgument, Ident, PathArguments, Token, Type, Visibility,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    token,
};

/// One `name: Type = default` entry of a `config!` block.
///
/// A nested config uses `name: Type (PartialType = default)`, so that the
/// TOML side can leave out the whole section or parts of it.
struct Setting {
    attrs: Vec<Attribute>,
    name: Ident,
    ty: Type,
    partial_ty: Option<Type>,
    default: Expr,
}

impl Parse for Setting {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let ty: Type = input.parse()?;

        let (partial_ty, default) = if input.peek(token::Paren) {
            let inner;
            syn::parenthesized!(inner in input);
            let partial_ty: Type = inner.parse()?;
            inner.parse::<Token![=]>()?;
            (Some(partial_ty), inner.parse()?)
        } else {
            input.parse::<Token![=]>()?;
            (None, input.parse()?)
        };

        Ok(Setting {
            attrs,
            name,
            ty,
            partial_ty,
            default,
        })
    }
}

struct ConfigBlock {
    attrs: Vec<Attribute>,
    vis: Visibility,
    name: Ident,
    settings: Punctuated<Setting, Token![,]>,
}

impl Parse for ConfigBlock {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![struct]>()?;
        let name: Ident = input.parse()?;
        let body;
        syn::braced!(body in input);
        let settings = body.parse_terminated(Setting::parse, Token![,])?;

        Ok(ConfigBlock {
            attrs,
            vis,
            name,
            settings,
        })
    }
}

/// `Option<T>` fields are already optional in the partial struct.
fn is_option(ty: &Type) -> bool {
    if let Type::Path(path) = ty
        && let Some(last) = path.path.segments.last()
        && last.ident == "Option"
        && let PathArguments::AngleBracketed(generics) = &last.arguments
    {
        return generics.args.len() == 1
            && matches!(generics.args[0], GenericArgument::Type(_));
    }
    false
}

/// Generates a configuration struct together with a `Partial*` twin that is
/// deserialized from TOML, where every setting may be omitted.
///
/// ```ignore
/// config! {
///     pub struct LoggerConfig {
///         enabled: bool = false,
///     }
/// }
/// ```
///
/// The expansion refers to `crate::config::FillDefault`, so the macro is meant
/// to be used inside the library crate that defines that trait.
#[proc_macro]
pub fn config(input: TokenStream) -> TokenStream {
    let block = parse_macro_input!(input as ConfigBlock);
    let attrs = &block.attrs;
    let vis = &block.vis;
    let name = &block.name;
    let partial_name = format_ident!("Partial{}", name);
    let settings: Vec<&Setting> = block.settings.iter().collect();

    let fields = settings.iter().map(|s| {
        let (attrs, field, ty) = (&s.attrs, &s.name, &s.ty);
        quote! {
            #( #attrs )*
            #field: #ty
        }
    });

    let partial_fields = settings.iter().map(|s| {
        let (field, ty) = (&s.name, &s.ty);
        let partial_ty = match &s.partial_ty {
            Some(partial) => quote! { #partial },
            None if is_option(ty) => quote! { #ty },
            None => quote! { Option<#ty> },
        };
        quote! {
            #[serde(default)]
            #field: #partial_ty
        }
    });

    let merged = settings.iter().map(|s| {
        let (field, default) = (&s.name, &s.default);
        quote! { #field: partial.#field.fill_default(#default) }
    });

    let defaults = settings.iter().map(|s| {
        let (field, default) = (&s.name, &s.default);
        quote! { #field: #default }
    });

    let accessors = settings.iter().map(|s| {
        let (field, ty) = (&s.name, &s.ty);
        let with = format_ident!("with_{}", field);
        let set = format_ident!("set_{}", field);
        let get = format_ident!("get_{}", field);
        quote! {
            pub fn #with(mut self, #field: #ty) -> Self {
                self.#field = #field;
                self
            }

            pub fn #set(&mut self, #field: #ty) {
                self.#field = #field;
            }

            pub fn #get(&self) -> &#ty {
                &self.#field
            }
        }
    });

    let expanded = quote! {
        #( #attrs )*
        #[derive(Debug, Clone, serde::Serialize)]
        #vis struct #name {
            #( #fields, )*
        }

        #[derive(Debug, Clone, Default, serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        #vis struct #partial_name {
            #( #partial_fields, )*
        }

        impl #name {
            pub fn from_partial(partial: #partial_name) -> Self {
                use crate::config::FillDefault;
                Self {
                    #( #merged, )*
                }
            }

            pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
                let partial: #partial_name = toml::from_str(content)?;
                Ok(Self::from_partial(partial))
            }

            pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
                use anyhow::Context;
                let path = path.as_ref();
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("invalid config file {}", path.display()))
            }

            pub fn from_optional_file<P: AsRef<std::path::Path>>(path: Option<P>) -> anyhow::Result<Self> {
                match path {
                    Some(path) => Self::from_file(path),
                    None => Ok(Self::default()),
                }
            }

            #( #accessors )*
        }

        impl Default for #name {
            fn default() -> Self {
                #name {
                    #( #defaults, )*
                }
            }
        }

        impl crate::config::FillDefault<#name> for Option<#partial_name> {
            fn fill_default(self, default: #name) -> #name {
                match self {
                    Some(partial) => #name::from_partial(partial),
                    None => default,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
