use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::{self, ParseNestedMeta};
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{parenthesized, Error as SynError, Ident, LitStr, Path, Result as SynResult, Token};

#[derive(Debug, Default)]
pub struct AttributeData {
    pub name: Option<LitStr>,
    pub beans: Vec<BeanData>,
    pub resources: Vec<LitStr>,
    pub dependencies: Vec<Path>,
}

#[derive(Debug)]
pub struct BeanData {
    pub name: LitStr,
    pub kind: TokenStream2,
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    let mut data = AttributeData::default();
    let parser = meta::parser(|meta| parse_attribute(&mut data, meta));
    parser.parse(attr)?;
    Ok(data)
}

fn parse_attribute(data: &mut AttributeData, meta: ParseNestedMeta) -> SynResult<()> {
    if meta.path.is_ident("name") {
        if data.name.is_some() {
            return Err(meta.error("`name` is given more than once"));
        }
        data.name = Some(meta.value()?.parse()?);
    } else if meta.path.is_ident("bean") {
        let content;
        parenthesized!(content in meta.input);
        let name: LitStr = content.parse()?;
        content.parse::<Token![,]>()?;
        let kind: Ident = content.parse()?;
        data.beans.push(BeanData {
            name,
            kind: parse_strategy_kind(&kind)?,
        });
    } else if meta.path.is_ident("resource") {
        let content;
        parenthesized!(content in meta.input);
        let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
        data.resources.extend(names);
    } else if meta.path.is_ident("depends_on") {
        let content;
        parenthesized!(content in meta.input);
        let paths = Punctuated::<Path, Token![,]>::parse_terminated(&content)?;
        data.dependencies.extend(paths);
    } else {
        return Err(meta.error(
            "expects `name = \"...\"`, `bean(\"...\", kind)`, `resource(\"...\")` or `depends_on(...)`",
        ));
    }
    Ok(())
}

fn parse_strategy_kind(kind: &Ident) -> SynResult<TokenStream2> {
    let variant = if kind == "singleton" {
        quote! { Singleton }
    } else if kind == "factory" {
        quote! { Factory }
    } else if kind == "instance" {
        quote! { Instance }
    } else if kind == "smart_singleton" {
        quote! { SmartSingleton }
    } else if kind == "smart_factory" {
        quote! { SmartFactory }
    } else {
        return Err(SynError::new(
            kind.span(),
            "expects one of `singleton`, `factory`, `instance`, `smart_singleton` or `smart_factory`",
        ));
    };
    Ok(quote! { beanbag::strategy::StrategyKind::#variant })
}
