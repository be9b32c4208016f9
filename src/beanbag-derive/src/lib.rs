mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Implements `beanbag::config::Configuration` for the type of an inherent
/// `impl` block.
///
/// Accepted arguments: `name = "..."`, `bean("...", kind)` where `kind` is
/// one of `singleton`, `factory`, `instance`, `smart_singleton` or
/// `smart_factory`, `resource("...")`, and `depends_on(Type, ...)`.
///
/// Inside the block, exactly one associated function is marked
/// `#[construct]`. Each of its arguments is fetched from the registry under
/// the name given by `#[resource("...")]`, or under the argument's own name.
/// Methods marked `#[post_init]` and `#[provide_beans]` become the hooks.
#[proc_macro_attribute]
pub fn configuration(attr: TokenStream, item: TokenStream) -> TokenStream {
    match configuration_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn configuration_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_implementation(item, attr_data)?;
    Ok(expanded)
}
