use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Attribute, Error as SynError, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Pat,
    PatType, Result as SynResult, ReturnType, Signature, Type, TypeReference,
};

use crate::attrs::AttributeData;

const CONSTRUCT: &str = "construct";
const POST_INIT: &str = "post_init";
const PROVIDE_BEANS: &str = "provide_beans";
const RESOURCE: &str = "resource";

#[derive(Debug)]
struct ConstructorData {
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    fallible: bool,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    resource: LitStr,
    binding: Option<String>,
    ty: Type,
}

#[derive(Debug)]
struct HookData {
    identifier: Ident,
    takes_registry: bool,
    fallible: bool,
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        [CONSTRUCT, POST_INIT, PROVIDE_BEANS, RESOURCE]
            .iter()
            .any(|name| attr.path().is_ident(name))
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[configuration]` should be annotated on the `impl` block",
            ))
        }
    };
    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(
            path.span(),
            "`#[configuration]` should be annotated on an inherent `impl` block",
        ));
    }

    let signature = find_unique_fn(&impls.items, CONSTRUCT, impls.span())?
        .ok_or_else(|| {
            SynError::new(
                impls.span(),
                "no associated function is annotated with `#[construct]`",
            )
        })?;
    let ctor_data = parse_constructor(signature)?;

    let post_init = find_unique_fn(&impls.items, POST_INIT, impls.span())?
        .map(|sig| parse_hook(sig, POST_INIT))
        .transpose()?;
    let provide_beans = find_unique_fn(&impls.items, PROVIDE_BEANS, impls.span())?
        .map(|sig| parse_hook(sig, PROVIDE_BEANS))
        .transpose()?;

    let expanded = expand_configuration_implementation(
        &impls,
        ctor_data,
        post_init,
        provide_beans,
        attr_data,
    );

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn find_unique_fn(items: &[ImplItem], marker: &str, impl_span: Span) -> SynResult<Option<Signature>> {
    let annotated: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| item_fn.attrs.iter().any(|attr| attr.path().is_ident(marker)))
        .collect();

    if annotated.len() > 1 {
        return Err(SynError::new(
            impl_span,
            format!("only one associated function can be annotated with `#[{marker}]`"),
        ));
    }
    Ok(annotated.first().map(|item_fn| item_fn.sig.clone()))
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn parse_constructor(signature: Signature) -> SynResult<ConstructorData> {
    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.span(),
            "method is not allowed to be annotated with `#[construct]`",
        ));
    }

    let arguments = signature
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(arg) => Some(arg),
            FnArg::Receiver(_) => None,
        })
        .map(parse_constructor_argument)
        .collect::<SynResult<_>>()?;

    let fallible = match &signature.output {
        ReturnType::Default => {
            return Err(SynError::new(
                signature.span(),
                "a constructor's return type should be `Self` or `Result<Self, E>`",
            ))
        }
        ReturnType::Type(_, ty) => is_result_type(ty),
    };

    Ok(ConstructorData {
        identifier: signature.ident,
        arguments,
        fallible,
    })
}

fn parse_constructor_argument(arg: &PatType) -> SynResult<ArgumentData> {
    let binding = match arg.pat.as_ref() {
        Pat::Ident(pat) => Some(pat.ident.to_string()),
        _ => None,
    };

    let mut resource = None;
    for attr in arg.attrs.iter().filter(|attr| attr.path().is_ident(RESOURCE)) {
        if resource.is_some() {
            return Err(SynError::new(
                attr.span(),
                "only one `#[resource(...)]` is allowed per argument",
            ));
        }
        resource = Some(attr.parse_args::<LitStr>()?);
    }

    let resource = match (resource, &binding) {
        (Some(resource), _) => resource,
        (None, Some(binding)) => LitStr::new(binding.trim_start_matches("r#"), arg.pat.span()),
        (None, None) => {
            return Err(SynError::new(
                arg.span(),
                "expects `#[resource(\"...\")]` on an argument that is not a plain identifier",
            ))
        }
    };

    Ok(ArgumentData {
        span: arg.span(),
        resource,
        binding,
        ty: arg.ty.as_ref().clone(),
    })
}

fn parse_hook(signature: Signature, marker: &str) -> SynResult<HookData> {
    let mut inputs = signature.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(rec)) if rec.mutability.is_some() && rec.reference.is_some() => {}
        _ => {
            return Err(SynError::new(
                signature.span(),
                format!("`#[{marker}]` expects a method taking `&mut self`"),
            ))
        }
    }

    let takes_registry = match inputs.len() {
        0 => false,
        1 => true,
        _ => {
            return Err(SynError::new(
                signature.inputs.span(),
                format!("`#[{marker}]` accepts at most one argument besides `&mut self`"),
            ))
        }
    };

    let fallible = match &signature.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => !is_unit_type(ty),
    };

    Ok(HookData {
        identifier: signature.ident,
        takes_registry,
        fallible,
    })
}

fn is_result_type(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "Result")
}

fn is_static_reference(reference: &TypeReference) -> bool {
    reference
        .lifetime
        .as_ref()
        .is_some_and(|lifetime| lifetime.ident == "static")
}

fn is_unit_type(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

fn expand_configuration_implementation(
    impls: &ItemImpl,
    ctor_data: ConstructorData,
    post_init: Option<HookData>,
    provide_beans: Option<HookData>,
    attr_data: AttributeData,
) -> TokenStream2 {
    let self_type = &impls.self_ty;
    let (impl_generics, _, where_clause) = impls.generics.split_for_impl();
    let constructor = &ctor_data.identifier;

    let const_name = attr_data
        .name
        .as_ref()
        .map(|name| quote! { const NAME: &'static str = #name; });

    let resources = ctor_data
        .arguments
        .iter()
        .map(|arg| {
            let resource = &arg.resource;
            match &arg.binding {
                Some(binding) => {
                    quote! { beanbag::config::Resource::bound(#resource, #binding), }
                }
                None => quote! { beanbag::config::Resource::named(#resource), },
            }
        })
        .chain(
            attr_data
                .resources
                .iter()
                .map(|resource| quote! { beanbag::config::Resource::named(#resource), }),
        )
        .collect::<TokenStream2>();

    let beans = attr_data
        .beans
        .iter()
        .map(|bean| {
            let (name, kind) = (&bean.name, &bean.kind);
            quote! { beanbag::config::BeanDecl::new(#name, #kind), }
        })
        .collect::<TokenStream2>();

    let dependencies = attr_data
        .dependencies
        .iter()
        .map(|dependency| quote! { #dependency, })
        .collect::<TokenStream2>();

    let get_resource_statements = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            let resource = &arg.resource;
            match &arg.ty {
                Type::Reference(reference) if !is_static_reference(reference) => {
                    let elem = &reference.elem;
                    quote! { let #dep = registry.get_bean_ref::<#elem>(#resource)?; }
                }
                ty => quote! { let #dep = registry.get_bean::<#ty>(#resource)?; },
            }
        })
        .collect::<TokenStream2>();

    let dep_args = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let dep = Ident::new(&format!("dep{i}"), arg.span);
            quote! { #dep, }
        })
        .collect::<TokenStream2>();

    let construct_body = if ctor_data.fallible {
        quote! {
            Self::#constructor(#dep_args).map_err(|err| {
                beanbag::config::ConfigurationError::construction(
                    <Self as beanbag::config::Configuration>::NAME,
                    err,
                )
            })
        }
    } else {
        quote! { Ok(Self::#constructor(#dep_args)) }
    };

    let post_init_fn = post_init.map(|hook| {
        let call = expand_hook_call(&hook);
        quote! {
            fn post_init(
                &mut self,
                registry: &beanbag::registry::BeanRegistry,
            ) -> std::result::Result<(), beanbag::config::ConfigurationError> {
                #call
            }
        }
    });

    let provide_beans_fn = provide_beans.map(|hook| {
        let call = expand_hook_call(&hook);
        quote! {
            fn provide_beans(
                &mut self,
                registry: &mut beanbag::registry::BeanRegistry,
            ) -> std::result::Result<(), beanbag::config::ConfigurationError> {
                #call
            }
        }
    });

    quote! {
        impl #impl_generics beanbag::config::Configuration for #self_type #where_clause {
            #const_name
            const RESOURCES: &'static [beanbag::config::Resource] = &[#resources];
            const BEANS: &'static [beanbag::config::BeanDecl] = &[#beans];

            type Dependencies = (#dependencies);

            fn construct(
                registry: &beanbag::registry::BeanRegistry,
            ) -> std::result::Result<Self, beanbag::config::ConfigurationError> {
                #get_resource_statements
                #construct_body
            }

            #post_init_fn
            #provide_beans_fn
        }
    }
}

fn expand_hook_call(hook: &HookData) -> TokenStream2 {
    let identifier = &hook.identifier;
    let call = if hook.takes_registry {
        quote! { self.#identifier(registry) }
    } else {
        quote! {{
            let _ = registry;
            self.#identifier()
        }}
    };

    if hook.fallible {
        quote! { #call.map_err(std::convert::Into::into) }
    } else {
        quote! {
            #call;
            Ok(())
        }
    }
}
