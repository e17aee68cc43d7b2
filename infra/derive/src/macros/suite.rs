use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Error, FnArg, Item, ItemFn, ItemMod, LitStr, Type, Visibility};

struct Case {
    ident: syn::Ident,
    ignored: bool,
}

/// Expands `#[integration_suite(Marker)]` on an inline module.
///
/// Every `async fn` in the module becomes a case of one suite named after the module.
/// A single `#[test]` is emitted next to the module so the whole suite succeeds or
/// fails together, and a bootstrap failure runs none of the cases.
pub fn expand_suite(args: TokenStream, module: ItemMod) -> TokenStream {
    expand(args, module).unwrap_or_else(Error::into_compile_error)
}

fn expand(args: TokenStream, mut module: ItemMod) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Err(Error::new_spanned(
            &module.ident,
            "expected a marker type, e.g. #[integration_suite(IntegrationTest)]",
        ));
    }
    let marker: Type = syn::parse2(args)?;

    let Some((_, items)) = module.content.as_mut() else {
        return Err(Error::new_spanned(
            &module.ident,
            "#[integration_suite] requires an inline module body",
        ));
    };

    let mut cases = Vec::new();
    for item in items.iter_mut() {
        if let Item::Fn(func) = item
            && func.sig.asyncness.is_some()
        {
            cases.push(prepare_case(func)?);
        }
    }
    if cases.is_empty() {
        return Err(Error::new_spanned(&module.ident, "integration suite declares no async cases"));
    }

    let mod_ident = &module.ident;
    let suite_name = LitStr::new(&mod_ident.to_string(), mod_ident.span());
    let registrations = cases.iter().map(|case| {
        let ident = &case.ident;
        let name = LitStr::new(&ident.to_string(), ident.span());
        let method = if case.ignored { format_ident!("ignore") } else { format_ident!("case") };
        quote! {
            .#method(#name, |ctx| async move {
                #mod_ident::#ident(&ctx).await.map_err(::myproduct_testing::anyhow::Error::from)
            })
        }
    });

    Ok(quote! {
        #module

        #[test]
        fn #mod_ident() {
            <#marker>::suite(#suite_name)
                #(#registrations)*
                .assert_passed();
        }
    })
}

fn prepare_case(func: &mut ItemFn) -> syn::Result<Case> {
    let inputs = &func.sig.inputs;
    if inputs.len() != 1 || matches!(inputs.first(), Some(FnArg::Receiver(_))) {
        return Err(Error::new_spanned(
            &func.sig,
            "suite cases take exactly one argument: the shared context reference",
        ));
    }

    let before = func.attrs.len();
    func.attrs.retain(|attr| !attr.path().is_ident("ignore"));
    let ignored = func.attrs.len() != before;

    // The generated test lives in the parent module and calls into this one.
    if matches!(func.vis, Visibility::Inherited) {
        func.vis = syn::parse_quote!(pub(super));
    }

    Ok(Case { ident: func.sig.ident.clone(), ignored })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand_err(args: TokenStream, module: ItemMod) -> String {
        expand(args, module).expect_err("expansion must fail").to_string()
    }

    #[test]
    fn missing_marker_is_rejected() {
        let module: ItemMod = parse_quote! { mod cases { async fn a(_c: &()) {} } };
        assert!(expand_err(TokenStream::new(), module).contains("expected a marker type"));
    }

    #[test]
    fn out_of_line_module_is_rejected() {
        let module: ItemMod = parse_quote! { mod cases; };
        assert!(expand_err(quote!(Marker), module).contains("requires an inline module body"));
    }

    #[test]
    fn module_without_async_fns_is_rejected() {
        let module: ItemMod = parse_quote! { mod cases { fn helper() {} } };
        assert!(expand_err(quote!(Marker), module).contains("declares no async cases"));
    }

    #[test]
    fn case_arity_and_receivers_are_rejected() {
        let none: ItemMod = parse_quote! { mod cases { async fn a() {} } };
        let two: ItemMod = parse_quote! { mod cases { async fn a(_x: &(), _y: &()) {} } };
        let receiver: ItemMod = parse_quote! { mod cases { async fn a(&self) {} } };

        for module in [none, two, receiver] {
            assert!(expand_err(quote!(Marker), module).contains("exactly one argument"));
        }
    }

    #[test]
    fn cases_become_one_test_with_ignored_cases_skipped() {
        let module: ItemMod = parse_quote! {
            mod health {
                async fn up(_c: &Ctx) -> Result<(), E> { Ok(()) }
                #[ignore]
                async fn slow(_c: &Ctx) -> Result<(), E> { Ok(()) }
                fn helper() {}
            }
        };

        let expanded = expand(quote!(IntegrationTest), module).expect("expands").to_string();
        assert!(expanded.contains("fn health ()"), "{expanded}");
        assert!(expanded.contains(". case (\"up\""), "{expanded}");
        assert!(expanded.contains(". ignore (\"slow\""), "{expanded}");
        assert!(expanded.contains("pub (super) async fn up"), "{expanded}");
        assert!(!expanded.contains("# [ignore]"), "{expanded}");
        assert!(expanded.contains(". assert_passed ()"), "{expanded}");
    }
}
