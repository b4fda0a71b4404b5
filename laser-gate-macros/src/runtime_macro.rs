use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Nothing;
use syn::{Ident, ItemFn};

use crate::helpers::{laser_gate_crate_path, tokio_crate_literal};

pub enum TokioMode {
    Main,
    Test,
}

/// Internal redefinition of `#[laser_gate::runtime]`.
///
/// This method uses proc_macro2 to allow runtime macro expansion. This is done only for testing coverage
/// purpose through the runtime-macros crate.
/// @see runtime-macros https://docs.rs/runtime-macros/latest/runtime_macros
#[cfg(test)]
pub fn runtime_macro_internal(args: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(args, item, TokioMode::Main)
}

/// Internal redefinition of `#[laser_gate_macros::test]`.
#[cfg(test)]
pub fn test_macro_internal(args: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(args, item, TokioMode::Test)
}

/// See `#[laser_gate::runtime]` for details.
pub fn runtime_macro(args: TokenStream, item: TokenStream, mode: TokioMode) -> TokenStream {
    match expand(args, item, mode) {
        Ok(expanded) => expanded,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(args: TokenStream, item: TokenStream, mode: TokioMode) -> syn::Result<TokenStream> {
    let laser_gate = laser_gate_crate_path();
    let tokio_crate = tokio_crate_literal();

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = syn::parse2::<ItemFn>(item)?;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            sig.fn_token,
            "the `async` keyword is missing from the function declaration",
        ));
    }

    // Define the #[tokio::main] / #[tokio::test] tokio macro attribute.
    // Always on the current thread: the poll loop is the only running task.
    let tokio_attr = match mode {
        TokioMode::Main => {
            syn::parse2::<Nothing>(args)?;
            quote! {
                #[#laser_gate::utils::tokio::main(flavor = "current_thread", crate = #tokio_crate)]
            }
        }
        TokioMode::Test => match syn::parse2::<Option<Ident>>(args)? {
            None => quote! {
                #[#laser_gate::utils::tokio::test(flavor = "current_thread", crate = #tokio_crate)]
                #[::serial_test::serial]
            },
            Some(ident) if ident == "paused" => quote! {
                #[#laser_gate::utils::tokio::test(flavor = "current_thread", start_paused = true, crate = #tokio_crate)]
                #[::serial_test::serial]
            },
            Some(ident) => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "unknown option: only `paused` is supported",
                ))
            }
        },
    };

    Ok(quote! {
        #tokio_attr
        #(#attrs)*
        #vis #sig
        #block
    })
}
