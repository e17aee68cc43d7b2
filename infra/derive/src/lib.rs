#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the workspace infrastructure:
//!
//! * [`app_error`] turns an enum into a `thiserror` error with `.context(...)` support.
//! * [`main`] boots an async `main` on a runtime profile from `myproduct-runtime`.
//! * [`integration_suite`] turns a test module into one suite running against a shared
//!   application context from `myproduct-testing`.
//!
//! Consumers normally reach these through the crates that re-export them
//! (`myproduct_runtime::main`, `myproduct_testing::integration_suite`).

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemMod, parse_macro_input};

/// Attribute macro to bootstrap the Tokio runtime for an `async fn main`.
///
/// # Arguments
///
/// * `high_performance` - Server profile: larger stacks, long keep-alive.
/// * `memory_efficient` - Low-footprint profile for tools and edge deployments.
/// * `default` (or no argument) - Worker threads detected from available parallelism.
///
/// The function must be `async` and return a `Result`.
///
/// ```rust,ignore
/// #[myproduct_runtime::main(high_performance)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for defining domain-specific error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, SourceError>` of every variant with a source field.
/// * `From<SourceError>` for variants with a `source` (or `#[source]`/`#[from]`) field.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A private `format_context` helper for use in `#[error(...)]` strings.
///
/// # Requirements
///
/// * Applied to an **enum** with named-field variants only.
/// * Variants with a source must carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use myproduct_derive::app_error;
/// use std::borrow::Cow;
///
/// #[app_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, StoreError> {
///     std::fs::read_to_string(path).context("Reading store snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn app_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares an inline module as an integration suite bound to a context marker.
///
/// Every `async fn` inside the module is a case taking `&Context` and returning
/// `Result<(), E>` with `E: Into<anyhow::Error>`. Cases run in declaration order
/// against one shared context; `#[ignore]` on a case records it as skipped.
/// The macro emits a single `#[test]` named after the module.
///
/// ```rust,ignore
/// use myproduct_testing::integration_suite;
///
/// #[integration_suite(IntegrationTest)]
/// mod health {
///     use super::*;
///
///     async fn reports_up(server: &Server) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn integration_suite(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemMod);
    macros::suite::expand_suite(args.into(), input).into()
}
