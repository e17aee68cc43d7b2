//! # Testing
//!
//! Harness for integration tests that share one expensive application context.
//!
//! A [`ContextRoot`] describes how to boot the context. [`ContextCache`] boots each
//! root once per test process, remembers failures, and hands every suite the same
//! `Arc`. Suites are declared either with the builder:
//!
//! ```rust,ignore
//! IntegrationTest::suite("health")
//!     .case("responds", |app| async move { /* ... */ Ok(()) })
//!     .assert_passed();
//! ```
//!
//! or by annotating a module, which generates one `#[test]` named after it:
//!
//! ```rust,ignore
//! #[integration_suite(IntegrationTest)]
//! mod health {
//!     use super::*;
//!
//!     async fn responds(app: &App) -> anyhow::Result<()> { Ok(()) }
//!
//!     #[ignore]
//!     async fn slow_path(app: &App) -> anyhow::Result<()> { Ok(()) }
//! }
//! ```

mod cache;
mod error;
mod root;
mod suite;

pub use anyhow;
pub use cache::{ContextCache, RootStats};
pub use error::{ContextBootstrapError, ContextBootstrapErrorExt};
pub use myproduct_derive::integration_suite;
pub use root::ContextRoot;
pub use suite::{
    CaseOutcome, CaseStatus, ContextSuite, FullContext, Suite, SuiteReport, with_full_context,
};
