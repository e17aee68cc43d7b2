use std::future::Future;

/// One bootstrap entry point for integration tests.
///
/// A root is a type-level key: the cache boots each root at most once per test
/// process and hands every suite the same `Arc<Self::Context>`.
///
/// ```rust,no_run
/// use myproduct_testing::{ContextRoot, FullContext};
///
/// struct Database;
///
/// impl ContextRoot for Database {
///     const NAME: &'static str = "database";
///     type Context = String;
///
///     async fn boot() -> myproduct_testing::anyhow::Result<Self::Context> {
///         Ok("postgres://localhost/test".to_owned())
///     }
/// }
///
/// pub type DatabaseTest = FullContext<Database>;
/// ```
pub trait ContextRoot: 'static {
    /// Name used in logs and bootstrap errors.
    const NAME: &'static str;

    type Context: Send + Sync + 'static;

    fn boot() -> impl Future<Output = anyhow::Result<Self::Context>> + Send + 'static;
}
