use std::borrow::Cow;

#[myproduct_derive::app_error]
pub enum ContextBootstrapError {
    /// The root's `boot()` returned an error or panicked on this attempt.
    #[error("Context root '{root}' failed to boot{}: {message}", format_context(.context))]
    Bootstrap { root: &'static str, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An earlier suite already saw this root fail; it is not booted again.
    #[error(
        "Context root '{root}' failed to boot in an earlier suite{}: {message}",
        format_context(.context)
    )]
    PreviouslyFailed {
        root: &'static str,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}
