use myproduct_derive::app_error;
use std::borrow::Cow;

#[app_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Unknown key{}: {key}", format_context(.context))]
    Unknown { key: String, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<String, DemoError> {
    std::fs::read_to_string("/definitely/missing").context("Reading fixture")
}

fn main() {
    let err = read().expect_err("missing file");
    assert!(err.to_string().contains("(Reading fixture)"));

    let err: Result<(), DemoError> =
        Err(DemoError::Unknown { key: "application.x".to_owned(), context: None });
    let err = err.context("binding").expect_err("still an error");
    assert_eq!(err.to_string(), "Unknown key (binding): application.x");

    let internal: DemoError = "boom".into();
    assert!(matches!(internal, DemoError::Internal { .. }));
}
