#[test]
fn app_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/app_error_pass.rs");
    t.compile_fail("tests/ui/app_error_no_context.rs");
}
