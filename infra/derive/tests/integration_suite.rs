#[test]
fn integration_suite_ui() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/integration_suite_missing_marker.rs");
    t.compile_fail("tests/ui/integration_suite_no_cases.rs");
    t.compile_fail("tests/ui/integration_suite_case_arity.rs");
}
