use myproduct_testing::anyhow::{Result, bail, ensure};
use myproduct_testing::{
    CaseStatus, ContextBootstrapError, ContextCache, ContextRoot, FullContext, RootStats, Suite,
    with_full_context,
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct Counter {
    visits: AtomicUsize,
}

impl Counter {
    fn visit(&self) -> usize {
        self.visits.fetch_add(1, Ordering::SeqCst) + 1
    }
}

static SHARED_BOOTS: AtomicUsize = AtomicUsize::new(0);

struct SharedRoot;

impl ContextRoot for SharedRoot {
    const NAME: &'static str = "shared";
    type Context = Counter;

    async fn boot() -> Result<Self::Context> {
        SHARED_BOOTS.fetch_add(1, Ordering::SeqCst);
        Ok(Counter::default())
    }
}

#[test]
fn context_is_booted_once_and_shared_across_suites() {
    let first = FullContext::<SharedRoot>::suite("first")
        .case("visit_one", |ctx| async move {
            ctx.visit();
            Ok(())
        })
        .case("visit_two", |ctx| async move {
            ctx.visit();
            Ok(())
        })
        .run()
        .expect("context boots");

    let second = Suite::<Counter>::new("second").case("visit_three", |ctx| async move {
        ensure!(ctx.visit() == 3, "the second suite must see the first suite's visits");
        Ok(())
    });
    let second = with_full_context::<SharedRoot>(second).run().expect("cached context");

    assert_eq!(first.passed(), 2);
    assert_eq!(second.passed(), 1);
    assert_eq!(SHARED_BOOTS.load(Ordering::SeqCst), 1);
    assert_eq!(ContextCache::global().stats_for::<SharedRoot>(), RootStats { boots: 1, hits: 1 });

    let ctx = FullContext::<SharedRoot>::context().expect("cached context");
    assert_eq!(ctx.visits.load(Ordering::SeqCst), 3);
}

static FAILING_BOOTS: AtomicUsize = AtomicUsize::new(0);
static FAILING_CASES_RUN: AtomicUsize = AtomicUsize::new(0);

struct FailingRoot;

impl ContextRoot for FailingRoot {
    const NAME: &'static str = "failing";
    type Context = ();

    async fn boot() -> Result<Self::Context> {
        FAILING_BOOTS.fetch_add(1, Ordering::SeqCst);
        bail!("settings rejected")
    }
}

fn failing_suite(name: &'static str) -> myproduct_testing::ContextSuite<FailingRoot> {
    FullContext::<FailingRoot>::suite(name).case("never_runs", |_ctx| async move {
        FAILING_CASES_RUN.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn failed_boot_runs_no_cases_and_is_remembered() {
    let err = failing_suite("first").run().expect_err("boot fails");
    assert!(matches!(err, ContextBootstrapError::Bootstrap { root: "failing", .. }));
    assert!(err.to_string().contains("settings rejected"));

    let err = failing_suite("second").run().expect_err("failure cached");
    assert!(matches!(err, ContextBootstrapError::PreviouslyFailed { root: "failing", .. }));

    assert_eq!(FAILING_CASES_RUN.load(Ordering::SeqCst), 0);
    assert_eq!(FAILING_BOOTS.load(Ordering::SeqCst), 1);
    assert_eq!(ContextCache::global().stats_for::<FailingRoot>().boots, 1);
}

struct PanickingRoot;

impl ContextRoot for PanickingRoot {
    const NAME: &'static str = "panicking";
    type Context = ();

    async fn boot() -> Result<Self::Context> {
        panic!("boot exploded")
    }
}

#[test]
fn panicking_boot_is_a_bootstrap_error() {
    let err = FullContext::<PanickingRoot>::suite("boot_panics")
        .case("never_runs", |_ctx| async move { Ok(()) })
        .run()
        .expect_err("boot panics");

    assert!(err.to_string().contains("boot exploded"));
}

struct PlainRoot;

impl ContextRoot for PlainRoot {
    const NAME: &'static str = "plain";
    type Context = Counter;

    async fn boot() -> Result<Self::Context> {
        Ok(Counter::default())
    }
}

fn reject() -> Result<()> {
    bail!("expected failure")
}

fn explode() -> Result<()> {
    panic!("case exploded")
}

#[test]
fn failures_and_panics_are_reported_per_case() {
    let report = FullContext::<PlainRoot>::suite("mixed")
        .case("fails", |_ctx| async move { reject() })
        .case("panics", |_ctx| async move { explode() })
        .case("still_runs", |ctx| async move {
            ctx.visit();
            Ok(())
        })
        .ignore("skipped", |_ctx| async move { reject() })
        .run()
        .expect("context boots");

    assert_eq!(report.passed(), 1);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.ignored(), 1);
    assert_eq!(report.executed(), 3);
    assert!(!report.is_success());
    assert_eq!(report.outcome("skipped"), Some(&CaseStatus::Ignored));
    assert!(matches!(
        report.outcome("panics"),
        Some(CaseStatus::Failed(reason)) if reason.contains("case exploded")
    ));

    let rendered = report.to_string();
    assert!(rendered.contains("suite 'mixed' on 'plain'"));
    assert!(rendered.contains("FAILED  fails: expected failure"));
}

#[test]
#[should_panic(expected = "did not run")]
fn assert_passed_panics_on_bootstrap_failure() {
    struct BrokenRoot;

    impl ContextRoot for BrokenRoot {
        const NAME: &'static str = "broken";
        type Context = ();

        async fn boot() -> Result<Self::Context> {
            bail!("no settings file")
        }
    }

    FullContext::<BrokenRoot>::suite("broken").case("noop", |_ctx| async move { Ok(()) }).assert_passed();
}
