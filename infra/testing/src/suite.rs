use crate::cache::ContextCache;
use crate::error::ContextBootstrapError;
use crate::root::ContextRoot;
use myproduct_runtime::get_global_runtime;
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

type CaseFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type CaseFn<C> = Box<dyn Fn(Arc<C>) -> CaseFuture + Send + Sync>;

struct Case<C> {
    name: Cow<'static, str>,
    run: Option<CaseFn<C>>,
}

/// A named, ordered group of cases sharing one context of type `C`.
pub struct Suite<C> {
    name: Cow<'static, str>,
    cases: Vec<Case<C>>,
}

impl<C> fmt::Debug for Suite<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("cases", &self.cases.iter().map(|c| &c.name).collect::<Vec<_>>())
            .finish()
    }
}

impl<C: Send + Sync + 'static> Suite<C> {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), cases: Vec::new() }
    }

    #[must_use]
    pub fn case<F, Fut>(mut self, name: impl Into<Cow<'static, str>>, case: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let run: CaseFn<C> = Box::new(move |ctx| Box::pin(case(ctx)));
        self.cases.push(Case { name: name.into(), run: Some(run) });
        self
    }

    /// Registers a case that is reported as ignored and never executed.
    #[must_use]
    pub fn ignore<F, Fut>(mut self, name: impl Into<Cow<'static, str>>, _case: F) -> Self
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.cases.push(Case { name: name.into(), run: None });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    Failed(String),
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    pub name: Cow<'static, str>,
    pub status: CaseStatus,
}

/// Per-case results of one suite run.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite: Cow<'static, str>,
    pub root: &'static str,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    fn count(&self, pred: impl Fn(&CaseStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Passed))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Failed(_)))
    }

    #[must_use]
    pub fn ignored(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Ignored))
    }

    /// Cases that actually ran.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.passed() + self.failed()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&CaseStatus> {
        self.outcomes.iter().find(|o| o.name == name).map(|o| &o.status)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "suite '{}' on '{}': {} passed, {} failed, {} ignored",
            self.suite,
            self.root,
            self.passed(),
            self.failed(),
            self.ignored()
        )?;
        for outcome in &self.outcomes {
            match &outcome.status {
                CaseStatus::Passed => writeln!(f, "  ok      {}", outcome.name)?,
                CaseStatus::Ignored => writeln!(f, "  ignored {}", outcome.name)?,
                CaseStatus::Failed(reason) => writeln!(f, "  FAILED  {}: {reason}", outcome.name)?,
            }
        }
        Ok(())
    }
}

/// A suite bound to the full context of root `R`.
#[must_use = "call .run() or .assert_passed() to execute the suite"]
pub struct ContextSuite<R: ContextRoot> {
    suite: Suite<R::Context>,
}

impl<R: ContextRoot> fmt::Debug for ContextSuite<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSuite").field("root", &R::NAME).field("suite", &self.suite).finish()
    }
}

/// Pins `suite` to the context booted by `R`.
pub fn with_full_context<R: ContextRoot>(suite: Suite<R::Context>) -> ContextSuite<R> {
    ContextSuite { suite }
}

impl<R: ContextRoot> ContextSuite<R> {
    pub fn case<F, Fut>(self, name: impl Into<Cow<'static, str>>, case: F) -> Self
    where
        F: Fn(Arc<R::Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self { suite: self.suite.case(name, case) }
    }

    pub fn ignore<F, Fut>(self, name: impl Into<Cow<'static, str>>, case: F) -> Self
    where
        F: Fn(Arc<R::Context>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self { suite: self.suite.ignore(name, case) }
    }

    /// Boots or reuses the context of `R`, then runs the cases in order.
    ///
    /// Blocks the calling thread; call it from a plain `#[test]`.
    ///
    /// # Errors
    /// Returns [`ContextBootstrapError`] when the context is unavailable. No case runs then.
    pub fn run(self) -> Result<SuiteReport, ContextBootstrapError> {
        let Suite { name, cases } = self.suite;
        let ctx = ContextCache::global().context::<R>()?;

        let rt = get_global_runtime();
        let outcomes = rt.block_on(async {
            let mut outcomes = Vec::with_capacity(cases.len());
            for case in cases {
                let Some(run) = case.run else {
                    outcomes.push(CaseOutcome { name: case.name, status: CaseStatus::Ignored });
                    continue;
                };

                let status = match tokio::spawn(run(Arc::clone(&ctx))).await {
                    Ok(Ok(())) => CaseStatus::Passed,
                    Ok(Err(err)) => CaseStatus::Failed(format!("{err:#}")),
                    Err(join) if join.is_panic() => {
                        CaseStatus::Failed(format!("panicked: {}", panic_message(join.into_panic())))
                    },
                    Err(join) => CaseStatus::Failed(join.to_string()),
                };
                if let CaseStatus::Failed(reason) = &status {
                    warn!(suite = %name, case = %case.name, %reason, "Case failed");
                }
                outcomes.push(CaseOutcome { name: case.name, status });
            }
            outcomes
        });

        let report = SuiteReport { suite: name, root: R::NAME, outcomes };
        info!(
            suite = %report.suite,
            root = R::NAME,
            passed = report.passed(),
            failed = report.failed(),
            ignored = report.ignored(),
            "Suite finished"
        );
        Ok(report)
    }

    /// Runs the suite and panics with the report unless every executed case passed.
    ///
    /// # Panics
    /// On bootstrap failure or any failed case.
    pub fn assert_passed(self) {
        let name = self.suite.name.clone();
        match self.run() {
            Ok(report) if report.is_success() => {},
            Ok(report) => panic!("{report}"),
            Err(err) => panic!("suite '{name}' did not run: {err}"),
        }
    }
}

/// Marker for suites that need the fully booted context of root `R`.
///
/// Composes suite declaration ([`FullContext::suite`]) with context boot
/// ([`FullContext::context`]). Declare one alias per root and use it everywhere:
/// `pub type IntegrationTest = FullContext<ServerApp>;`.
pub struct FullContext<R>(PhantomData<fn() -> R>);

impl<R: ContextRoot> fmt::Debug for FullContext<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FullContext").field(&R::NAME).finish()
    }
}

impl<R: ContextRoot> FullContext<R> {
    pub fn suite(name: impl Into<Cow<'static, str>>) -> ContextSuite<R> {
        with_full_context::<R>(Suite::new(name))
    }

    /// # Errors
    /// See [`ContextCache::context`].
    pub fn context() -> Result<Arc<R::Context>, ContextBootstrapError> {
        ContextCache::global().context::<R>()
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
