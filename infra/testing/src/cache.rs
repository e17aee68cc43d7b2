use crate::error::ContextBootstrapError;
use crate::root::ContextRoot;
use fxhash::FxHashMap;
use myproduct_runtime::get_global_runtime;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, OnceLock};
use tracing::{error, info};

type SharedContext = Arc<dyn Any + Send + Sync>;

static GLOBAL: LazyLock<ContextCache> = LazyLock::new(ContextCache::default);

/// Boot counters for one root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RootStats {
    /// Boot attempts, successful or not. Never exceeds one.
    pub boots: usize,
    /// Requests served from the cached outcome.
    pub hits: usize,
}

#[derive(Default)]
struct Slot {
    outcome: OnceLock<Result<SharedContext, Arc<str>>>,
    boots: AtomicUsize,
    hits: AtomicUsize,
}

/// Process-wide cache of booted contexts, keyed by root type.
///
/// Every root is booted at most once. Callers racing on the same root block on the
/// single attempt, and a failed attempt is remembered for the rest of the process.
#[derive(Default)]
pub struct ContextCache {
    slots: Mutex<FxHashMap<TypeId, Arc<Slot>>>,
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCache").field("roots", &self.slots.lock().len()).finish()
    }
}

impl ContextCache {
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    fn slot<R: ContextRoot>(&self) -> Arc<Slot> {
        Arc::clone(self.slots.lock().entry(TypeId::of::<R>()).or_default())
    }

    /// Returns the context of `R`, booting it on the global runtime on first use.
    ///
    /// Must not be called from inside an async context.
    ///
    /// # Errors
    /// [`ContextBootstrapError::Bootstrap`] if this call booted `R` and the boot failed,
    /// [`ContextBootstrapError::PreviouslyFailed`] if an earlier call did.
    pub fn context<R: ContextRoot>(&self) -> Result<Arc<R::Context>, ContextBootstrapError> {
        let slot = self.slot::<R>();

        let mut booted_here = false;
        let outcome = slot.outcome.get_or_init(|| {
            booted_here = true;
            slot.boots.fetch_add(1, Ordering::SeqCst);
            boot::<R>()
        });
        if !booted_here {
            slot.hits.fetch_add(1, Ordering::SeqCst);
        }

        match outcome {
            Ok(shared) => Arc::clone(shared).downcast::<R::Context>().map_err(|_| {
                ContextBootstrapError::Bootstrap {
                    root: R::NAME,
                    message: "cached context has an unexpected type".into(),
                    context: None,
                }
            }),
            Err(message) if booted_here => Err(ContextBootstrapError::Bootstrap {
                root: R::NAME,
                message: message.to_string().into(),
                context: None,
            }),
            Err(message) => Err(ContextBootstrapError::PreviouslyFailed {
                root: R::NAME,
                message: message.to_string().into(),
                context: None,
            }),
        }
    }

    #[must_use]
    pub fn stats_for<R: ContextRoot>(&self) -> RootStats {
        self.slots.lock().get(&TypeId::of::<R>()).map_or_else(RootStats::default, |slot| {
            RootStats {
                boots: slot.boots.load(Ordering::SeqCst),
                hits: slot.hits.load(Ordering::SeqCst),
            }
        })
    }
}

fn boot<R: ContextRoot>() -> Result<SharedContext, Arc<str>> {
    info!(root = R::NAME, "Booting test context");

    // Spawned so a panicking boot is reported instead of unwinding through the cache.
    let rt = get_global_runtime();
    let outcome = match rt.block_on(rt.spawn(R::boot())) {
        Ok(Ok(context)) => Ok(Arc::new(context) as SharedContext),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(join) if join.is_panic() => {
            Err(format!("boot panicked: {}", crate::suite::panic_message(join.into_panic())))
        },
        Err(join) => Err(join.to_string()),
    };

    match outcome {
        Ok(context) => {
            info!(root = R::NAME, "Test context ready");
            Ok(context)
        },
        Err(message) => {
            error!(root = R::NAME, %message, "Test context failed to boot");
            Err(message.into())
        },
    }
}
