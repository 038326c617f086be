//! Lazy recalculation.
//!
//! Inputs bump a version counter; a solve records the version it ran
//! against. Queries compare the two and only solve when they differ, so
//! quote updates never wait on a running solve and a solve never publishes
//! results for inputs that changed underneath it.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::error::{CurveError, CurveResult};
use crate::observer::{Observable, Observer};

#[derive(Debug, Default)]
struct SolveState {
    /// Error of the last failed solve and the input version it ran against.
    last_failure: Option<(u64, CurveError)>,
}

/// Dirty tracking around a solve.
///
/// `Clean -> Dirty` on any input change, `Dirty -> Clean` after a successful
/// solve. A failed solve stays dirty and its error is returned to every
/// caller until an input changes again.
///
/// Registered with helpers as an [`Observer`]; forwards notifications to its
/// own observers.
pub struct LazyController {
    /// Bumped on every input change.
    version: AtomicU64,
    /// Version of the last successful solve.
    clean_version: AtomicU64,
    /// Held for the whole dirty-check-and-solve sequence.
    state: Mutex<SolveState>,
    frozen: AtomicBool,
    /// An update arrived while frozen.
    pending: AtomicBool,
    solves: AtomicU64,
    observers: Observable,
}

impl LazyController {
    /// Creates a dirty controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: AtomicU64::new(1),
            clean_version: AtomicU64::new(0),
            state: Mutex::new(SolveState::default()),
            frozen: AtomicBool::new(false),
            pending: AtomicBool::new(false),
            solves: AtomicU64::new(0),
            observers: Observable::new(),
        }
    }

    /// Runs `solve` if inputs changed since the last successful solve.
    ///
    /// At most one solve runs at a time; concurrent callers wait for it and
    /// then see its outcome. `solve` must not call back into this controller.
    ///
    /// # Errors
    ///
    /// Returns the solve's error, or the memoized error of an earlier failed
    /// solve if no input has changed since.
    pub fn ensure_up_to_date<F>(&self, solve: F) -> CurveResult<()>
    where
        F: FnOnce() -> CurveResult<()>,
    {
        if self.is_up_to_date() {
            return Ok(());
        }

        let mut state = self.state.lock();
        let version = self.version.load(Ordering::Acquire);
        if self.clean_version.load(Ordering::Acquire) == version {
            return Ok(());
        }
        if let Some((failed_version, error)) = &state.last_failure {
            if *failed_version == version {
                tracing::trace!(version, "returning memoized bootstrap failure");
                return Err(error.clone());
            }
        }

        tracing::trace!(version, "recalculating");
        self.solves.fetch_add(1, Ordering::Relaxed);
        match solve() {
            Ok(()) => {
                state.last_failure = None;
                self.clean_version.store(version, Ordering::Release);
                Ok(())
            }
            Err(error) => {
                state.last_failure = Some((version, error.clone()));
                Err(error)
            }
        }
    }

    /// Forces a solve even if nothing changed.
    pub fn recalculate<F>(&self, solve: F) -> CurveResult<()>
    where
        F: FnOnce() -> CurveResult<()>,
    {
        self.version.fetch_add(1, Ordering::AcqRel);
        self.ensure_up_to_date(solve)
    }

    /// Marks the inputs changed and notifies observers.
    ///
    /// Used for structural changes made through the curve itself, so it
    /// applies even while frozen.
    pub fn mark_dirty(&self) {
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(version, "marked dirty");
        self.observers.notify_observers();
    }

    /// Returns true if the last successful solve used the current inputs.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.clean_version.load(Ordering::Acquire) == self.version.load(Ordering::Acquire)
    }

    /// Error of a failed solve against the current inputs, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<CurveError> {
        let version = self.version.load(Ordering::Acquire);
        match &self.state.lock().last_failure {
            Some((failed_version, error)) if *failed_version == version => Some(error.clone()),
            _ => None,
        }
    }

    /// Ignores quote updates until [`unfreeze`](Self::unfreeze).
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    /// Resumes tracking; marks dirty if an update arrived while frozen.
    pub fn unfreeze(&self) {
        if self.frozen.swap(false, Ordering::AcqRel) && self.pending.swap(false, Ordering::AcqRel)
        {
            self.mark_dirty();
        }
    }

    /// Returns true while frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Number of solves attempted.
    #[must_use]
    pub fn solves(&self) -> u64 {
        self.solves.load(Ordering::Relaxed)
    }

    /// Notifies downstream observers without marking the inputs changed.
    ///
    /// For inputs applied at query time: results change, the solve does not.
    pub fn notify_observers(&self) {
        tracing::trace!("forwarding notification");
        self.observers.notify_observers();
    }

    /// Subscribes a downstream observer.
    pub fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observers.register(observer);
    }

    /// Cancels a downstream subscription.
    pub fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observers.unregister(observer);
    }
}

impl Default for LazyController {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for LazyController {
    fn update(&self) {
        if self.is_frozen() {
            self.pending.store(true, Ordering::Release);
            return;
        }
        self.mark_dirty();
    }
}

/// Relays notifications to a controller's downstream observers without
/// dirtying it.
pub(crate) struct Relay {
    controller: Weak<LazyController>,
}

impl Relay {
    pub(crate) fn new(controller: &Arc<LazyController>) -> Arc<dyn Observer> {
        Arc::new(Self {
            controller: Arc::downgrade(controller),
        })
    }
}

impl Observer for Relay {
    fn update(&self) {
        if let Some(controller) = self.controller.upgrade() {
            controller.notify_observers();
        }
    }
}

impl fmt::Debug for LazyController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyController")
            .field("version", &self.version.load(Ordering::Relaxed))
            .field("clean_version", &self.clean_version.load(Ordering::Relaxed))
            .field("frozen", &self.is_frozen())
            .field("solves", &self.solves())
            .finish_non_exhaustive()
    }
}
