//! Change notification between quotes, helpers and curves.
//!
//! Observables hold weak references only: an observer going away never
//! keeps a quote alive and vice versa. Dead entries are pruned on the next
//! notification.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Receives change notifications.
pub trait Observer: Send + Sync {
    /// Called after an observed input changed.
    fn update(&self);
}

/// Registry of observers to notify on change.
#[derive(Default)]
pub struct Observable {
    observers: Mutex<Vec<Weak<dyn Observer>>>,
}

impl Observable {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer. Registering the same observer twice is a no-op.
    pub fn register(&self, observer: Weak<dyn Observer>) {
        let mut observers = self.observers.lock();
        if !observers.iter().any(|o| same_observer(o, &observer)) {
            observers.push(observer);
        }
    }

    /// Removes an observer if present.
    pub fn unregister(&self, observer: &Weak<dyn Observer>) {
        self.observers.lock().retain(|o| !same_observer(o, observer));
    }

    /// Notifies every live observer.
    ///
    /// The registry lock is released before any `update` runs, so observers
    /// may register or unregister from inside their callback.
    pub fn notify_observers(&self) {
        let live: Vec<Arc<dyn Observer>> = {
            let mut observers = self.observers.lock();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in live {
            observer.update();
        }
    }

    /// Number of registered observers that are still alive.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("observers", &self.observer_count())
            .finish()
    }
}

fn same_observer(a: &Weak<dyn Observer>, b: &Weak<dyn Observer>) -> bool {
    std::ptr::eq(a.as_ptr().cast::<()>(), b.as_ptr().cast::<()>())
}
