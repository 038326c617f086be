//! Market quotes.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Weak;

use crate::observer::{Observable, Observer};

/// A market value that may change over time.
///
/// Helpers read their quote on every solve and forward observer
/// registration to it, which is how a quote change reaches the curve.
pub trait Quote: Send + Sync + fmt::Debug {
    /// Current value, or `None` if the quote is not set.
    fn value(&self) -> Option<f64>;

    /// Returns true if the quote currently has a value.
    fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// Registers an observer to be told about value changes.
    fn register_observer(&self, observer: Weak<dyn Observer>);

    /// Removes a previously registered observer.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>);
}

/// A quote whose value is set directly.
///
/// # Example
///
/// ```rust
/// use pillar_curves::quote::{Quote, SimpleQuote};
///
/// let quote = SimpleQuote::new(0.05);
/// assert_eq!(quote.value(), Some(0.05));
/// quote.set_value(0.051);
/// assert_eq!(quote.value(), Some(0.051));
/// ```
#[derive(Default)]
pub struct SimpleQuote {
    value: RwLock<Option<f64>>,
    observable: Observable,
}

impl SimpleQuote {
    /// Creates a quote holding `value`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value: RwLock::new(Some(value)),
            observable: Observable::new(),
        }
    }

    /// Creates a quote with no value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets a new value and notifies observers if it changed.
    ///
    /// Returns the previous value.
    pub fn set_value(&self, value: f64) -> Option<f64> {
        self.replace(Some(value))
    }

    /// Clears the value and notifies observers if one was set.
    pub fn reset(&self) -> Option<f64> {
        self.replace(None)
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observable.observer_count()
    }

    fn replace(&self, value: Option<f64>) -> Option<f64> {
        let previous = std::mem::replace(&mut *self.value.write(), value);
        // Bitwise comparison so NaN -> NaN counts as unchanged
        let changed = previous.map(f64::to_bits) != value.map(f64::to_bits);
        if changed {
            self.observable.notify_observers();
        }
        previous
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Option<f64> {
        *self.value.read()
    }

    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observable.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observable.unregister(observer);
    }
}

impl fmt::Debug for SimpleQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleQuote")
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Observer for Counter {
        fn update(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_notifies_only_on_change() {
        let quote = SimpleQuote::new(0.05);
        let counter = Arc::new(Counter::default());
        let observer: Arc<dyn Observer> = counter.clone();
        quote.register_observer(Arc::downgrade(&observer));

        quote.set_value(0.05);
        assert_eq!(counter.0.load(Ordering::SeqCst), 0);

        assert_eq!(quote.set_value(0.06), Some(0.05));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        quote.reset();
        assert!(!quote.is_valid());
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_quote() {
        let quote = SimpleQuote::empty();
        assert_eq!(quote.value(), None);
        assert!(!quote.is_valid());
    }
}
