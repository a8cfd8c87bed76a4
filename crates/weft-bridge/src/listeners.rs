//! Ordered callback lists.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::error;

/// Callbacks invoked in registration order with a shared payload.
///
/// The list is copied before invoking, so a callback may register further
/// callbacks. A panicking callback is logged and skipped.
pub(crate) struct Listeners<T: ?Sized> {
    inner: Mutex<Vec<Arc<dyn Fn(&T) + Send + Sync>>>,
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
        }
    }
}

impl<T: ?Sized> Listeners<T> {
    pub(crate) fn add(&self, listener: Arc<dyn Fn(&T) + Send + Sync>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn emit(&self, payload: &T) {
        let listeners = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            if panic::catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                error!("listener panicked");
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_in_registration_order() {
        let listeners: Listeners<str> = Listeners::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            listeners.add(Arc::new(move |msg: &str| {
                seen.lock().unwrap().push(format!("{tag}:{msg}"));
            }));
        }
        listeners.emit("hi");
        assert_eq!(*seen.lock().unwrap(), vec!["first:hi", "second:hi"]);
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn may_register_during_emit() {
        let listeners: Arc<Listeners<str>> = Arc::new(Listeners::default());
        let l = Arc::clone(&listeners);
        listeners.add(Arc::new(move |_: &str| {
            l.add(Arc::new(|_: &str| {}));
        }));
        listeners.emit("x");
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn panicking_listener_is_skipped() {
        let listeners: Listeners<u32> = Listeners::default();
        let hits = Arc::new(Mutex::new(0));
        listeners.add(Arc::new(|_: &u32| panic!("bad listener")));
        let h = Arc::clone(&hits);
        listeners.add(Arc::new(move |n: &u32| *h.lock().unwrap() += n));
        listeners.emit(&3);
        assert_eq!(*hits.lock().unwrap(), 3);
    }
}
