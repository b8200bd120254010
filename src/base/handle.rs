//! Common handle bookkeeping: a callback table plus the active/closed
//! flags every reactor-backed object (currently just `net::tcp::Tcp`)
//! needs regardless of what it wraps.

use crate::base::callbacks::{CallbackEntry, Callbacks, Cid};

pub struct Handle {
    callbacks: Callbacks,
    closed: bool,
}

impl Handle {
    pub fn new() -> Self {
        Self {
            callbacks: Callbacks::new(),
            closed: false,
        }
    }

    pub fn callbacks(&mut self) -> &mut Callbacks {
        &mut self.callbacks
    }

    pub fn is_active(&self) -> bool {
        !self.closed
    }

    /// Idempotent: closing an already-closed handle is a no-op, matching the
    /// reactor's own `uv_close` behaviour of running the close callback once.
    /// Routes `on_close` through the same store/take slot every other
    /// completion uses, rather than invoking it directly.
    pub fn close<F: FnOnce() + Send + 'static>(&mut self, on_close: F) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.callbacks.store(Cid::Close, CallbackEntry::Close(Box::new(on_close)));
        if let Some(CallbackEntry::Close(f)) = self.callbacks.take(Cid::Close) {
            f();
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_runs_callback_exactly_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut handle = Handle::new();
        assert!(handle.is_active());

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_a = calls.clone();
        let calls_b = calls.clone();
        handle.close(move || {
            calls_a.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!handle.is_active());
        handle.close(move || {
            calls_b.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
