//! Event-loop driver: a process-wide singleton mirroring the reactor's own
//! `node` instance (`native/detail/node.h`). It owns the deferred "next
//! tick" queue and the prepare/check/idle bookkeeping that flushes it once
//! per pass of the underlying executor, and it is the single entry point
//! that starts the whole process (`node::instance().start(logic)`).
//!
//! `async-std`'s executor plays the role of the reactor here: there is no
//! separate prepare/check hook to install, so instead every future this
//! module hands to the executor - the top-level `logic` future passed to
//! [`start`], and every per-connection task spawned via [`spawn`] - is
//! wrapped in [`Ticked`], which drains the tick queue synchronously
//! immediately before and immediately after each poll. That ties "ticks run
//! between I/O completions, not inside one" directly to the wrapped
//! future's own suspension points rather than to an independently scheduled
//! drainer task racing against it.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, OnceLock};
use std::task::{Context, Poll};

use async_std::task;

type TickFn = Box<dyn FnOnce() + Send + 'static>;

static TICKS: OnceLock<Mutex<VecDeque<TickFn>>> = OnceLock::new();

fn ticks() -> &'static Mutex<VecDeque<TickFn>> {
    TICKS.get_or_init(|| Mutex::new(VecDeque::new()))
}

/// Queues `f` to run on the next tick drain, the Rust analogue of
/// `node::add_tick_callback`. Never runs `f` synchronously, even if called
/// from inside a drain itself.
pub fn add_tick_callback<F: FnOnce() + Send + 'static>(f: F) {
    ticks().lock().unwrap().push_back(Box::new(f));
}

/// Runs every callback currently queued, oldest first, including any queued
/// by a callback that ran earlier in the same drain.
fn drain_ticks_sync() {
    loop {
        let next = ticks().lock().unwrap().pop_front();
        let Some(f) = next else { break };
        // A panicking tick callback must not poison the whole loop: the
        // reactor's own `tick()` caught C++ exceptions per-callback and kept
        // going, so a caught Rust panic here plays the same role.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
        if let Err(payload) = result {
            log::error!("next-tick callback panicked: {:?}", panic_message(&payload));
        }
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Wraps a future so that every poll is bracketed by a synchronous tick
/// drain. Holding the inner future as a `Pin<Box<Fut>>` makes `Ticked`
/// unconditionally `Unpin` (`Pin<P>` always is), so polling it needs no
/// unsafe pin projection.
struct Ticked<Fut: Future> {
    inner: Pin<Box<Fut>>,
}

impl<Fut: Future> Ticked<Fut> {
    fn new(fut: Fut) -> Self {
        Self { inner: Box::pin(fut) }
    }
}

impl<Fut: Future> Future for Ticked<Fut> {
    type Output = Fut::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        drain_ticks_sync();
        let result = self.inner.as_mut().poll(cx);
        drain_ticks_sync();
        result
    }
}

/// Spawns `fut` on the executor with the same tick-draining guarantee
/// [`start`] gives the top-level logic future. Every per-connection task the
/// HTTP server hands off goes through here rather than a bare `task::spawn`.
pub fn spawn<Fut>(fut: Fut) -> task::JoinHandle<Fut::Output>
where
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    task::spawn(Ticked::new(fut))
}

/// Starts the driver: runs `logic` (which is expected to register reactor
/// handles, e.g. `http::listen`) to completion, draining the tick queue
/// around every poll of it, and blocks the calling thread until the
/// async-std executor is exhausted.
///
/// Matches `node::start`'s shape of "run user setup, then run the loop until
/// nothing is left to do" - the difference is that here "the loop" is
/// async-std's own executor rather than a second explicit `uv_run` call.
pub fn start<F, Fut>(logic: F) -> std::io::Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    task::block_on(Ticked::new(logic()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn tick_queued_before_first_poll_runs_before_logic_completes() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_cb = ran.clone();

        // Queued before `start` ever polls the logic future: must be
        // drained on the very first poll, before any `.await` inside
        // `logic` can run - no sleep needed to observe this, the ordering
        // is enforced by `Ticked::poll` itself.
        add_tick_callback(move || {
            ran_cb.store(true, Ordering::SeqCst);
        });

        let result = start(move || async move {
            assert!(ran.load(Ordering::SeqCst));
            Ok(())
        });

        assert!(result.is_ok());
    }

    #[test]
    fn tick_queued_during_poll_is_drained_before_poll_returns() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_cb = ran.clone();

        let result = start(move || async move {
            add_tick_callback(move || {
                ran_cb.store(true, Ordering::SeqCst);
            });
            // `Ticked::poll` drains the queue again right after this poll
            // call returns, before the executor moves on to anything else.
            async_std::task::yield_now().await;
            assert!(ran.load(Ordering::SeqCst));
            Ok(())
        });

        assert!(result.is_ok());
    }
}
