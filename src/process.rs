//! Process-level sugar over the event-loop driver. Mirrors the handful of
//! free functions the reactor's `node.h` exposed directly off `node`
//! without requiring callers to reach for the singleton themselves.

use crate::node;

/// Defers `f` to run on the next tick of the event loop, after the current
/// call stack has unwound. The one piece of `process`/`nextTick` sugar that
/// belongs to the loop driver itself; route-level `process.nextTick`
/// ergonomics beyond this are out of scope.
pub fn next_tick<F: FnOnce() + Send + 'static>(f: F) {
    node::add_tick_callback(f);
}
