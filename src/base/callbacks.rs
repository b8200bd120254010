//! Per-handle callback table.
//!
//! The reactor binding used one `void*`-tagged slot table per handle,
//! keyed by an operation id (`uv_cid_listen`, `uv_cid_read_start`, ...),
//! so that a single handle could carry an independent callback per kind
//! of completion without allocating a new field for every operation it
//! might ever support. A typed closure still needs the same shape: a
//! stream has at most one pending read callback and one pending write
//! callback at a time, and storing them by slot keeps `Handle` generic
//! over what kind of reactor object it backs.

use crate::error::Resval;
use crate::net::tcp::Tcp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cid {
    Close,
    Listen,
    Connect,
    ReadStart,
    Write,
    Shutdown,
}

const CID_MAX: usize = 6;

pub enum CallbackEntry {
    Close(Box<dyn FnOnce() + Send>),
    Listen(Box<dyn FnMut(Tcp) + Send>),
    Connect(Box<dyn FnOnce(Resval) + Send>),
    ReadStart(Box<dyn FnMut(&[u8]) -> bool + Send>),
    Write(Box<dyn FnOnce(Resval) + Send>),
    Shutdown(Box<dyn FnOnce(Resval) + Send>),
}

pub struct Callbacks {
    slots: [Option<CallbackEntry>; CID_MAX],
}

impl Callbacks {
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None, None, None],
        }
    }

    pub fn store(&mut self, cid: Cid, entry: CallbackEntry) {
        self.slots[cid as usize] = Some(entry);
    }

    pub fn take(&mut self, cid: Cid) -> Option<CallbackEntry> {
        self.slots[cid as usize].take()
    }

    pub fn get_mut(&mut self, cid: Cid) -> Option<&mut CallbackEntry> {
        self.slots[cid as usize].as_mut()
    }

    pub fn is_stored(&self, cid: Cid) -> bool {
        self.slots[cid as usize].is_some()
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn store_and_take_round_trips_by_slot() {
        let mut callbacks = Callbacks::new();
        assert!(!callbacks.is_stored(Cid::Write));

        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        callbacks.store(
            Cid::Write,
            CallbackEntry::Write(Box::new(move |_| ran_clone.store(true, Ordering::SeqCst))),
        );
        assert!(callbacks.is_stored(Cid::Write));

        match callbacks.take(Cid::Write) {
            Some(CallbackEntry::Write(f)) => f(Resval::ok()),
            _ => panic!("expected a Write callback"),
        }
        assert!(ran.load(Ordering::SeqCst));
        assert!(!callbacks.is_stored(Cid::Write));
    }

    #[test]
    fn slots_are_independent() {
        let mut callbacks = Callbacks::new();
        callbacks.store(Cid::Listen, CallbackEntry::Listen(Box::new(|_: Tcp| {})));
        assert!(callbacks.is_stored(Cid::Listen));
        assert!(!callbacks.is_stored(Cid::Connect));
    }
}
