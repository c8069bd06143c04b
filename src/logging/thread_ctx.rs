//! # Per-thread logging context.
//!
//! Every emitting thread gets a small context the first time it logs: a dense
//! numeric id (stable for the thread's lifetime, compact enough for a fixed
//! hex column), a per-thread sequence counter, a call-depth indent for trace
//! enter/exit pairs, and an optional correlation id stamped on records.
//!
//! The registry is a coarse mutex over a hash map; each thread resolves its
//! own `Arc` once and caches it in a thread local, so the lock is off the hot
//! path after first use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

/// Deepest indent recorded for trace nesting.
pub(crate) const INDENT_MAX: i64 = 30;

/// Mutable per-thread logging state.
#[derive(Debug)]
pub(crate) struct ThreadCtxt {
    /// Dense id assigned at registration, in registration order.
    pub tid: u32,
    seq: AtomicU64,
    indent: AtomicI64,
    correlation: AtomicI64,
}

impl ThreadCtxt {
    fn new(tid: u32) -> Self {
        Self {
            tid,
            seq: AtomicU64::new(0),
            indent: AtomicI64::new(0),
            correlation: AtomicI64::new(-1),
        }
    }

    /// Next per-thread sequence number.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Current indent, clamped to `0..=INDENT_MAX`.
    pub fn indent(&self) -> usize {
        self.indent.load(Ordering::Relaxed).clamp(0, INDENT_MAX) as usize
    }

    /// Deepens the indent by one step. Saturates at `INDENT_MAX`.
    pub fn enter(&self) {
        let _ = self
            .indent
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| {
                Some((d + 1).min(INDENT_MAX))
            });
    }

    /// Shallows the indent by one step. Saturates at zero.
    pub fn exit(&self) {
        let _ = self
            .indent
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| {
                Some((d - 1).max(0))
            });
    }

    /// Sets the correlation id stamped on this thread's records.
    pub fn set_correlation(&self, id: Option<u64>) {
        let raw = match id {
            Some(v) => v as i64,
            None => -1,
        };
        self.correlation.store(raw, Ordering::Relaxed);
    }

    /// Current correlation id, if set.
    pub fn correlation(&self) -> Option<u64> {
        match self.correlation.load(Ordering::Relaxed) {
            -1 => None,
            v => Some(v as u64),
        }
    }
}

/// Process-wide registry of per-thread contexts.
#[derive(Debug, Default)]
pub(crate) struct ThreadRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_tid: u32,
    by_thread: HashMap<ThreadId, Arc<ThreadCtxt>>,
}

impl ThreadRegistry {
    /// Resolves (registering on first use) the calling thread's context.
    pub fn current(&self) -> Arc<ThreadCtxt> {
        let id = std::thread::current().id();
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ctx) = inner.by_thread.get(&id) {
            return Arc::clone(ctx);
        }
        let tid = inner.next_tid;
        inner.next_tid += 1;
        let ctx = Arc::new(ThreadCtxt::new(tid));
        inner.by_thread.insert(id, Arc::clone(&ctx));
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_assigns_dense_ids() {
        let reg = Arc::new(ThreadRegistry::default());
        let a = reg.current();
        let a2 = reg.current();
        assert_eq!(a.tid, a2.tid);

        let reg2 = Arc::clone(&reg);
        let other = std::thread::spawn(move || reg2.current().tid)
            .join()
            .unwrap();
        assert_ne!(a.tid, other);
    }

    #[test]
    fn indent_saturates_both_ways() {
        let ctx = ThreadCtxt::new(0);
        ctx.exit();
        assert_eq!(ctx.indent(), 0);
        for _ in 0..100 {
            ctx.enter();
        }
        assert_eq!(ctx.indent(), INDENT_MAX as usize);
    }

    #[test]
    fn sequence_is_per_thread_monotonic() {
        let ctx = ThreadCtxt::new(0);
        assert_eq!(ctx.next_seq(), 0);
        assert_eq!(ctx.next_seq(), 1);
    }
}
