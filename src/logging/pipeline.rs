//! # Bounded staging pipeline for asynchronous logging.
//!
//! A fixed pool of [`LogItem`] records moves between two stations:
//!
//! ```text
//!   emit thread                       log task
//!   -----------                       --------
//!   acquire ──► fill ──► commit ──► pending ──► drain(write) ──► free
//!      ▲                                                          │
//!      └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Both stations are coarse locks (a `Vec` free list and a `VecDeque` of
//! committed records); no code path ever holds both at once. The pool never
//! grows: when the free list is empty the emitter forces a synchronous drain
//! and retries once, and if the pool is still exhausted the record is counted
//! and written to stderr instead of blocking or allocating.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::logging::item::LogItem;

/// The bounded record pool shared by emitters and the log task.
#[derive(Debug)]
pub(crate) struct AsyncPipeline {
    free: Mutex<Vec<Box<LogItem>>>,
    pending: Mutex<VecDeque<Box<LogItem>>>,
    /// Records currently outside the free list (filled or pending).
    outstanding: AtomicUsize,
    /// Records refused because the pool stayed exhausted after a drain.
    dropped: AtomicU64,
}

impl AsyncPipeline {
    /// Preallocates `pool_size` blank records.
    pub fn new(pool_size: usize) -> Self {
        let mut free = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            free.push(Box::new(LogItem::blank()));
        }
        Self {
            free: Mutex::new(free),
            pending: Mutex::new(VecDeque::with_capacity(pool_size)),
            outstanding: AtomicUsize::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Takes a blank record from the free list, or `None` when exhausted.
    pub fn acquire(&self) -> Option<Box<LogItem>> {
        let item = self
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()?;
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        Some(item)
    }

    /// Queues a filled record for the log task.
    pub fn commit(&self, item: Box<LogItem>) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(item);
    }

    /// Counts a record that could not be staged.
    pub fn count_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records currently filled or waiting to be written.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Records refused on pool exhaustion since startup.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Writes out every pending record and recycles it.
    ///
    /// Callable from any thread; the emitter uses it as a forced flush when
    /// the pool runs dry. `write` sees records in commit order.
    pub fn drain<F>(&self, mut write: F) -> usize
    where
        F: FnMut(&LogItem),
    {
        let mut written = 0;
        loop {
            // Take one record at a time so a concurrent drain interleaves
            // instead of starving.
            let item = self
                .pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front();
            let Some(mut item) = item else { break };
            write(&item);
            item.reset();
            self.free
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(item);
            self.outstanding.fetch_sub(1, Ordering::AcqRel);
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn acquire_commit_drain_recycles() {
        let pool = AsyncPipeline::new(2);
        let mut a = pool.acquire().unwrap();
        a.text.push_str("first");
        pool.commit(a);
        assert_eq!(pool.outstanding(), 1);

        let mut lines = Vec::new();
        let written = pool.drain(|item| lines.push(item.text.clone()));
        assert_eq!(written, 1);
        assert_eq!(lines, vec!["first".to_owned()]);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn pool_never_grows() {
        let pool = AsyncPipeline::new(2);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        pool.commit(a);
        pool.commit(b);
        pool.drain(|_| {});
        assert!(pool.acquire().is_some());
    }

    #[test]
    fn concurrent_emitters_complete_without_loss() {
        let pool = Arc::new(AsyncPipeline::new(8));
        let total = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for t in 0..4 {
            let pool = Arc::clone(&pool);
            let total = Arc::clone(&total);
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    loop {
                        if let Some(mut item) = pool.acquire() {
                            item.text.push_str(&format!("{t}:{i}"));
                            pool.commit(item);
                            break;
                        }
                        // Exhausted: this emitter drains synchronously.
                        total.fetch_add(pool.drain(|_| {}), Ordering::SeqCst);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        total.fetch_add(pool.drain(|_| {}), Ordering::SeqCst);
        assert_eq!(total.load(Ordering::SeqCst), 400);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.dropped(), 0);
    }
}
