//! Bounded set of armed timers for one task.

use std::time::{Duration, Instant};

/// Opaque handle for one armed timer.
///
/// Handles are unique within their registry for its whole lifetime; a handle
/// whose timer has fired or been stopped simply no longer matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        TimerId(raw)
    }
}

/// How often a timer fires before retiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Fire once, then retire.
    Once,
    /// Fire every period until stopped.
    Forever,
    /// Fire `n` times, then retire. `Times(0)` never fires.
    Times(u32),
}

#[derive(Debug)]
struct TimerEntry {
    id: TimerId,
    deadline: Instant,
    period: Duration,
    remaining: Repeat,
    token: u64,
}

/// One fired timer, ready to be synthesized into an expiry envelope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expiry {
    pub id: TimerId,
    pub token: u64,
}

/// The bounded armed-timer set owned by one task context.
///
/// All methods take `&mut self`; the owning event loop is the only caller, so
/// no synchronization is needed. The registry is a flat vector — task timer
/// counts are small and the linear scans are cheaper than a heap here.
#[derive(Debug)]
pub struct TimerRegistry {
    next_id: u64,
    armed: Vec<TimerEntry>,
    capacity: usize,
}

impl TimerRegistry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            next_id: 1,
            armed: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Arms a timer firing `delay` from now, then per `repeat`.
    ///
    /// `token` is an opaque value handed back in the expiry message so the
    /// handler can tell its timers apart. Returns `None` when the registry is
    /// at capacity.
    pub fn start(&mut self, delay: Duration, repeat: Repeat, token: u64) -> Option<TimerId> {
        if self.armed.len() >= self.capacity {
            return None;
        }
        if matches!(repeat, Repeat::Times(0)) {
            return None;
        }
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.armed.push(TimerEntry {
            id,
            deadline: Instant::now() + delay,
            period: delay,
            remaining: repeat,
            token,
        });
        Some(id)
    }

    /// Disarms a timer. Idempotent: stopping an unknown, already-stopped, or
    /// already-fired handle is a no-op.
    pub fn stop(&mut self, id: TimerId) {
        self.armed.retain(|e| e.id != id);
    }

    /// Whether the handle still refers to an armed timer.
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.iter().any(|e| e.id == id)
    }

    /// Number of currently armed timers.
    pub fn armed_len(&self) -> usize {
        self.armed.len()
    }

    /// Earliest deadline among armed timers, if any.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.armed.iter().map(|e| e.deadline).min()
    }

    /// Collects every timer whose deadline has passed, rearming repeating
    /// entries and retiring expired one-shots.
    pub(crate) fn collect_expired(&mut self, now: Instant) -> Vec<Expiry> {
        let mut fired = Vec::new();
        let mut i = 0;
        while i < self.armed.len() {
            if self.armed[i].deadline > now {
                i += 1;
                continue;
            }
            let entry = &mut self.armed[i];
            fired.push(Expiry {
                id: entry.id,
                token: entry.token,
            });
            match entry.remaining {
                Repeat::Forever => {
                    entry.deadline = now + entry.period;
                    i += 1;
                }
                Repeat::Times(n) if n > 1 => {
                    entry.remaining = Repeat::Times(n - 1);
                    entry.deadline = now + entry.period;
                    i += 1;
                }
                _ => {
                    self.armed.swap_remove(i);
                }
            }
        }
        fired
    }

    /// Disarms everything. Invoked by the context self-destructor.
    pub(crate) fn clear(&mut self) {
        self.armed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TimerRegistry {
        TimerRegistry::new(8)
    }

    #[test]
    fn stop_is_idempotent() {
        let mut reg = registry();
        let id = reg.start(Duration::from_millis(1), Repeat::Once, 0).unwrap();
        reg.stop(id);
        // Second stop of the same handle is a no-op, not an error.
        reg.stop(id);
        assert!(!reg.is_armed(id));
    }

    #[test]
    fn stop_after_fire_is_a_noop() {
        let mut reg = registry();
        let id = reg.start(Duration::ZERO, Repeat::Once, 7).unwrap();
        let fired = reg.collect_expired(Instant::now() + Duration::from_millis(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].token, 7);
        assert!(!reg.is_armed(id));
        reg.stop(id);
    }

    #[test]
    fn one_shot_retires_after_firing() {
        let mut reg = registry();
        reg.start(Duration::ZERO, Repeat::Once, 0).unwrap();
        let later = Instant::now() + Duration::from_millis(1);
        assert_eq!(reg.collect_expired(later).len(), 1);
        assert_eq!(reg.armed_len(), 0);
        assert!(reg.next_deadline().is_none());
    }

    #[test]
    fn forever_rearms_with_its_period() {
        let mut reg = registry();
        let id = reg
            .start(Duration::from_millis(10), Repeat::Forever, 0)
            .unwrap();
        let later = Instant::now() + Duration::from_millis(20);
        assert_eq!(reg.collect_expired(later).len(), 1);
        assert!(reg.is_armed(id));
        let next = reg.next_deadline().unwrap();
        assert_eq!(next, later + Duration::from_millis(10));
    }

    #[test]
    fn times_n_counts_down() {
        let mut reg = registry();
        let id = reg
            .start(Duration::from_millis(1), Repeat::Times(2), 0)
            .unwrap();
        let t1 = Instant::now() + Duration::from_millis(5);
        assert_eq!(reg.collect_expired(t1).len(), 1);
        assert!(reg.is_armed(id));
        let t2 = t1 + Duration::from_millis(5);
        assert_eq!(reg.collect_expired(t2).len(), 1);
        assert!(!reg.is_armed(id));
    }

    #[test]
    fn start_fails_when_exhausted() {
        let mut reg = TimerRegistry::new(2);
        assert!(reg.start(Duration::from_secs(1), Repeat::Once, 0).is_some());
        assert!(reg.start(Duration::from_secs(1), Repeat::Once, 0).is_some());
        assert!(reg.start(Duration::from_secs(1), Repeat::Once, 0).is_none());
    }

    #[test]
    fn earliest_deadline_wins() {
        let mut reg = registry();
        reg.start(Duration::from_secs(10), Repeat::Once, 0).unwrap();
        let soon = reg.start(Duration::from_millis(5), Repeat::Once, 0).unwrap();
        reg.start(Duration::from_secs(5), Repeat::Once, 0).unwrap();
        let deadline = reg.next_deadline().unwrap();
        assert!(deadline <= Instant::now() + Duration::from_millis(5));
        reg.stop(soon);
        assert!(reg.next_deadline().unwrap() > Instant::now() + Duration::from_secs(1));
    }
}
