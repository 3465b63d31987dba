//! Cooperative Continuation Scheduling
//!
//! Every delayed effect in the stage is a scheduled continuation: an event
//! value parked in a [`Scheduler`] until its deadline passes. Components own
//! their scheduler and drain it from their `tick`. Nothing here blocks or
//! spawns; time only moves when the owner says so.
//!
//! # Cancellation
//!
//! Cancellation is cooperative and layered:
//!
//! - [`Scheduler::cancel`] / [`Scheduler::cancel_where`] remove entries eagerly
//! - every event carries a [`Generation`] (or session id) that the owner
//!   re-checks when the event fires, so anything that slipped through is
//!   dropped as stale
//!
//! # Single Effects
//!
//! [`Latch`] is a single-assignment flag for effects that can be reached by
//! more than one path (an animation-completion signal and its time-based
//! fallback). The first path to trip the latch applies the effect; every later
//! path is a no-op.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle for a scheduled continuation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Liveness token for a family of continuations
///
/// Owners bump their generation when everything scheduled so far becomes
/// meaningless (reseed, dispose). Events capture the generation they were
/// scheduled under and are dropped if it no longer matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// The first generation
    #[must_use]
    pub const fn initial() -> Self {
        Self(0)
    }

    /// Advance to the next generation, returning the new value
    pub fn bump(&mut self) -> Self {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    /// Raw counter value (for logging)
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Single-assignment completion flag
///
/// ```
/// use hydrant_conductor::scheduler::Latch;
///
/// let mut finished = Latch::new();
/// assert!(finished.trip());  // timer path wins
/// assert!(!finished.trip()); // event path arrives second, no effect
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Latch {
    tripped: bool,
}

impl Latch {
    /// Create an untripped latch
    #[must_use]
    pub const fn new() -> Self {
        Self { tripped: false }
    }

    /// Trip the latch. Returns `true` only for the first call.
    pub fn trip(&mut self) -> bool {
        if self.tripped {
            false
        } else {
            self.tripped = true;
            true
        }
    }

    /// Whether the latch has been tripped
    #[must_use]
    pub const fn is_tripped(&self) -> bool {
        self.tripped
    }
}

/// Deterministic timer queue keyed by deadline
///
/// Entries with equal deadlines fire in scheduling order. Delays are measured
/// from the scheduler's notion of "now", which is the deadline of the event
/// currently being handled while draining. That keeps chained continuations
/// (tick → schedule next tick) free of drift when the owner ticks late.
#[derive(Debug)]
pub struct Scheduler<E> {
    /// Pending entries ordered by (deadline, id)
    pending: BTreeMap<(Duration, TimerId), E>,
    /// Reverse index for cancellation by id
    deadlines: BTreeMap<TimerId, Duration>,
    /// Current scheduler time
    now: Duration,
    /// Next id to hand out
    next_id: u64,
}

impl<E> Scheduler<E> {
    /// Create an empty scheduler at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Duration::ZERO)
    }

    /// Create an empty scheduler whose clock starts at `now`
    #[must_use]
    pub fn starting_at(now: Duration) -> Self {
        Self {
            pending: BTreeMap::new(),
            deadlines: BTreeMap::new(),
            now,
            next_id: 0,
        }
    }

    /// Current scheduler time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the scheduler clock forward without firing anything
    ///
    /// Time never moves backwards; an earlier `now` is ignored.
    pub fn set_now(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Schedule `event` to fire `delay` after the current scheduler time
    pub fn schedule_after(&mut self, delay: Duration, event: E) -> TimerId {
        let deadline = self.now.saturating_add(delay);
        self.schedule_at(deadline, event)
    }

    /// Schedule `event` at an absolute deadline
    ///
    /// Deadlines in the past fire on the next drain.
    pub fn schedule_at(&mut self, deadline: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending continuation. Returns the event if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let deadline = self.deadlines.remove(&id)?;
        self.pending.remove(&(deadline, id))
    }

    /// Cancel every pending continuation matching `predicate`
    ///
    /// Returns the number of entries removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&E) -> bool) -> usize {
        let doomed: Vec<(Duration, TimerId)> = self
            .pending
            .iter()
            .filter(|(_, event)| predicate(event))
            .map(|(key, _)| *key)
            .collect();

        for key in &doomed {
            self.pending.remove(key);
            self.deadlines.remove(&key.1);
        }

        doomed.len()
    }

    /// Drop every pending continuation
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    /// Pop the earliest continuation due at or before `now`
    ///
    /// On success the scheduler clock is set to the event's deadline so that
    /// anything the handler schedules is measured from when the event was due.
    /// When nothing is due the clock advances to `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let key = match self.pending.keys().next() {
            Some(&(deadline, id)) if deadline <= now => (deadline, id),
            _ => {
                self.set_now(now);
                return None;
            }
        };

        let event = self.pending.remove(&key)?;
        self.deadlines.remove(&key.1);
        self.set_now(key.0);
        Some((key.0, event))
    }

    /// Earliest pending deadline
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Number of pending continuations
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterate pending events in firing order
    pub fn iter(&self) -> impl Iterator<Item = (Duration, &E)> {
        self.pending.iter().map(|((deadline, _), event)| (*deadline, event))
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
