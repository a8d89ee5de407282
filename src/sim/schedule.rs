//! Cancelable timed events on a virtual clock
//!
//! Timers are driven by the same fixed-tick clock as movement, so tests
//! advance time by ticking instead of sleeping. Every scheduled event gets a
//! [`TimerId`] that doubles as its cancel token.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Cancel token for a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    fire_at: u64,
    /// Re-arm period for repeating timers
    period: Option<u64>,
    event: E,
}

/// Time-ordered queue of `(fire time, token, event)`
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    /// Fire time of the event being handled, or the horizon once drained
    now_ms: u64,
    /// Latest time the clock has been advanced to
    horizon_ms: u64,
    next_id: u64,
    /// Min-heap on (fire time, insertion order); entries may be stale
    queue: BinaryHeap<Reverse<(u64, u64, TimerId)>>,
    pending: HashMap<TimerId, Pending<E>>,
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            horizon_ms: 0,
            next_id: 1,
            queue: BinaryHeap::new(),
            pending: HashMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    ///
    /// While due events are being drained this is the fire time of the
    /// event just popped, so chained timers keep exact spacing.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, fire_at: u64, period: Option<u64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.push(Reverse((fire_at, id.0, id)));
        self.pending.insert(id, Pending { fire_at, period, event });
        id
    }

    /// Fire `event` once, `delay_ms` from now
    pub fn schedule_in(&mut self, delay_ms: u64, event: E) -> TimerId {
        self.push(self.now_ms + delay_ms, None, event)
    }

    /// Fire `event` every `period_ms` (at least 1 ms) until cancelled
    pub fn schedule_every(&mut self, period_ms: u64, event: E) -> TimerId {
        let period = period_ms.max(1);
        self.push(self.now_ms + period, Some(period), event)
    }

    /// Cancel a timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Cancel every pending event matching `pred`, returning how many
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&E) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, p| !pred(&p.event));
        before - self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward; time never runs backwards.
    ///
    /// Drain with [`Scheduler::pop_due`] afterwards.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.horizon_ms = self.horizon_ms.max(now_ms);
    }

    /// Pop the earliest event due at or before now.
    ///
    /// Repeating timers are re-armed from their scheduled time, not from
    /// now, so a late tick does not drift the cadence.
    pub fn pop_due(&mut self) -> Option<(TimerId, E)> {
        while let Some(&Reverse((fire_at, _, id))) = self.queue.peek() {
            if fire_at > self.horizon_ms {
                break;
            }
            self.queue.pop();

            let Some(pending) = self.pending.get_mut(&id) else {
                continue; // cancelled
            };
            if pending.fire_at != fire_at {
                continue;
            }

            self.now_ms = fire_at;
            let event = pending.event.clone();
            match pending.period {
                Some(period) => {
                    let next = fire_at + period;
                    pending.fire_at = next;
                    self.queue.push(Reverse((next, self.next_id, id)));
                    self.next_id += 1;
                }
                None => {
                    self.pending.remove(&id);
                }
            }
            return Some((id, event));
        }
        self.now_ms = self.horizon_ms;
        None
    }
}

/// Timers owned by a single egg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EggTimer {
    Appear,
    Ripen,
    Hatch,
    /// Repeating ripeness colour step while not ready
    Blueness,
    HungerRestored,
    /// Killed creature disappears
    Vanish,
}

impl EggTimer {
    /// Timers that only make sense before the egg hatches
    pub fn is_pre_hatch(self) -> bool {
        matches!(self, EggTimer::Appear | EggTimer::Ripen | EggTimer::Hatch | EggTimer::Blueness)
    }
}

/// Every timed event in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    Egg { egg: usize, timer: EggTimer },
    /// One step of the projectile's recharge meter
    Recharge,
}

impl TimerEvent {
    /// True if this event belongs to `egg` and `filter` accepts its kind
    pub fn is_egg_timer(&self, egg: usize, filter: impl Fn(EggTimer) -> bool) -> bool {
        matches!(*self, TimerEvent::Egg { egg: e, timer } if e == egg && filter(timer))
    }
}

/// The scene's virtual clock
pub type GameClock = Scheduler<TimerEvent>;
