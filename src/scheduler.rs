//! Periodic scheduling primitive.
//!
//! The host provides `setInterval`/`clearInterval`; this module models them as
//! the [`Scheduler`] trait and wraps an interval in [`PeriodicTask`], an owned
//! guard that clears the interval when cancelled or dropped. Whoever owns the
//! task owns the scheduled work: tearing down the owner can never leak it.
//!
//! [`VirtualClock`] is a deterministic scheduler driven by explicit
//! [`VirtualClock::advance`] calls. It behaves like a single-threaded event
//! loop: due callbacks fire one at a time in due-time order, and each runs to
//! completion before the next one starts.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Smallest period a [`VirtualClock`] will schedule; shorter periods are
/// clamped up, matching how browsers clamp `setInterval(f, 0)`.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Identifies one scheduled interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalHandle(u64);

pub trait Scheduler {
    /// Run `callback` every `period`, starting one period from now.
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) -> IntervalHandle;

    /// Stop an interval. Returns `false` if it was already cleared.
    fn clear_interval(&self, handle: IntervalHandle) -> bool;
}

/// An interval owned by a value: cleared on [`cancel`](Self::cancel) or drop.
pub struct PeriodicTask {
    scheduler: Rc<dyn Scheduler>,
    handle: Option<IntervalHandle>,
    period: Duration,
}

impl PeriodicTask {
    pub fn start(
        scheduler: Rc<dyn Scheduler>,
        period: Duration,
        callback: impl FnMut() + 'static,
    ) -> Self {
        let handle = scheduler.set_interval(period, Box::new(callback));
        Self {
            scheduler,
            handle: Some(handle),
            period,
        }
    }

    /// Clear the interval. Idempotent; returns whether anything was cleared.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => self.scheduler.clear_interval(handle),
            None => false,
        }
    }

    /// Whether this guard still holds its interval.
    ///
    /// Reflects only what went through the guard. An interval cleared on the
    /// scheduler directly still reads as active, and [`cancel`](Self::cancel)
    /// then returns `false`.
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("handle", &self.handle)
            .field("period", &self.period)
            .finish()
    }
}

// ============================================================================
// Virtual clock
// ============================================================================

struct Interval {
    period: Duration,
    next_due: Duration,
    /// `None` while the callback is running.
    callback: Option<Box<dyn FnMut()>>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    intervals: BTreeMap<u64, Interval>,
}

/// Deterministic [`Scheduler`] advanced by hand.
#[derive(Default)]
pub struct VirtualClock {
    state: RefCell<ClockState>,
}

impl VirtualClock {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Virtual time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of live intervals.
    pub fn pending(&self) -> usize {
        self.state.borrow().intervals.len()
    }

    /// Move time forward by `by`, firing every callback that falls due.
    ///
    /// Callbacks fire in due-time order; callbacks due at the same instant
    /// fire in the order they were scheduled. A callback may schedule or clear
    /// intervals (including its own). Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.borrow().now + by;
        let mut fired = 0;

        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let due = state
                    .intervals
                    .iter()
                    .filter(|(_, iv)| iv.callback.is_some() && iv.next_due <= target)
                    .min_by_key(|(id, iv)| (iv.next_due, **id))
                    .map(|(id, _)| *id);
                match due {
                    Some(id) => {
                        let when = state.intervals[&id].next_due;
                        state.now = when;
                        let iv = state
                            .intervals
                            .get_mut(&id)
                            .expect("interval selected above");
                        iv.next_due += iv.period;
                        iv.callback.take().map(|cb| (id, cb))
                    }
                    None => None,
                }
            };

            let Some((id, mut callback)) = next else {
                break;
            };
            // The state borrow is released: the callback may re-enter the clock.
            callback();
            fired += 1;

            if let Some(iv) = self.state.borrow_mut().intervals.get_mut(&id) {
                iv.callback = Some(callback);
            }
        }

        self.state.borrow_mut().now = target;
        fired
    }
}

impl Scheduler for VirtualClock {
    fn set_interval(&self, period: Duration, callback: Box<dyn FnMut()>) -> IntervalHandle {
        let mut state = self.state.borrow_mut();
        let period = period.max(MIN_PERIOD);
        let id = state.next_id;
        state.next_id += 1;
        let next_due = state.now + period;
        state.intervals.insert(
            id,
            Interval {
                period,
                next_due,
                callback: Some(callback),
            },
        );
        IntervalHandle(id)
    }

    fn clear_interval(&self, handle: IntervalHandle) -> bool {
        self.state.borrow_mut().intervals.remove(&handle.0).is_some()
    }
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualClock")
            .field("now", &state.now)
            .field("pending", &state.intervals.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn interval_fires_once_per_period() {
        let clock = VirtualClock::new();
        let (count, cb) = counter();
        clock.set_interval(ms(4000), Box::new(cb));

        assert_eq!(clock.advance(ms(3999)), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(clock.advance(ms(1)), 1);
        assert_eq!(count.get(), 1);
        assert_eq!(clock.advance(ms(12_000)), 3);
        assert_eq!(count.get(), 4);
        assert_eq!(clock.now(), ms(16_000));
    }

    #[test]
    fn cleared_interval_never_fires_again() {
        let clock = VirtualClock::new();
        let (count, cb) = counter();
        let handle = clock.set_interval(ms(10), Box::new(cb));
        clock.advance(ms(10));
        assert!(clock.clear_interval(handle));
        assert!(!clock.clear_interval(handle));
        clock.advance(ms(100));
        assert_eq!(count.get(), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn simultaneous_intervals_fire_in_schedule_order() {
        let clock = VirtualClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b"] {
            let log = log.clone();
            clock.set_interval(ms(5), Box::new(move || log.borrow_mut().push(name)));
        }
        let l = log.clone();
        clock.set_interval(ms(2), Box::new(move || l.borrow_mut().push("fast")));

        clock.advance(ms(5));
        assert_eq!(*log.borrow(), vec!["fast", "fast", "a", "b"]);
    }

    #[test]
    fn callback_can_clear_its_own_interval() {
        let clock = VirtualClock::new();
        let slot: Rc<Cell<Option<IntervalHandle>>> = Rc::new(Cell::new(None));
        let count = Rc::new(Cell::new(0));
        let handle = {
            let clock2 = clock.clone();
            let slot = slot.clone();
            let count = count.clone();
            clock.set_interval(
                ms(1),
                Box::new(move || {
                    count.set(count.get() + 1);
                    if let Some(h) = slot.get() {
                        clock2.clear_interval(h);
                    }
                }),
            )
        };
        slot.set(Some(handle));
        clock.advance(ms(10));
        assert_eq!(count.get(), 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn zero_period_is_clamped() {
        let clock = VirtualClock::new();
        let (count, cb) = counter();
        clock.set_interval(Duration::ZERO, Box::new(cb));
        clock.advance(ms(3));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn periodic_task_clears_on_drop() {
        let clock = VirtualClock::new();
        let (count, cb) = counter();
        {
            let _task = PeriodicTask::start(clock.clone(), ms(100), cb);
            assert_eq!(clock.pending(), 1);
            clock.advance(ms(100));
        }
        assert_eq!(clock.pending(), 0);
        clock.advance(ms(1000));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn periodic_task_cancel_is_idempotent() {
        let clock = VirtualClock::new();
        let (_, cb) = counter();
        let mut task = PeriodicTask::start(clock.clone(), ms(100), cb);
        assert!(task.is_active());
        assert_eq!(task.period(), ms(100));
        assert!(task.cancel());
        assert!(!task.cancel());
        assert!(!task.is_active());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn periodic_task_does_not_see_external_clear() {
        let clock = VirtualClock::new();
        let (count, cb) = counter();
        let mut task = PeriodicTask::start(clock.clone(), ms(100), cb);
        let handle = task.handle.expect("task just started");
        assert!(clock.clear_interval(handle));
        assert_eq!(clock.pending(), 0);

        assert!(task.is_active());
        assert!(!task.cancel());
        assert!(!task.is_active());
        clock.advance(ms(500));
        assert_eq!(count.get(), 0);
    }
}
