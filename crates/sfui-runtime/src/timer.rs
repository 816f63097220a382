#![forbid(unsafe_code)]

//! Single-threaded repeating timers on a virtual clock.
//!
//! The kernel is event driven: timer callbacks run on the same thread as
//! pointer and auth events. [`TimerScheduler`] keeps a virtual `now` that
//! only moves when the host calls [`advance`](TimerScheduler::advance)
//! (tests, or a frame loop) or pumps it through a [`RealTimeDriver`].
//!
//! # How it works
//!
//! 1. [`TimerScheduler::every`] registers a repeating callback and returns a
//!    [`TimerGuard`]. The first firing is one full interval after `now`.
//! 2. `advance(dt)` fires every due callback in deadline order (ties in
//!    registration order). A timer whose interval fits several times into
//!    `dt` fires several times.
//! 3. Dropping the guard cancels the timer on every exit path.
//!
//! # Failure Modes
//!
//! - Zero interval: clamped to 1ms so `advance` always terminates.
//! - `advance` called from inside a timer callback is ignored (returns 0)
//!   with a warning, instead of re-entering the queue.
//! - A panicking callback unwinds out of `advance`; the scheduler is left
//!   usable with `now` at the requested target.
//! - Deadlines past `Duration::MAX` are never reached; such timers stay
//!   registered but no longer fire.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use web_time::Instant;

/// Identifier of a registered timer.
pub type TimerId = u64;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

type Callback = Rc<RefCell<dyn FnMut()>>;

struct TimerEntry {
    id: TimerId,
    interval: Duration,
    /// `None` once the deadline is past representable time.
    next_due: Option<Duration>,
    callback: Callback,
}

impl TimerEntry {
    fn due_by(&self, target: Duration) -> Option<Duration> {
        self.next_due.filter(|due| *due <= target)
    }
}

#[derive(Default)]
struct SchedulerInner {
    now: Duration,
    next_id: TimerId,
    timers: Vec<TimerEntry>,
    fired_total: u64,
}

/// Virtual-time timer queue. Cloning shares the queue.
#[derive(Clone, Default)]
pub struct TimerScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
    advancing: Rc<Cell<bool>>,
}

impl fmt::Debug for TimerScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TimerScheduler")
            .field("now", &inner.now)
            .field("active_timers", &inner.timers.len())
            .field("fired_total", &inner.fired_total)
            .finish()
    }
}

impl TimerScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that fires every `interval`, starting one full
    /// interval from now.
    #[must_use = "dropping the guard cancels the timer immediately"]
    pub fn every(&self, interval: Duration, callback: impl FnMut() + 'static) -> TimerGuard {
        let interval = interval.max(MIN_INTERVAL);
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let next_due = inner.now.checked_add(interval);
        inner.timers.push(TimerEntry {
            id,
            interval,
            next_due,
            callback: Rc::new(RefCell::new(callback)),
        });
        tracing::debug!(
            target: "sfui.timer",
            timer_id = id,
            interval_ms = interval.as_millis() as u64,
            "timer scheduled"
        );
        TimerGuard {
            id,
            scheduler: Rc::downgrade(&self.inner),
        }
    }

    /// Move the virtual clock forward by `dt`, firing due callbacks.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, dt: Duration) -> usize {
        if self.advancing.get() {
            tracing::warn!(target: "sfui.timer", "advance called from a timer callback; ignored");
            return 0;
        }
        let target = self.inner.borrow().now.saturating_add(dt);
        let _advancing = AdvancingGuard::enter(&self.advancing, &self.inner, target);
        let mut fired = 0usize;

        loop {
            let due = {
                let mut inner = self.inner.borrow_mut();
                let next = inner
                    .timers
                    .iter_mut()
                    .filter_map(|t| t.due_by(target).map(|at| (at, t)))
                    .min_by_key(|(at, t)| (*at, t.id));
                match next {
                    Some((at, timer)) => {
                        timer.next_due = at.checked_add(timer.interval);
                        let entry = (timer.id, Rc::clone(&timer.callback));
                        inner.now = at;
                        inner.fired_total += 1;
                        Some(entry)
                    }
                    None => None,
                }
            };
            let Some((id, callback)) = due else {
                break;
            };
            tracing::trace!(target: "sfui.timer", timer_id = id, "timer fired");
            (callback.borrow_mut())();
            fired += 1;
        }

        fired
    }

    /// Current virtual time since the scheduler was created.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of registered (uncancelled) timers.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Total callbacks fired since creation.
    #[must_use]
    pub fn fired_total(&self) -> u64 {
        self.inner.borrow().fired_total
    }
}

/// Marks an `advance` in progress; on drop (normal return or unwind) the
/// clock lands on `target` and the scheduler accepts `advance` again.
struct AdvancingGuard<'a> {
    flag: &'a Cell<bool>,
    inner: &'a RefCell<SchedulerInner>,
    target: Duration,
}

impl<'a> AdvancingGuard<'a> {
    fn enter(flag: &'a Cell<bool>, inner: &'a RefCell<SchedulerInner>, target: Duration) -> Self {
        flag.set(true);
        Self {
            flag,
            inner,
            target,
        }
    }
}

impl Drop for AdvancingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.now = self.target;
        }
        self.flag.set(false);
    }
}

fn cancel(inner: &RefCell<SchedulerInner>, id: TimerId) {
    let mut inner = inner.borrow_mut();
    let before = inner.timers.len();
    inner.timers.retain(|t| t.id != id);
    if inner.timers.len() != before {
        tracing::debug!(target: "sfui.timer", timer_id = id, "timer cancelled");
    }
}

/// RAII handle for a registered timer. Dropping it cancels the timer.
pub struct TimerGuard {
    id: TimerId,
    scheduler: Weak<RefCell<SchedulerInner>>,
}

impl fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerGuard").field("id", &self.id).finish()
    }
}

impl TimerGuard {
    #[must_use]
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancel the timer now.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.scheduler.upgrade() {
            cancel(&inner, self.id);
        }
    }
}

/// Drives a [`TimerScheduler`] from the wall clock.
#[derive(Debug, Clone)]
pub struct RealTimeDriver {
    last: Instant,
}

impl Default for RealTimeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RealTimeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Advance `scheduler` by the wall time elapsed since the last pump.
    pub fn pump(&mut self, scheduler: &TimerScheduler) -> usize {
        self.pump_at(scheduler, Instant::now())
    }

    /// Advance `scheduler` to the wall-clock instant `now`.
    ///
    /// Instants earlier than the previous pump advance nothing.
    pub fn pump_at(&mut self, scheduler: &TimerScheduler, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.last);
        if now > self.last {
            self.last = now;
        }
        scheduler.advance(elapsed)
    }
}
