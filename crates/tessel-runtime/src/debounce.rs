#![forbid(unsafe_code)]

//! Deadline-driven debounce and throttle.
//!
//! A [`Debouncer`] wraps a callback and delays it until calls go quiet for
//! `wait`. There are no timers: the host passes the current time to
//! [`Debouncer::call`] and [`Debouncer::poll`], and asks
//! [`Debouncer::next_deadline`] when it should poll again.
//!
//! # Semantics
//!
//! - Each call records the latest arguments and call time.
//! - With no pending deadline, a call starts one `wait` away, invoking
//!   immediately first when `leading` is set.
//! - When `max_wait` is set, a continuous burst still invokes no later than
//!   `max_wait` after the previous invocation (or the start of the burst).
//! - On expiry the callback fires once with the most recent arguments, if
//!   `trailing` is set and a call arrived since the last invocation.
//!
//! # Invariants
//!
//! - The callback only ever receives the latest arguments; older ones are
//!   dropped, never queued.
//! - At most one trailing invocation per quiet period.
//! - `max_wait`, when set, is never shorter than `wait`.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tessel_core::Instant;
//! use tessel_runtime::debounce::{DebounceConfig, Debouncer};
//!
//! let mut seen = Vec::new();
//! let t0 = Instant::now();
//! let mut debounced = Debouncer::new(
//!     |v: u32| seen.push(v),
//!     Duration::from_millis(100),
//!     DebounceConfig::default(),
//! );
//! debounced.call(1, t0);
//! debounced.call(2, t0 + Duration::from_millis(50));
//! assert!(!debounced.poll(t0 + Duration::from_millis(100)));
//! assert!(debounced.poll(t0 + Duration::from_millis(150)));
//! drop(debounced);
//! assert_eq!(seen, vec![2]);
//! ```

use std::fmt;
use std::time::Duration;

use web_time::Instant;

/// Edge and ceiling options for a [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Invoke at the start of a burst.
    pub leading: bool,
    /// Invoke at the end of a burst.
    pub trailing: bool,
    /// Longest a burst may go without an invocation.
    pub max_wait: Option<Duration>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            leading: false,
            trailing: true,
            max_wait: None,
        }
    }
}

impl DebounceConfig {
    /// Set leading-edge invocation (builder pattern).
    #[must_use]
    pub const fn leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Set trailing-edge invocation (builder pattern).
    #[must_use]
    pub const fn trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Set the burst ceiling (builder pattern).
    #[must_use]
    pub const fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

/// A debounced callback.
pub struct Debouncer<A, F>
where
    F: FnMut(A),
{
    func: F,
    wait: Duration,
    config: DebounceConfig,
    last_args: Option<A>,
    last_call: Option<Instant>,
    last_invoke: Option<Instant>,
    deadline: Option<Instant>,
    invocations: u64,
}

impl<A, F> fmt::Debug for Debouncer<A, F>
where
    F: FnMut(A),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.wait)
            .field("config", &self.config)
            .field("has_args", &self.last_args.is_some())
            .field("deadline", &self.deadline)
            .field("invocations", &self.invocations)
            .finish()
    }
}

impl<A, F> Debouncer<A, F>
where
    F: FnMut(A),
{
    /// Wrap `func` with the given wait and edge options.
    pub fn new(func: F, wait: Duration, config: DebounceConfig) -> Self {
        let config = DebounceConfig {
            max_wait: config.max_wait.map(|max| max.max(wait)),
            ..config
        };
        Self {
            func,
            wait,
            config,
            last_args: None,
            last_call: None,
            last_invoke: None,
            deadline: None,
            invocations: 0,
        }
    }

    /// The quiet period.
    #[inline]
    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Effective options, with `max_wait` raised to at least `wait`.
    #[inline]
    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    /// Record a call with `args` at `now`.
    ///
    /// A burst whose deadline already passed without a poll is settled
    /// first, so the late call opens a fresh burst.
    pub fn call(&mut self, args: A, now: Instant) {
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            self.poll(now);
        }
        let is_invoking = self.should_invoke(now);
        self.last_args = Some(args);
        self.last_call = Some(now);

        if is_invoking {
            if self.deadline.is_none() {
                self.leading_edge(now);
                return;
            }
            if self.config.max_wait.is_some() {
                // Ceiling reached mid-burst: fire now and keep the burst open.
                self.deadline = Some(now + self.wait);
                self.invoke(now);
                return;
            }
        }
        if self.deadline.is_none() {
            self.deadline = Some(now + self.wait);
        }
    }

    /// Fire the pending invocation if its deadline has passed.
    ///
    /// Returns `true` when the callback ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return false,
        }

        if self.should_invoke(now) {
            return self.trailing_edge(now);
        }
        // Calls arrived since the deadline was set; push it out.
        self.deadline = Some(now + self.remaining_wait(now));
        false
    }

    /// Discard the pending call and reset timing state.
    pub fn cancel(&mut self) {
        if self.deadline.is_some() {
            tracing::trace!(target: "tessel.scheduler", "debounce cancelled");
        }
        self.last_args = None;
        self.last_call = None;
        self.last_invoke = None;
        self.deadline = None;
    }

    /// Run the pending call immediately.
    ///
    /// Returns `true` when the callback ran.
    pub fn flush(&mut self, now: Instant) -> bool {
        if self.deadline.is_none() {
            return false;
        }
        self.trailing_edge(now)
    }

    /// Whether a deadline is pending.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the host should next call [`Debouncer::poll`].
    #[inline]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Number of times the callback has run.
    #[inline]
    pub fn invocation_count(&self) -> u64 {
        self.invocations
    }

    fn should_invoke(&self, now: Instant) -> bool {
        let Some(last_call) = self.last_call else {
            return true;
        };
        let since_call = now.saturating_duration_since(last_call);
        if since_call >= self.wait {
            return true;
        }
        match (self.config.max_wait, self.last_invoke) {
            (Some(max_wait), Some(last_invoke)) => {
                now.saturating_duration_since(last_invoke) >= max_wait
            }
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn remaining_wait(&self, now: Instant) -> Duration {
        let since_call = self
            .last_call
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
        let waiting = self.wait.saturating_sub(since_call);
        match self.config.max_wait {
            Some(max_wait) => {
                let since_invoke = self
                    .last_invoke
                    .map_or(Duration::ZERO, |t| now.saturating_duration_since(t));
                waiting.min(max_wait.saturating_sub(since_invoke))
            }
            None => waiting,
        }
    }

    fn leading_edge(&mut self, now: Instant) {
        self.last_invoke = Some(now);
        self.deadline = Some(now + self.wait);
        if self.config.leading {
            self.invoke(now);
        }
    }

    fn trailing_edge(&mut self, now: Instant) -> bool {
        self.deadline = None;
        if self.config.trailing && self.last_args.is_some() {
            return self.invoke(now);
        }
        self.last_args = None;
        false
    }

    fn invoke(&mut self, now: Instant) -> bool {
        let Some(args) = self.last_args.take() else {
            return false;
        };
        self.last_invoke = Some(now);
        self.invocations += 1;
        tracing::trace!(
            target: "tessel.scheduler",
            invocation = self.invocations,
            "debounced call invoked"
        );
        (self.func)(args);
        true
    }
}

/// At most one invocation per `wait`, at both the start and end of the window.
pub fn throttle<A, F>(func: F, wait: Duration) -> Debouncer<A, F>
where
    F: FnMut(A),
{
    Debouncer::new(
        func,
        wait,
        DebounceConfig {
            leading: true,
            trailing: true,
            max_wait: Some(wait),
        },
    )
}

/// Trailing-only debounce with a `2 × wait` ceiling.
///
/// A burst of drag moves collapses to one notification after the pointer
/// rests, while a sustained drag still reports every `2 × wait`.
pub fn layout_debouncer<A, F>(func: F, wait: Duration) -> Debouncer<A, F>
where
    F: FnMut(A),
{
    Debouncer::new(
        func,
        wait,
        DebounceConfig {
            leading: false,
            trailing: true,
            max_wait: Some(wait.saturating_mul(2)),
        },
    )
}

/// Throttle to `fps` invocations per second (`fps` floored at 1).
pub fn animation_throttler<A, F>(func: F, fps: u32) -> Debouncer<A, F>
where
    F: FnMut(A),
{
    let fps = u64::from(fps.max(1));
    throttle(func, Duration::from_nanos(1_000_000_000 / fps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    type Log = Rc<RefCell<Vec<(u64, &'static str)>>>;

    /// Callback that records `(invocation time offset, args)`.
    ///
    /// The time offset is threaded through the args since the callback does
    /// not see `now`.
    fn recorder() -> (Log, impl FnMut((u64, &'static str))) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |entry| sink.borrow_mut().push(entry))
    }

    #[test]
    fn burst_coalesces_to_one_trailing_call() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut d = Debouncer::new(f, ms(200), DebounceConfig::default());

        d.call((0, "a"), t0);
        d.call((50, "b"), t0 + ms(50));
        d.call((100, "c"), t0 + ms(100));

        for t in (0..300).step_by(10) {
            assert!(!d.poll(t0 + ms(t)), "fired early at {t}");
        }
        assert_eq!(d.next_deadline(), Some(t0 + ms(300)));
        assert!(d.poll(t0 + ms(300)));
        assert!(!d.poll(t0 + ms(600)));

        assert_eq!(*log.borrow(), vec![(100, "c")]);
        assert_eq!(d.invocation_count(), 1);
        assert!(!d.is_pending());
    }

    #[test]
    fn latest_args_win_after_short_wait() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut d = Debouncer::new(f, ms(100), DebounceConfig::default());

        d.call((0, "a"), t0);
        d.call((50, "b"), t0 + ms(50));
        assert!(!d.poll(t0 + ms(100)));
        assert!(!d.poll(t0 + ms(149)));
        assert!(d.poll(t0 + ms(150)));
        assert_eq!(*log.borrow(), vec![(50, "b")]);
    }

    #[test]
    fn max_wait_bounds_a_continuous_burst() {
        let t0 = Instant::now();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);
        let mut d = Debouncer::new(
            move |t: u64| sink.borrow_mut().push(t),
            ms(200),
            DebounceConfig::default().max_wait(ms(400)),
        );

        let mut first_fire = None;
        for t in (0..=1000u64).step_by(10) {
            if d.poll(t0 + ms(t)) && first_fire.is_none() {
                first_fire = Some(t);
            }
            d.call(t, t0 + ms(t));
        }
        let first_fire = first_fire.expect("no invocation during the burst");
        assert!(first_fire <= 400, "first invocation at {first_fire}ms");
        // Each invocation carries the latest args at that moment.
        assert!(fired.borrow().windows(2).all(|w| w[0] < w[1]));
        assert!(fired.borrow().len() >= 2);
    }

    #[test]
    fn late_call_settles_the_expired_burst() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut d = Debouncer::new(f, ms(100), DebounceConfig::default());

        d.call((0, "a"), t0);
        // The host missed the poll at 100ms.
        d.call((500, "b"), t0 + ms(500));
        assert_eq!(*log.borrow(), vec![(0, "a")]);
        assert_eq!(d.next_deadline(), Some(t0 + ms(600)));

        assert!(!d.poll(t0 + ms(599)));
        assert!(d.poll(t0 + ms(600)));
        assert_eq!(*log.borrow(), vec![(0, "a"), (500, "b")]);
    }

    #[test]
    fn leading_invokes_immediately() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut d = Debouncer::new(
            f,
            ms(100),
            DebounceConfig::default().leading(true).trailing(false),
        );

        d.call((0, "a"), t0);
        assert_eq!(*log.borrow(), vec![(0, "a")]);
        d.call((10, "b"), t0 + ms(10));
        assert!(!d.poll(t0 + ms(110)));
        // Trailing disabled: "b" was dropped at the end of the burst.
        assert_eq!(log.borrow().len(), 1);
        assert!(!d.is_pending());

        d.call((300, "c"), t0 + ms(300));
        assert_eq!(log.borrow().last(), Some(&(300, "c")));
    }

    #[test]
    fn cancel_discards_pending_call() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut d = Debouncer::new(f, ms(100), DebounceConfig::default());

        d.call((0, "a"), t0);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + ms(500)));
        assert!(!d.flush(t0 + ms(500)));
        assert!(log.borrow().is_empty());

        // Fresh burst after cancel behaves like the first one.
        d.call((600, "b"), t0 + ms(600));
        assert!(d.poll(t0 + ms(700)));
        assert_eq!(*log.borrow(), vec![(600, "b")]);
    }

    #[test]
    fn flush_forces_pending_call() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut d = Debouncer::new(f, ms(100), DebounceConfig::default());

        d.call((0, "a"), t0);
        d.call((20, "b"), t0 + ms(20));
        assert!(d.flush(t0 + ms(30)));
        assert_eq!(*log.borrow(), vec![(20, "b")]);
        assert!(!d.is_pending());
        assert!(!d.poll(t0 + ms(200)));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn throttle_fires_on_both_edges() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut t = throttle(f, ms(100));

        t.call((0, "start"), t0);
        t.call((30, "mid"), t0 + ms(30));
        t.call((60, "end"), t0 + ms(60));
        assert_eq!(*log.borrow(), vec![(0, "start")]);

        assert!(t.poll(t0 + ms(100)));
        assert_eq!(log.borrow().last(), Some(&(60, "end")));
        assert_eq!(t.invocation_count(), 2);
    }

    #[test]
    fn throttle_single_call_fires_once() {
        let t0 = Instant::now();
        let (log, f) = recorder();
        let mut t = throttle(f, ms(100));

        t.call((0, "only"), t0);
        assert!(!t.poll(t0 + ms(100)));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn presets_configure_edges() {
        let layout = layout_debouncer(|_: ()| {}, ms(200));
        assert_eq!(
            layout.config(),
            DebounceConfig {
                leading: false,
                trailing: true,
                max_wait: Some(ms(400)),
            }
        );

        let anim = animation_throttler(|_: ()| {}, 60);
        assert_eq!(anim.wait(), Duration::from_nanos(16_666_666));
        assert!(anim.config().leading);
        assert_eq!(anim.config().max_wait, Some(anim.wait()));

        assert_eq!(animation_throttler(|_: ()| {}, 0).wait(), Duration::from_secs(1));
    }

    #[test]
    fn max_wait_is_raised_to_wait() {
        let d = Debouncer::new(|_: ()| {}, ms(300), DebounceConfig::default().max_wait(ms(100)));
        assert_eq!(d.config().max_wait, Some(ms(300)));
    }
}
