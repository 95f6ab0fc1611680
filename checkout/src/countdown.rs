//! Reservation countdown timer.
//!
//! Given an absolute expiry instant, the countdown exposes a live
//! remaining-duration value recomputed on a fixed interval and signals a
//! one-time expiry event. The fire-once and stop-on-teardown invariants
//! are structural: the expiry callback is an `FnOnce` invoked after the
//! tick loop breaks, and the loop runs in a task the handle aborts.
//!
//! Re-arming for a new expiry (e.g., a new reservation replacing an old
//! one) is done by cancelling the old handle and starting a fresh
//! countdown; a stale interval never keeps running against the old
//! instant.

use crate::constants::{TICK_INTERVAL, URGENT_THRESHOLD_MS};
use chrono::{DateTime, Utc};
use rifa_core::environment::Clock;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// An expiry value that could not be understood.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid expiry timestamp: {0}")]
pub struct InvalidExpiry(String);

/// Conversion into an absolute expiry instant.
///
/// The countdown accepts either an already-parsed [`DateTime<Utc>`] or an
/// ISO-8601 string as it appears on the wire (`expires_at`).
pub trait IntoExpiry {
    /// Resolve to an absolute instant.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidExpiry`] if the value cannot be parsed.
    fn into_expiry(self) -> Result<DateTime<Utc>, InvalidExpiry>;
}

impl IntoExpiry for DateTime<Utc> {
    fn into_expiry(self) -> Result<DateTime<Utc>, InvalidExpiry> {
        Ok(self)
    }
}

impl IntoExpiry for &str {
    fn into_expiry(self) -> Result<DateTime<Utc>, InvalidExpiry> {
        DateTime::parse_from_rfc3339(self)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| InvalidExpiry(self.to_string()))
    }
}

impl IntoExpiry for String {
    fn into_expiry(self) -> Result<DateTime<Utc>, InvalidExpiry> {
        self.as_str().into_expiry()
    }
}

/// Remaining time until an expiry instant, clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    millis: i64,
}

impl Remaining {
    /// Compute the remaining duration from `now` to `expiry`.
    #[must_use]
    pub fn until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            millis: (expiry - now).num_milliseconds().max(0),
        }
    }

    /// Whole minutes remaining.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        self.millis / 60_000
    }

    /// Seconds remaining within the current minute.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        (self.millis / 1000) % 60
    }

    /// Total remaining milliseconds (already clamped to zero).
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.millis
    }

    /// Whether the expiry instant has been reached.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.millis == 0
    }

    /// Whether the remaining time is under the urgent threshold.
    ///
    /// Used only for presentation (e.g., switching the display to red).
    #[must_use]
    pub const fn is_urgent(self) -> bool {
        self.millis < URGENT_THRESHOLD_MS
    }
}

impl std::fmt::Display for Remaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

/// Handle to a running countdown.
///
/// Dropping the handle (or calling [`cancel`](Self::cancel)) stops the
/// tick loop, so a torn-down view can never receive further ticks or a
/// late expiry callback.
#[derive(Debug)]
pub struct CountdownHandle {
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Stop the countdown.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// Whether the countdown has finished (expired or been cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The countdown timer.
///
/// # Example
///
/// ```ignore
/// let handle = Countdown::start(
///     reservation.expires_at,
///     SystemClock::new(),
///     |remaining| display.set_text(remaining.to_string()),
///     || display.show_expired(),
/// )?;
///
/// // Later, when the view unmounts:
/// handle.cancel();
/// ```
pub struct Countdown;

impl Countdown {
    /// Start a countdown ticking every second.
    ///
    /// On activation, and on every tick thereafter, the remaining duration
    /// is recomputed and handed to `on_tick`. When it reaches zero,
    /// `on_expire` is invoked exactly once and the countdown stops. An
    /// expiry already in the past reports zero on the first tick and fires
    /// `on_expire` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidExpiry`] if the expiry value cannot be parsed.
    pub fn start<C, F, G>(
        expiry: impl IntoExpiry,
        clock: C,
        on_tick: F,
        on_expire: G,
    ) -> Result<CountdownHandle, InvalidExpiry>
    where
        C: Clock + 'static,
        F: FnMut(Remaining) + Send + 'static,
        G: FnOnce() + Send + 'static,
    {
        Self::start_with_interval(expiry, clock, TICK_INTERVAL, on_tick, on_expire)
    }

    /// Start a countdown with a custom tick interval.
    ///
    /// Production uses [`Countdown::start`]; the interval parameter exists
    /// so tests can tick faster than once a second.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidExpiry`] if the expiry value cannot be parsed.
    pub fn start_with_interval<C, F, G>(
        expiry: impl IntoExpiry,
        clock: C,
        interval: Duration,
        mut on_tick: F,
        on_expire: G,
    ) -> Result<CountdownHandle, InvalidExpiry>
    where
        C: Clock + 'static,
        F: FnMut(Remaining) + Send + 'static,
        G: FnOnce() + Send + 'static,
    {
        let expiry = expiry.into_expiry()?;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let remaining = Remaining::until(expiry, clock.now());
                on_tick(remaining);
                if remaining.is_zero() {
                    break;
                }
            }

            tracing::debug!(%expiry, "Countdown reached zero");
            on_expire();
        });

        Ok(CountdownHandle { task })
    }
}
