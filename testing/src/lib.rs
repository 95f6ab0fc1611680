//! # Rifa Testing
//!
//! Testing utilities and helpers for the rifa workspace.
//!
//! This crate provides deterministic clock implementations of the
//! `rifa_core::environment::Clock` trait so reducers, stores, and timers
//! can be tested at memory speed without real waiting.
//!
//! ## Example
//!
//! ```ignore
//! use rifa_testing::test_clock;
//! use rifa_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_checkout_flow() {
//!     let env = test_environment(test_clock());
//!     let store = Store::new(CheckoutState::default(), CheckoutReducer::new(), env);
//!
//!     store.send(CheckoutAction::ConfirmReservation).await?;
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use rifa_core::environment::Clock;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use rifa_testing::mocks::FixedClock;
    /// use rifa_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Manually advanceable clock for tests that exercise the passage of time
    ///
    /// Unlike [`FixedClock`], the reported time moves when the test says so.
    /// Clones share the same underlying instant, so a clock handed to a
    /// timer or store can be advanced from the test body.
    ///
    /// # Example
    ///
    /// ```
    /// use rifa_testing::mocks::SteppingClock;
    /// use rifa_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = SteppingClock::new(Utc::now());
    /// let start = clock.now();
    /// clock.advance(Duration::seconds(30));
    /// assert_eq!(clock.now() - start, Duration::seconds(30));
    /// ```
    #[derive(Debug, Clone)]
    pub struct SteppingClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl SteppingClock {
        /// Create a new stepping clock starting at the given time
        #[must_use]
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(start)),
            }
        }

        /// Advance the clock by the given duration
        pub fn advance(&self, by: Duration) {
            #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
            let mut time = self.time.lock().unwrap();
            *time += by;
        }

        /// Jump the clock to an absolute instant
        pub fn set(&self, to: DateTime<Utc>) {
            #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
            let mut time = self.time.lock().unwrap();
            *time = to;
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
            let time = self.time.lock().unwrap();
            *time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SteppingClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn stepping_clock_advances_shared_instant() {
        let clock = SteppingClock::new(test_clock().now());
        let observer = clock.clone();
        let start = observer.now();

        clock.advance(Duration::seconds(65));

        assert_eq!(observer.now() - start, Duration::seconds(65));
    }

    #[test]
    fn stepping_clock_set_jumps_to_instant() {
        let clock = SteppingClock::new(test_clock().now());
        let target = test_clock().now() + Duration::minutes(10);

        clock.set(target);

        assert_eq!(clock.now(), target);
    }
}
