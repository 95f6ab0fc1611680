//! Constants shared across the checkout flow.

use std::time::Duration;

/// How often the countdown recomputes the remaining duration.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Remaining time below which the countdown is considered urgent.
///
/// Presentation-only threshold; behavior never branches on it.
pub const URGENT_THRESHOLD_MS: i64 = 60_000;

/// How long the expired screen is shown before navigating away.
pub const EXPIRED_REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Cancellation id for the armed reservation-expiry timer.
///
/// A single id is used on purpose: at most one reservation is active per
/// cart, so re-arming replaces any stale timer.
pub const RESERVATION_EXPIRY_EFFECT: &str = "reservation-expiry";

/// Name of the single durable entry the cart state is persisted under.
pub const CART_STORAGE_KEY: &str = "cart-state";

/// Fallback message when a failure carries no usable message of its own.
pub const GENERIC_CHECKOUT_ERROR: &str = "Something went wrong. Please try again.";
