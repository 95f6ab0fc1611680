//! Environment for the checkout reducer.

use crate::cart::CartStore;
use crate::config::CheckoutConfig;
use crate::providers::{Navigator, PaymentGateway, ReservationGateway};
use rifa_core::environment::Clock;
use std::sync::Arc;

/// URLs the flow hands to the backend and the navigator.
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Where the processor returns the browser after approval.
    pub return_url: String,

    /// Where the processor returns the browser after cancellation.
    pub cancel_url: String,

    /// Where the client goes after a reservation expires.
    pub expired_redirect: String,
}

impl CheckoutUrls {
    /// Build the URL set from configuration.
    #[must_use]
    pub fn from_config(config: &CheckoutConfig) -> Self {
        Self {
            return_url: config.return_url.clone(),
            cancel_url: config.cancel_url.clone(),
            expired_redirect: config.expired_redirect_url.clone(),
        }
    }
}

/// Dependencies injected into the checkout reducer.
///
/// # Type Parameters
///
/// - `C`: Clock implementation (system clock in production, deterministic
///   clocks in tests)
#[derive(Clone)]
pub struct CheckoutEnvironment<C: Clock> {
    /// Clock for expiry computation.
    pub clock: C,

    /// Backend reservation endpoint.
    pub reservations: Arc<dyn ReservationGateway>,

    /// Backend payment-intent endpoint.
    pub payments: Arc<dyn PaymentGateway>,

    /// Full-browser navigation seam.
    pub navigator: Arc<dyn Navigator>,

    /// The shared, persisted cart.
    pub cart: CartStore,

    /// Redirect and return URLs.
    pub urls: CheckoutUrls,
}

impl<C: Clock> CheckoutEnvironment<C> {
    /// Create a new checkout environment.
    #[must_use]
    pub fn new(
        clock: C,
        reservations: Arc<dyn ReservationGateway>,
        payments: Arc<dyn PaymentGateway>,
        navigator: Arc<dyn Navigator>,
        cart: CartStore,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            clock,
            reservations,
            payments,
            navigator,
            cart,
            urls,
        }
    }
}
