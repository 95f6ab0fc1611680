//! Backend collaborators of the checkout flow.
//!
//! This module defines traits for the external dependencies the flow
//! talks to. Providers are **interfaces**, not implementations: the
//! reducer depends on these traits, and the runtime wires in concrete
//! implementations.
//!
//! - `ReservationGateway`: atomically converts a set of selected numbers
//!   into a time-boxed reservation (or reports why it cannot)
//! - `PaymentGateway`: turns a reservation into an external-processor
//!   redirect URL
//! - `Navigator`: the full-browser-navigation seam used for the
//!   redirect-based payment flow and the post-expiry redirect
//!
//! This enables:
//! - **Testing**: scripted mocks, recording navigators
//! - **Production**: HTTP providers against the backend API

use crate::error::GatewayError;
use crate::types::{
    NumberId, Payment, PaymentIntent, RaffleId, Reservation, ReservationId, SessionToken,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub mod http;

pub use http::{HttpPaymentGateway, HttpReservationGateway};

/// Boxed future returned by gateway trait methods.
pub type GatewayFuture<T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send>>;

// ═══════════════════════════════════════════════════════════════════════
// Wire Shapes
// ═══════════════════════════════════════════════════════════════════════

/// Request body of `POST /reservations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    /// Raffle the numbers belong to.
    pub raffle_id: RaffleId,

    /// Numbers to reserve.
    pub number_ids: Vec<NumberId>,

    /// Client-generated idempotency token, fresh per attempt.
    pub session_id: SessionToken,
}

/// Request body of `POST /payments/intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Reservation being paid.
    pub reservation_id: ReservationId,

    /// Where the processor sends the browser after approval.
    pub return_url: String,

    /// Where the processor sends the browser after cancellation.
    pub cancel_url: String,
}

/// Response body of `POST /payments/intent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIntentResponse {
    /// Backend payment record.
    pub payment: Payment,

    /// External processor handle; `client_secret` is the redirect URL.
    pub payment_intent: PaymentIntent,
}

// ═══════════════════════════════════════════════════════════════════════
// Provider Traits
// ═══════════════════════════════════════════════════════════════════════

/// Backend reservation endpoint.
pub trait ReservationGateway: Send + Sync {
    /// Atomically convert selected numbers into a time-boxed reservation.
    ///
    /// Fails if the numbers are no longer available, the raffle is not
    /// active, or the numbers limit is exceeded.
    fn create_reservation(&self, request: CreateReservationRequest) -> GatewayFuture<Reservation>;

    /// Fetch the current state of a reservation (used for polling).
    fn get_reservation(&self, id: ReservationId) -> GatewayFuture<Reservation>;
}

/// Backend payment-intent endpoint.
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for a reservation.
    ///
    /// The response carries the external processor's approval URL; the
    /// caller performs a full browser navigation to it.
    fn create_intent(&self, request: CreateIntentRequest) -> GatewayFuture<CreateIntentResponse>;
}

/// Full-browser navigation seam.
///
/// The checkout flow never embeds payment UI: reaching the processor and
/// leaving an expired checkout are both full navigations through this
/// trait. Embedding UIs provide their own implementation; headless runs
/// use [`LogNavigator`].
pub trait Navigator: Send + Sync {
    /// Navigate the browser to `url`, abandoning the current view.
    fn redirect(&self, url: &str);
}

/// Navigator that only records the intent in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl LogNavigator {
    /// Create a new logging navigator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Navigator for LogNavigator {
    fn redirect(&self, url: &str) {
        tracing::info!(url, "Browser redirect requested");
    }
}
