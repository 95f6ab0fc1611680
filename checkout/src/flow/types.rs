//! Checkout flow state types.

use crate::types::{RaffleId, Reservation, SessionToken, UserId};
use serde::{Deserialize, Serialize};

/// Phase of the checkout state machine.
///
/// A closed tagged union so illegal combinations are unrepresentable:
/// the in-flight phases carry exactly the data that exists at that point
/// and nothing more (e.g., `Reserving` has a session token but no
/// reservation yet).
///
/// ```text
/// Review ──confirm──► Reserving ──ok──► Reserved ──confirm──► CreatingPayment ──ok──► PaymentReady
///   ▲                    │                 ▲                      │                     (redirect)
///   └──────failure───────┘                 └───────failure────────┘
///                                          │ timer                │ timer
///                                          ▼                      ▼
///                                        Expired ◄────────────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CheckoutPhase {
    /// Reviewing the pick set; "Create Reservation" is offered.
    #[default]
    Review,

    /// Reservation request in flight; UI disabled.
    Reserving {
        /// Idempotency token this attempt was sent with.
        session_id: SessionToken,
    },

    /// Reservation created and expiry timer armed; "Proceed to Payment".
    Reserved {
        /// The active reservation.
        reservation: Reservation,
    },

    /// Payment-intent request in flight; UI disabled.
    CreatingPayment {
        /// The reservation being paid.
        reservation: Reservation,
    },

    /// Intent created; the browser is being sent to the processor.
    ///
    /// Terminal for this flow: the redirect abandons the page.
    PaymentReady {
        /// External processor approval URL.
        redirect_url: String,
    },

    /// The reservation timed out. Terminal; navigates away shortly.
    Expired,
}

impl CheckoutPhase {
    /// Stable name of the phase, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Reserving { .. } => "reserving",
            Self::Reserved { .. } => "reserved",
            Self::CreatingPayment { .. } => "creating_payment",
            Self::PaymentReady { .. } => "payment_ready",
            Self::Expired => "expired",
        }
    }
}

/// State of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutState {
    /// Raffle being checked out.
    pub raffle_id: RaffleId,

    /// Authenticated user driving the checkout.
    pub user_id: UserId,

    /// Current phase of the state machine.
    pub phase: CheckoutPhase,

    /// User-visible message from the most recent failure, if any.
    ///
    /// Cleared whenever a new attempt starts.
    pub error: Option<String>,
}

impl CheckoutState {
    /// Start a fresh checkout in the review phase.
    #[must_use]
    pub const fn new(raffle_id: RaffleId, user_id: UserId) -> Self {
        Self {
            raffle_id,
            user_id,
            phase: CheckoutPhase::Review,
            error: None,
        }
    }
}
