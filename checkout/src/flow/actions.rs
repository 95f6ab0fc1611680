//! Checkout flow actions.

use crate::types::Reservation;
use serde::{Deserialize, Serialize};

/// Inputs to the checkout state machine.
///
/// User intents (`Confirm*`) and effect completion events. Completion
/// events arriving in a phase that no longer expects them are ignored —
/// this is what makes timer expiry and stale responses safe to replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckoutAction {
    /// User confirmed the pick set; create a reservation.
    ConfirmReservation,

    /// Re-enter the reserved phase with a persisted, still-active
    /// reservation (after a reload).
    RestoreReservation {
        /// The restored reservation.
        reservation: Reservation,
    },

    /// The backend created the reservation.
    ReservationCreated {
        /// The created reservation.
        reservation: Reservation,
    },

    /// The reservation request failed.
    ReservationFailed {
        /// User-visible message.
        message: String,
    },

    /// User confirmed payment; create a payment intent.
    ConfirmPayment,

    /// The backend created the payment intent.
    PaymentIntentCreated {
        /// External processor approval URL.
        redirect_url: String,
    },

    /// The payment-intent request failed.
    PaymentFailed {
        /// User-visible message.
        message: String,
    },

    /// The reservation expiry timer fired.
    ReservationExpired,

    /// The post-expiry grace delay elapsed; navigate away.
    ExpiredRedirectDue,
}
