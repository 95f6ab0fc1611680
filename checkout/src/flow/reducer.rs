//! Checkout flow reducer.
//!
//! Drives the linear state machine `review → reserving → reserved →
//! creating_payment → payment_ready`, with `expired` absorbing from any
//! phase the timer can fire in, and rollback edges on failure
//! (reserving → review, creating_payment → reserved) so the user can
//! retry without losing context.
//!
//! Every backend call site has an explicit failure branch: no error
//! leaves the reducer, and an in-flight phase never accepts a second
//! request of the same kind.

use crate::constants::{EXPIRED_REDIRECT_DELAY, RESERVATION_EXPIRY_EFFECT};
use crate::flow::actions::CheckoutAction;
use crate::flow::environment::CheckoutEnvironment;
use crate::flow::types::{CheckoutPhase, CheckoutState};
use crate::providers::{CreateIntentRequest, CreateReservationRequest};
use crate::types::{Reservation, SessionToken};
use chrono::{DateTime, Utc};
use rifa_core::effect::{Effect, EffectId};
use rifa_core::environment::Clock;
use rifa_core::reducer::Reducer;
use rifa_core::{SmallVec, smallvec};
use std::sync::Arc;

/// Reducer for the checkout state machine.
///
/// Generic over the Clock type C to work with any clock implementation.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutReducer<C> {
    _phantom: std::marker::PhantomData<C>,
}

impl<C> CheckoutReducer<C> {
    /// Create a new checkout reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<C> Default for CheckoutReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Arm the expiry timer for a reservation.
///
/// The delay is computed against the injected clock; an expiry already in
/// the past collapses to a zero delay and fires immediately. The timer is
/// cancellable under a single well-known id: re-arming (a new reservation
/// replacing an old one) aborts the stale timer, so no interval keeps
/// running against the old instant.
fn expiry_timer(reservation: &Reservation, now: DateTime<Utc>) -> Effect<CheckoutAction> {
    let until_expiry = (reservation.expires_at - now).to_std().unwrap_or_default();

    Effect::Delay {
        duration: until_expiry,
        action: Box::new(CheckoutAction::ReservationExpired),
    }
    .cancellable(EffectId::new(RESERVATION_EXPIRY_EFFECT))
}

impl<C: Clock> Reducer for CheckoutReducer<C> {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment<C>;

    #[allow(clippy::too_many_lines)] // One arm per state-machine edge
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // ConfirmReservation: review → reserving
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::ConfirmReservation => {
                if !matches!(state.phase, CheckoutPhase::Review) {
                    tracing::debug!(
                        phase = state.phase.name(),
                        "Ignoring ConfirmReservation outside review"
                    );
                    return smallvec![Effect::None];
                }

                // Fresh token per attempt: a retry after a transient failure
                // is never mistaken for a duplicate of the earlier attempt.
                let session_id = SessionToken::generate();
                state.phase = CheckoutPhase::Reserving { session_id };
                state.error = None;

                let cart = env.cart.clone();
                let gateway = Arc::clone(&env.reservations);
                let raffle_id = state.raffle_id;

                smallvec![Effect::Future(Box::pin(async move {
                    let number_ids = cart.selected_ids().await;
                    let request = CreateReservationRequest {
                        raffle_id,
                        number_ids,
                        session_id,
                    };

                    match gateway.create_reservation(request).await {
                        Ok(reservation) => {
                            Some(CheckoutAction::ReservationCreated { reservation })
                        },
                        Err(error) => Some(CheckoutAction::ReservationFailed {
                            message: error.user_message(),
                        }),
                    }
                }))]
            },

            // ═══════════════════════════════════════════════════════════════
            // ReservationCreated: reserving → reserved
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::ReservationCreated { reservation } => {
                if !matches!(state.phase, CheckoutPhase::Reserving { .. }) {
                    tracing::debug!(
                        phase = state.phase.name(),
                        "Dropping stale ReservationCreated"
                    );
                    return smallvec![Effect::None];
                }

                tracing::info!(
                    reservation_id = %reservation.id,
                    expires_at = %reservation.expires_at,
                    "Reservation created"
                );

                let timer = expiry_timer(&reservation, env.clock.now());
                state.phase = CheckoutPhase::Reserved {
                    reservation: reservation.clone(),
                };
                state.error = None;

                // The picks graduate into the reservation in the cart store.
                let cart = env.cart.clone();
                smallvec![
                    Effect::Future(Box::pin(async move {
                        cart.set_reservation(reservation).await;
                        None
                    })),
                    timer,
                ]
            },

            // ═══════════════════════════════════════════════════════════════
            // RestoreReservation: review → reserved (rehydration after reload)
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::RestoreReservation { reservation } => {
                let now = env.clock.now();
                if !matches!(state.phase, CheckoutPhase::Review)
                    || !reservation.is_actionable(now)
                {
                    tracing::debug!(
                        phase = state.phase.name(),
                        "Ignoring RestoreReservation"
                    );
                    return smallvec![Effect::None];
                }

                let timer = expiry_timer(&reservation, now);
                state.phase = CheckoutPhase::Reserved { reservation };
                smallvec![timer]
            },

            // ═══════════════════════════════════════════════════════════════
            // ReservationFailed: reserving → review (rollback, retryable)
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::ReservationFailed { message } => {
                if !matches!(state.phase, CheckoutPhase::Reserving { .. }) {
                    return smallvec![Effect::None];
                }

                tracing::warn!(%message, "Reservation attempt failed");
                state.phase = CheckoutPhase::Review;
                state.error = Some(message);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // ConfirmPayment: reserved → creating_payment
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::ConfirmPayment => {
                let CheckoutPhase::Reserved { reservation } = &state.phase else {
                    tracing::debug!(
                        phase = state.phase.name(),
                        "Ignoring ConfirmPayment outside reserved"
                    );
                    return smallvec![Effect::None];
                };

                let reservation = reservation.clone();
                let request = CreateIntentRequest {
                    reservation_id: reservation.id,
                    return_url: env.urls.return_url.clone(),
                    cancel_url: env.urls.cancel_url.clone(),
                };

                state.phase = CheckoutPhase::CreatingPayment { reservation };
                state.error = None;

                let gateway = Arc::clone(&env.payments);
                smallvec![Effect::Future(Box::pin(async move {
                    match gateway.create_intent(request).await {
                        Ok(response) => Some(CheckoutAction::PaymentIntentCreated {
                            redirect_url: response.payment_intent.client_secret,
                        }),
                        Err(error) => Some(CheckoutAction::PaymentFailed {
                            message: error.user_message(),
                        }),
                    }
                }))]
            },

            // ═══════════════════════════════════════════════════════════════
            // PaymentIntentCreated: creating_payment → payment_ready + redirect
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::PaymentIntentCreated { redirect_url } => {
                if !matches!(state.phase, CheckoutPhase::CreatingPayment { .. }) {
                    tracing::debug!(
                        phase = state.phase.name(),
                        "Dropping stale PaymentIntentCreated"
                    );
                    return smallvec![Effect::None];
                }

                tracing::info!("Payment intent created, redirecting to processor");
                state.phase = CheckoutPhase::PaymentReady {
                    redirect_url: redirect_url.clone(),
                };

                let navigator = Arc::clone(&env.navigator);
                smallvec![
                    Effect::Cancel(EffectId::new(RESERVATION_EXPIRY_EFFECT)),
                    Effect::Future(Box::pin(async move {
                        navigator.redirect(&redirect_url);
                        None
                    })),
                ]
            },

            // ═══════════════════════════════════════════════════════════════
            // PaymentFailed: creating_payment → reserved (rollback, retryable)
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::PaymentFailed { message } => {
                let CheckoutPhase::CreatingPayment { reservation } = &state.phase else {
                    return smallvec![Effect::None];
                };

                tracing::warn!(%message, "Payment intent attempt failed");
                let reservation = reservation.clone();
                state.phase = CheckoutPhase::Reserved { reservation };
                state.error = Some(message);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // ReservationExpired: reserved | creating_payment → expired
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::ReservationExpired => match state.phase {
                CheckoutPhase::Reserved { .. } | CheckoutPhase::CreatingPayment { .. } => {
                    tracing::info!("Reservation expired");
                    state.phase = CheckoutPhase::Expired;
                    state.error = None;

                    // The numbers were released server-side; offering them
                    // for retry would only fail. Clear both halves of the
                    // cart, then navigate away after the grace delay.
                    let cart = env.cart.clone();
                    smallvec![
                        Effect::Future(Box::pin(async move {
                            cart.clear_reservation().await;
                            cart.clear_numbers().await;
                            None
                        })),
                        Effect::Delay {
                            duration: EXPIRED_REDIRECT_DELAY,
                            action: Box::new(CheckoutAction::ExpiredRedirectDue),
                        },
                    ]
                },
                // Re-entering expired (late ticks, replayed timers) is a no-op.
                _ => smallvec![Effect::None],
            },

            // ═══════════════════════════════════════════════════════════════
            // ExpiredRedirectDue: leave the expired screen
            // ═══════════════════════════════════════════════════════════════
            CheckoutAction::ExpiredRedirectDue => {
                if !matches!(state.phase, CheckoutPhase::Expired) {
                    return smallvec![Effect::None];
                }

                let navigator = Arc::clone(&env.navigator);
                let target = env.urls.expired_redirect.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    navigator.redirect(&target);
                    None
                }))]
            },
        }
    }
}
