//! Checkout flow facade.
//!
//! Wraps the runtime store and exposes the affordances a UI layer needs:
//! begin (with precondition guards), confirm reservation, proceed to
//! payment, and state queries.

use crate::error::CheckoutError;
use crate::flow::actions::CheckoutAction;
use crate::flow::environment::CheckoutEnvironment;
use crate::flow::reducer::CheckoutReducer;
use crate::flow::types::{CheckoutPhase, CheckoutState};
use crate::types::{RaffleId, UserId};
use rifa_core::environment::Clock;
use rifa_runtime::{EffectHandle, Store, StoreError};

/// The store type driving one checkout attempt.
pub type CheckoutStore<C> =
    Store<CheckoutState, CheckoutAction, CheckoutEnvironment<C>, CheckoutReducer<C>>;

/// One user's checkout attempt for one raffle.
///
/// # Example
///
/// ```ignore
/// let flow = CheckoutFlow::begin(env, raffle_id, Some(user_id)).await?;
///
/// flow.confirm_reservation().await?;
/// // ... user reviews the countdown ...
/// flow.proceed_to_payment().await?;
/// ```
pub struct CheckoutFlow<C: Clock> {
    store: CheckoutStore<C>,
}

impl<C> CheckoutFlow<C>
where
    C: Clock + Clone + 'static,
{
    /// Enter the checkout flow.
    ///
    /// Preconditions are guards, not states: checkout requires an
    /// authenticated user and either a non-empty pick set or an
    /// already-active reservation. A violation means the caller should
    /// redirect away; it is never surfaced as an in-flow error.
    ///
    /// If the cart holds a still-active reservation (e.g., restored from
    /// persistence after a reload), the flow re-enters the reserved phase
    /// with the expiry timer re-armed.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotAuthenticated`] without a user
    /// - [`CheckoutError::NothingSelected`] with an empty cart and no
    ///   active reservation
    pub async fn begin(
        env: CheckoutEnvironment<C>,
        raffle_id: RaffleId,
        user: Option<UserId>,
    ) -> Result<Self, CheckoutError> {
        let Some(user_id) = user else {
            return Err(CheckoutError::NotAuthenticated);
        };

        let now = env.clock.now();
        let selected = env.cart.selected_count().await;
        let active = env
            .cart
            .active_reservation()
            .await
            .filter(|reservation| reservation.is_actionable(now));

        if selected == 0 && active.is_none() {
            return Err(CheckoutError::NothingSelected);
        }

        let store = Store::new(
            CheckoutState::new(raffle_id, user_id),
            CheckoutReducer::new(),
            env,
        );
        let flow = Self { store };

        if let Some(reservation) = active {
            tracing::info!(reservation_id = %reservation.id, "Restoring active reservation");
            if let Err(error) = flow
                .store
                .send(CheckoutAction::RestoreReservation { reservation })
                .await
            {
                tracing::warn!(%error, "Failed to restore reservation into flow");
            }
        }

        Ok(flow)
    }

    /// Confirm the pick set and create a reservation.
    ///
    /// Only acted on in the review phase; duplicate confirms while a
    /// request is in flight are ignored by the state machine.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    pub async fn confirm_reservation(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(CheckoutAction::ConfirmReservation).await
    }

    /// Proceed from the reserved phase to payment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
    pub async fn proceed_to_payment(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(CheckoutAction::ConfirmPayment).await
    }

    /// Current phase of the state machine.
    pub async fn phase(&self) -> CheckoutPhase {
        self.store.state(|s| s.phase.clone()).await
    }

    /// Current user-visible error, if any.
    pub async fn error(&self) -> Option<String> {
        self.store.state(|s| s.error.clone()).await
    }

    /// The underlying store, for observers and advanced wiring.
    #[must_use]
    pub const fn store(&self) -> &CheckoutStore<C> {
        &self.store
    }
}
