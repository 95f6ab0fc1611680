//! Unit tests for the checkout reducer.
//!
//! These drive the reducer directly (no store) to verify every
//! state-machine edge: the linear happy path, rollback on failure,
//! absorbing expiry, and the idempotency token discipline.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use super::*;
use crate::cart::{CartStore, InMemoryStorage};
use crate::flow::environment::{CheckoutEnvironment, CheckoutUrls};
use crate::mocks::{MockPaymentGateway, MockReservationGateway, RecordingNavigator};
use crate::types::{
    Money, NumberId, RaffleId, Reservation, ReservationId, ReservationStatus, SessionToken, UserId,
};
use chrono::{DateTime, Duration, Utc};
use rifa_core::effect::Effect;
use rifa_core::environment::Clock;
use rifa_core::reducer::Reducer;
use rifa_testing::{FixedClock, test_clock};
use std::sync::Arc;

fn test_env() -> CheckoutEnvironment<FixedClock> {
    CheckoutEnvironment::new(
        test_clock(),
        Arc::new(MockReservationGateway::new()),
        Arc::new(MockPaymentGateway::new()),
        Arc::new(RecordingNavigator::new()),
        CartStore::load(Arc::new(InMemoryStorage::new())),
        CheckoutUrls {
            return_url: "http://localhost/return".to_string(),
            cancel_url: "http://localhost/cancel".to_string(),
            expired_redirect: "http://localhost/raffles".to_string(),
        },
    )
}

fn pending_reservation(expires_at: DateTime<Utc>) -> Reservation {
    Reservation {
        id: ReservationId::new(),
        raffle_id: RaffleId::new(),
        user_id: UserId::new(),
        number_ids: vec![NumberId::new(), NumberId::new()],
        status: ReservationStatus::Pending,
        session_id: SessionToken::generate(),
        total_amount: Money::from_cents(1000),
        expires_at,
        created_at: expires_at - Duration::minutes(10),
        updated_at: expires_at - Duration::minutes(10),
    }
}

fn fresh_state() -> CheckoutState {
    CheckoutState::new(RaffleId::new(), UserId::new())
}

// ============================================================================
// Reservation Edges
// ============================================================================

#[test]
fn confirm_reservation_enters_reserving_with_fresh_token() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    let effects = reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);

    assert!(matches!(state.phase, CheckoutPhase::Reserving { .. }));
    assert_eq!(state.error, None);
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Future(_)));
}

#[test]
fn confirm_reservation_is_ignored_while_in_flight() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);
    let first_session = match &state.phase {
        CheckoutPhase::Reserving { session_id } => *session_id,
        other => panic!("expected reserving, got {other:?}"),
    };

    // A second confirm while the request is in flight must not start
    // another call or rotate the token.
    let effects = reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);

    assert!(matches!(effects[0], Effect::None));
    assert!(
        matches!(&state.phase, CheckoutPhase::Reserving { session_id } if *session_id == first_session)
    );
}

#[test]
fn consecutive_attempts_generate_distinct_session_tokens() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);
    let first = match &state.phase {
        CheckoutPhase::Reserving { session_id } => *session_id,
        other => panic!("expected reserving, got {other:?}"),
    };

    // First attempt fails, user retries.
    reducer.reduce(
        &mut state,
        CheckoutAction::ReservationFailed {
            message: "Numbers no longer available".to_string(),
        },
        &env,
    );
    reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);
    let second = match &state.phase {
        CheckoutPhase::Reserving { session_id } => *session_id,
        other => panic!("expected reserving, got {other:?}"),
    };

    assert_ne!(first, second);
}

#[test]
fn reservation_created_enters_reserved_and_arms_timer() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);

    let reservation = pending_reservation(env.clock.now() + Duration::minutes(10));
    let effects = reducer.reduce(
        &mut state,
        CheckoutAction::ReservationCreated {
            reservation: reservation.clone(),
        },
        &env,
    );

    assert!(
        matches!(&state.phase, CheckoutPhase::Reserved { reservation: r } if r.id == reservation.id)
    );
    // Cart graduation plus the cancellable expiry timer.
    assert_eq!(effects.len(), 2);
    assert!(matches!(effects[0], Effect::Future(_)));
    match &effects[1] {
        Effect::Cancellable { effect, .. } => {
            let Effect::Delay { duration, .. } = effect.as_ref() else {
                panic!("expected delayed expiry under the cancellable, got {effect:?}");
            };
            assert_eq!(duration.as_secs(), 600);
        },
        other => panic!("expected cancellable timer, got {other:?}"),
    }
}

#[test]
fn reservation_failure_rolls_back_to_review_with_message() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    reducer.reduce(&mut state, CheckoutAction::ConfirmReservation, &env);
    let effects = reducer.reduce(
        &mut state,
        CheckoutAction::ReservationFailed {
            message: "Raffle not active".to_string(),
        },
        &env,
    );

    assert_eq!(state.phase, CheckoutPhase::Review);
    assert_eq!(state.error, Some("Raffle not active".to_string()));
    assert!(matches!(effects[0], Effect::None));
}

#[test]
fn stale_reservation_created_is_dropped() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    let reservation = pending_reservation(env.clock.now() + Duration::minutes(10));
    let effects = reducer.reduce(
        &mut state,
        CheckoutAction::ReservationCreated { reservation },
        &env,
    );

    assert_eq!(state.phase, CheckoutPhase::Review);
    assert!(matches!(effects[0], Effect::None));
}

#[test]
fn restore_reservation_rearms_timer_for_actionable_reservation() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    let reservation = pending_reservation(env.clock.now() + Duration::minutes(5));
    let effects = reducer.reduce(
        &mut state,
        CheckoutAction::RestoreReservation { reservation },
        &env,
    );

    assert!(matches!(state.phase, CheckoutPhase::Reserved { .. }));
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Cancellable { .. }));
}

#[test]
fn restore_reservation_ignores_lapsed_reservation() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    let reservation = pending_reservation(env.clock.now() - Duration::minutes(1));
    let effects = reducer.reduce(
        &mut state,
        CheckoutAction::RestoreReservation { reservation },
        &env,
    );

    assert_eq!(state.phase, CheckoutPhase::Review);
    assert!(matches!(effects[0], Effect::None));
}

// ============================================================================
// Payment Edges
// ============================================================================

#[test]
fn confirm_payment_enters_creating_payment() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    state.phase = CheckoutPhase::Reserved {
        reservation: pending_reservation(env.clock.now() + Duration::minutes(10)),
    };

    let effects = reducer.reduce(&mut state, CheckoutAction::ConfirmPayment, &env);

    assert!(matches!(state.phase, CheckoutPhase::CreatingPayment { .. }));
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::Future(_)));
}

#[test]
fn confirm_payment_is_ignored_while_intent_in_flight() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    state.phase = CheckoutPhase::CreatingPayment {
        reservation: pending_reservation(env.clock.now() + Duration::minutes(10)),
    };

    let effects = reducer.reduce(&mut state, CheckoutAction::ConfirmPayment, &env);
    assert!(matches!(effects[0], Effect::None));
}

#[test]
fn payment_intent_created_redirects_and_disarms_timer() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    state.phase = CheckoutPhase::CreatingPayment {
        reservation: pending_reservation(env.clock.now() + Duration::minutes(10)),
    };

    let effects = reducer.reduce(
        &mut state,
        CheckoutAction::PaymentIntentCreated {
            redirect_url: "https://processor.example.com/approve/abc".to_string(),
        },
        &env,
    );

    assert!(matches!(
        &state.phase,
        CheckoutPhase::PaymentReady { redirect_url }
            if redirect_url == "https://processor.example.com/approve/abc"
    ));
    assert_eq!(effects.len(), 2);
    assert!(matches!(effects[0], Effect::Cancel(_)));
}

#[test]
fn payment_failure_rolls_back_to_reserved_with_message() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    let reservation = pending_reservation(env.clock.now() + Duration::minutes(10));
    state.phase = CheckoutPhase::CreatingPayment {
        reservation: reservation.clone(),
    };

    reducer.reduce(
        &mut state,
        CheckoutAction::PaymentFailed {
            message: "Processor unavailable".to_string(),
        },
        &env,
    );

    assert!(
        matches!(&state.phase, CheckoutPhase::Reserved { reservation: r } if r.id == reservation.id)
    );
    assert_eq!(state.error, Some("Processor unavailable".to_string()));
}

// ============================================================================
// Expiry Edges
// ============================================================================

#[test]
fn expiry_in_reserved_enters_expired_with_cleanup_and_redirect_delay() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    state.phase = CheckoutPhase::Reserved {
        reservation: pending_reservation(env.clock.now() + Duration::minutes(10)),
    };

    let effects = reducer.reduce(&mut state, CheckoutAction::ReservationExpired, &env);

    assert_eq!(state.phase, CheckoutPhase::Expired);
    assert_eq!(effects.len(), 2);
    assert!(matches!(effects[0], Effect::Future(_)));
    assert!(matches!(effects[1], Effect::Delay { .. }));
}

#[test]
fn expiry_during_payment_creation_also_enters_expired() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    state.phase = CheckoutPhase::CreatingPayment {
        reservation: pending_reservation(env.clock.now() + Duration::minutes(10)),
    };

    reducer.reduce(&mut state, CheckoutAction::ReservationExpired, &env);
    assert_eq!(state.phase, CheckoutPhase::Expired);
}

#[test]
fn reentering_expired_is_a_noop() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    state.phase = CheckoutPhase::Expired;
    let effects = reducer.reduce(&mut state, CheckoutAction::ReservationExpired, &env);

    assert_eq!(state.phase, CheckoutPhase::Expired);
    assert!(matches!(effects[0], Effect::None));
}

#[test]
fn expiry_in_review_is_ignored() {
    let reducer = CheckoutReducer::new();
    let mut state = fresh_state();
    let env = test_env();

    let effects = reducer.reduce(&mut state, CheckoutAction::ReservationExpired, &env);

    assert_eq!(state.phase, CheckoutPhase::Review);
    assert!(matches!(effects[0], Effect::None));
}
