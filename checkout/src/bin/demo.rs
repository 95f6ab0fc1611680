//! Headless walkthrough of the checkout flow against mock gateways.
//!
//! Runs the happy path end to end: pick two numbers, reserve them, watch
//! the countdown, create a payment intent, and observe the redirect.

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use rifa_checkout::mocks::{MockPaymentGateway, MockReservationGateway, RecordingNavigator};
use rifa_checkout::{
    cart::InMemoryStorage, CartStore, CheckoutEnvironment, CheckoutFlow, CheckoutUrls, Countdown,
    CheckoutConfig, Money, NumberId, RaffleId, Reservation, ReservationId, ReservationStatus,
    SelectedNumber, SessionToken, UserId,
};
use rifa_runtime::SystemClock;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = CheckoutConfig::from_env();
    let raffle_id = RaffleId::new();
    let user_id = UserId::new();

    // Browsing: pick two numbers into the (in-memory) cart.
    let cart = CartStore::load(Arc::new(InMemoryStorage::new()));
    cart.set_current_raffle(raffle_id).await;
    for display in ["0042", "0117"] {
        cart.add_number(SelectedNumber {
            id: NumberId::new(),
            display_number: display.to_string(),
        })
        .await;
    }
    tracing::info!(
        selected = cart.selected_count().await,
        total_cents = cart.total_amount(Money::from_cents(500)).await.cents(),
        "Cart ready"
    );

    // Script the backend.
    let reservations = MockReservationGateway::new();
    let payments = MockPaymentGateway::new();
    let navigator = RecordingNavigator::new();

    let expires_at = Utc::now() + ChronoDuration::seconds(90);
    let reservation_id = ReservationId::new();
    reservations.enqueue(Ok(Reservation {
        id: reservation_id,
        raffle_id,
        user_id,
        number_ids: cart.selected_ids().await,
        status: ReservationStatus::Pending,
        session_id: SessionToken::generate(),
        total_amount: Money::from_cents(1000),
        expires_at,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }));
    payments.enqueue_redirect(reservation_id, "https://processor.example.com/approve/demo");

    let env = CheckoutEnvironment::new(
        SystemClock::new(),
        Arc::new(reservations),
        Arc::new(payments),
        Arc::new(navigator.clone()),
        cart.clone(),
        CheckoutUrls::from_config(&config),
    );

    // Checkout.
    let flow = CheckoutFlow::begin(env, raffle_id, Some(user_id)).await?;

    let mut handle = flow.confirm_reservation().await?;
    handle.wait_with_timeout(Duration::from_secs(5)).await?;
    tracing::info!(phase = flow.phase().await.name(), "Reservation step done");

    // Watch the countdown for a few ticks.
    let countdown = Countdown::start(
        expires_at,
        SystemClock::new(),
        |remaining| tracing::info!(remaining = %remaining, urgent = remaining.is_urgent(), "Tick"),
        || tracing::warn!("Reservation expired"),
    )?;
    tokio::time::sleep(Duration::from_secs(3)).await;
    countdown.cancel();

    let mut handle = flow.proceed_to_payment().await?;
    handle.wait_with_timeout(Duration::from_secs(5)).await?;
    tracing::info!(phase = flow.phase().await.name(), "Payment step done");

    // Give the redirect effect a moment to land.
    tokio::time::sleep(Duration::from_millis(50)).await;
    if let Some(url) = navigator.last_visited() {
        tracing::info!(%url, "Browser would now navigate to the processor");
    }

    Ok(())
}
