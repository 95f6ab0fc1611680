//! # Rifa Checkout
//!
//! The checkout reservation flow for a raffle/ticketing marketplace:
//! picking numbers into a durable cart, converting them into a time-boxed
//! backend reservation, counting down to its expiry, and handing the
//! browser to an external payment processor.
//!
//! ## Architecture
//!
//! The flow is implemented as a reducer over a closed phase enum:
//!
//! ```text
//! Action → Reducer → (Phase transition, Effects) → Effect Execution → More Actions
//! ```
//!
//! Three pieces cooperate:
//!
//! - [`cart`]: process-wide, persisted pick-set and reservation state
//! - [`countdown`]: live remaining-time display with a one-shot expiry signal
//! - [`flow`]: the `review → reserving → reserved → creating_payment →
//!   payment_ready` state machine, with `expired` absorbing on timeout
//!
//! ## Example: Happy Path
//!
//! ```rust,ignore
//! use rifa_checkout::*;
//!
//! // 1. Pick numbers while browsing
//! cart.add_number(number).await;
//!
//! // 2. Enter checkout (guards: authenticated, non-empty picks)
//! let flow = CheckoutFlow::begin(env, raffle_id, Some(user_id)).await?;
//!
//! // 3. Reserve, then pay
//! flow.confirm_reservation().await?;
//! flow.proceed_to_payment().await?;
//! // → full browser redirect to the processor
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod cart;
pub mod config;
pub mod constants;
pub mod countdown;
pub mod error;
pub mod flow;
pub mod providers;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use cart::{CartState, CartStore, JsonFileStorage};
pub use config::CheckoutConfig;
pub use countdown::{Countdown, CountdownHandle, Remaining};
pub use error::{CheckoutError, GatewayError, Result};
pub use flow::{
    CheckoutAction, CheckoutEnvironment, CheckoutFlow, CheckoutPhase, CheckoutReducer,
    CheckoutState, CheckoutUrls,
};
pub use types::{
    Money, NumberId, RaffleId, Reservation, ReservationId, ReservationStatus, SelectedNumber,
    SessionToken, UserId,
};
