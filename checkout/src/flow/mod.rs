//! The checkout flow: a linear state machine over the cart, the backend
//! gateways, and the expiry timer.
//!
//! ```text
//! UI intent ──► CheckoutFlow (facade)
//!                  │ send
//!                  ▼
//!               Store ──► CheckoutReducer ──► (phase transition, effects)
//!                  ▲                               │
//!                  │      gateway calls, cart updates, expiry timer,
//!                  └────────── completion actions ─┘
//! ```
//!
//! The reducer owns every transition rule; effects carry the I/O. The
//! expiry timer is a cancellable delayed action armed when a reservation
//! enters the flow and cancelled when the flow hands off to the payment
//! processor.

pub mod actions;
pub mod controller;
pub mod environment;
pub mod reducer;
#[cfg(test)]
mod tests;
pub mod types;

pub use actions::CheckoutAction;
pub use controller::{CheckoutFlow, CheckoutStore};
pub use environment::{CheckoutEnvironment, CheckoutUrls};
pub use reducer::CheckoutReducer;
pub use types::{CheckoutPhase, CheckoutState};
