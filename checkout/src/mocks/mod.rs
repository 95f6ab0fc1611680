//! Mock providers for testing.
//!
//! Scripted in-memory implementations of the provider traits. Responses
//! are enqueued ahead of time and consumed in order, and every request is
//! recorded so tests can assert on what the flow actually sent.

pub mod gateway;
pub mod navigator;

pub use gateway::{MockPaymentGateway, MockReservationGateway};
pub use navigator::RecordingNavigator;
