//! Core domain types for the checkout flow.
//!
//! These types mirror the backend's reservation contract. The backend owns
//! every `Reservation`; the client only ever holds a cached copy and derives
//! whether it is still actionable from status and expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaffleId(pub Uuid);

impl RaffleId {
    /// Generate a new random `RaffleId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RaffleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RaffleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single ticket number within a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberId(pub Uuid);

impl NumberId {
    /// Generate a new random `NumberId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NumberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(pub Uuid);

impl ReservationId {
    /// Generate a new random `ReservationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(pub Uuid);

impl PaymentId {
    /// Generate a new random `PaymentId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-generated idempotency token for reservation creation.
///
/// A fresh token is generated for every reservation attempt, so a retried
/// "create reservation" after a transient failure is never interpreted by
/// the backend as a duplicate of a still-pending earlier attempt for the
/// same numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Generate a fresh session token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID (e.g., echoed back by the backend).
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Money
// ═══════════════════════════════════════════════════════════════════════

/// Monetary amount in integer cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Create an amount from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Multiply a unit price by a count, saturating on overflow.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // Cart sizes are far below i64::MAX
    pub const fn times(self, count: usize) -> Self {
        Self(self.0.saturating_mul(count as i64))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Selection and Reservation
// ═══════════════════════════════════════════════════════════════════════

/// One ticket number the user has tentatively picked but not yet reserved.
///
/// Lives only in the client cart; once a reservation is created the pick
/// graduates into `Reservation::number_ids` and is removed from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedNumber {
    /// Backend id of the number.
    pub id: NumberId,

    /// Human-facing rendering of the number (e.g., "0042").
    pub display_number: String,
}

/// Lifecycle status of a reservation, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Time-boxed hold on the numbers; the only payable status.
    Pending,
    /// Payment completed; numbers are owned.
    Confirmed,
    /// Hold lapsed; numbers released server-side.
    Expired,
    /// Explicitly cancelled by the user or backend.
    Cancelled,
}

/// A time-boxed, backend-issued claim on a set of raffle ticket numbers.
///
/// Owned by the backend; this is the client's cached copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation id.
    pub id: ReservationId,

    /// Raffle the numbers belong to.
    pub raffle_id: RaffleId,

    /// User holding the reservation.
    pub user_id: UserId,

    /// The reserved numbers.
    pub number_ids: Vec<NumberId>,

    /// Current lifecycle status.
    pub status: ReservationStatus,

    /// Idempotency token the reservation was created with.
    pub session_id: SessionToken,

    /// Total amount due for the reserved numbers.
    pub total_amount: Money,

    /// Absolute instant the hold lapses.
    pub expires_at: DateTime<Utc>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Whether the reservation can still be paid.
    ///
    /// A reservation is only actionable while its status is
    /// [`ReservationStatus::Pending`] AND the current time is before
    /// `expires_at`. Once either condition fails it is terminal and must
    /// be cleared from the client.
    #[must_use]
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Pending && now < self.expires_at
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Payment
// ═══════════════════════════════════════════════════════════════════════

/// Backend payment record returned alongside a payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: PaymentId,

    /// Reservation the payment settles.
    pub reservation_id: ReservationId,

    /// Amount charged.
    pub amount: Money,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// External processor handle for a created payment intent.
///
/// `client_secret` carries the processor's approval URL: this is a
/// redirect-based flow, so the client performs a full browser navigation
/// to it rather than embedding payment UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Approval/redirect URL at the external processor.
    pub client_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reservation(status: ReservationStatus, expires_at: DateTime<Utc>) -> Reservation {
        let now = expires_at - Duration::minutes(10);
        Reservation {
            id: ReservationId::new(),
            raffle_id: RaffleId::new(),
            user_id: UserId::new(),
            number_ids: vec![NumberId::new()],
            status,
            session_id: SessionToken::generate(),
            total_amount: Money::from_cents(500),
            expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn session_tokens_are_unique_per_attempt() {
        assert_ne!(SessionToken::generate(), SessionToken::generate());
    }

    #[test]
    fn pending_reservation_is_actionable_before_expiry() {
        let expires_at = Utc::now() + Duration::minutes(5);
        let reservation = reservation(ReservationStatus::Pending, expires_at);

        assert!(reservation.is_actionable(expires_at - Duration::minutes(1)));
        assert!(!reservation.is_actionable(expires_at));
        assert!(!reservation.is_actionable(expires_at + Duration::seconds(1)));
    }

    #[test]
    fn non_pending_statuses_are_never_actionable() {
        let expires_at = Utc::now() + Duration::minutes(5);
        let now = expires_at - Duration::minutes(1);

        for status in [
            ReservationStatus::Confirmed,
            ReservationStatus::Expired,
            ReservationStatus::Cancelled,
        ] {
            assert!(!reservation(status, expires_at).is_actionable(now));
        }
    }

    #[test]
    fn money_times_multiplies_unit_price() {
        assert_eq!(Money::from_cents(250).times(4), Money::from_cents(1000));
        assert_eq!(Money::from_cents(250).times(0), Money::from_cents(0));
    }

    #[test]
    fn reservation_status_uses_snake_case_wire_form() {
        #[allow(clippy::unwrap_used)] // Test code
        let json = serde_json::to_string(&ReservationStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
