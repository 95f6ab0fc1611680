//! Cart state and its mutators.
//!
//! All mutations go through the named operations below; nothing outside
//! this module writes fields directly. `selected_numbers` and
//! `active_reservation` are mutually exclusive phases of the same numbers:
//! a number is either being picked or already folded into the reservation,
//! never both.

use crate::types::{Money, NumberId, RaffleId, Reservation, ReservationStatus, SelectedNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-side cart and reservation state.
///
/// This is exactly the shape persisted to durable storage; transient
/// UI-only flags never live here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    current_raffle_id: Option<RaffleId>,
    selected_numbers: Vec<SelectedNumber>,
    active_reservation: Option<Reservation>,
    reservation_expiry: Option<DateTime<Utc>>,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current_raffle_id: None,
            selected_numbers: Vec::new(),
            active_reservation: None,
            reservation_expiry: None,
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Mutators
    // ═══════════════════════════════════════════════════════════

    /// Switch the raffle context.
    ///
    /// Picks are scoped to one raffle: switching to a different raffle
    /// discards any in-progress selection. Re-setting the same raffle
    /// leaves the selection untouched.
    pub fn set_current_raffle(&mut self, raffle_id: RaffleId) {
        if self.current_raffle_id != Some(raffle_id) {
            self.selected_numbers.clear();
        }
        self.current_raffle_id = Some(raffle_id);
    }

    /// Add a number to the pick set. No-op if the id is already present.
    pub fn add_number(&mut self, number: SelectedNumber) {
        if !self.contains_number(&number.id) {
            self.selected_numbers.push(number);
        }
    }

    /// Remove a number from the pick set by id.
    pub fn remove_number(&mut self, id: &NumberId) {
        self.selected_numbers.retain(|number| number.id != *id);
    }

    /// Add the number if absent, remove it if present.
    pub fn toggle_number(&mut self, number: SelectedNumber) {
        if self.contains_number(&number.id) {
            self.remove_number(&number.id);
        } else {
            self.selected_numbers.push(number);
        }
    }

    /// Empty the pick set.
    pub fn clear_numbers(&mut self) {
        self.selected_numbers.clear();
    }

    /// Store a freshly created reservation.
    ///
    /// The picks graduate into the reservation: the pick set is cleared and
    /// the absolute expiry instant is derived from `expires_at`.
    pub fn set_reservation(&mut self, reservation: Reservation) {
        self.reservation_expiry = Some(reservation.expires_at);
        self.selected_numbers.clear();
        self.active_reservation = Some(reservation);
    }

    /// Drop the reservation and its derived expiry.
    ///
    /// The pick set is left untouched; callers that also want it cleared
    /// (e.g., on expiry) call [`clear_numbers`](Self::clear_numbers) too.
    pub fn clear_reservation(&mut self) {
        self.active_reservation = None;
        self.reservation_expiry = None;
    }

    // ═══════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════

    /// The raffle the cart is currently scoped to.
    #[must_use]
    pub const fn current_raffle_id(&self) -> Option<RaffleId> {
        self.current_raffle_id
    }

    /// The in-progress pick set.
    #[must_use]
    pub fn selected_numbers(&self) -> &[SelectedNumber] {
        &self.selected_numbers
    }

    /// The cached active reservation, if any.
    #[must_use]
    pub const fn active_reservation(&self) -> Option<&Reservation> {
        self.active_reservation.as_ref()
    }

    /// The derived expiry instant of the active reservation.
    #[must_use]
    pub const fn reservation_expiry(&self) -> Option<DateTime<Utc>> {
        self.reservation_expiry
    }

    // ═══════════════════════════════════════════════════════════
    // Computed
    // ═══════════════════════════════════════════════════════════

    /// Number of picked numbers.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected_numbers.len()
    }

    /// Ids of the picked numbers, in pick order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<NumberId> {
        self.selected_numbers.iter().map(|n| n.id).collect()
    }

    /// Total amount for the pick set at the given raffle-specific unit price.
    #[must_use]
    pub fn total_amount(&self, unit_price: Money) -> Money {
        unit_price.times(self.selected_count())
    }

    /// Whether the stored reservation is still actionable.
    ///
    /// True iff a reservation is present, its status is pending, and the
    /// current time is before its expiry. Always derived, never stored.
    #[must_use]
    pub fn is_reservation_active(&self, now: DateTime<Utc>) -> bool {
        self.active_reservation
            .as_ref()
            .is_some_and(|r| r.status == ReservationStatus::Pending)
            && self.reservation_expiry.is_some_and(|expiry| now < expiry)
    }

    fn contains_number(&self, id: &NumberId) -> bool {
        self.selected_numbers.iter().any(|number| number.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ReservationId, SessionToken, UserId};
    use chrono::Duration;

    fn number(display: &str) -> SelectedNumber {
        SelectedNumber {
            id: NumberId::new(),
            display_number: display.to_string(),
        }
    }

    fn pending_reservation(expires_at: DateTime<Utc>) -> Reservation {
        let created_at = expires_at - Duration::minutes(10);
        Reservation {
            id: ReservationId::new(),
            raffle_id: RaffleId::new(),
            user_id: UserId::new(),
            number_ids: vec![NumberId::new(), NumberId::new()],
            status: ReservationStatus::Pending,
            session_id: SessionToken::generate(),
            total_amount: Money::from_cents(1000),
            expires_at,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn switching_raffles_clears_picks_same_raffle_keeps_them() {
        let mut cart = CartState::new();
        let r1 = RaffleId::new();
        let r2 = RaffleId::new();

        cart.set_current_raffle(r1);
        cart.add_number(number("01"));
        cart.add_number(number("02"));
        assert_eq!(cart.selected_count(), 2);

        cart.set_current_raffle(r2);
        assert_eq!(cart.selected_count(), 0);
        assert_eq!(cart.current_raffle_id(), Some(r2));

        cart.add_number(number("07"));
        cart.set_current_raffle(r2);
        assert_eq!(cart.selected_count(), 1);
    }

    #[test]
    fn add_number_is_idempotent_by_id() {
        let mut cart = CartState::new();
        let pick = number("01");

        cart.add_number(pick.clone());
        cart.add_number(pick);

        assert_eq!(cart.selected_count(), 1);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut cart = CartState::new();
        let pick = number("01");

        cart.toggle_number(pick.clone());
        assert_eq!(cart.selected_count(), 1);

        cart.toggle_number(pick);
        assert_eq!(cart.selected_count(), 0);
    }

    #[test]
    fn set_reservation_graduates_picks() {
        let mut cart = CartState::new();
        cart.add_number(number("01"));
        cart.add_number(number("02"));

        let expires_at = Utc::now() + Duration::minutes(10);
        let reservation = pending_reservation(expires_at);
        cart.set_reservation(reservation.clone());

        assert!(cart.selected_numbers().is_empty());
        assert_eq!(cart.active_reservation(), Some(&reservation));
        assert_eq!(cart.reservation_expiry(), Some(expires_at));
    }

    #[test]
    fn clear_reservation_leaves_picks_untouched() {
        let mut cart = CartState::new();
        cart.set_reservation(pending_reservation(Utc::now() + Duration::minutes(10)));
        cart.add_number(number("03"));

        cart.clear_reservation();

        assert!(cart.active_reservation().is_none());
        assert!(cart.reservation_expiry().is_none());
        assert_eq!(cart.selected_count(), 1);
    }

    #[test]
    fn reservation_is_active_only_while_pending_and_unexpired() {
        let mut cart = CartState::new();
        let expires_at = Utc::now() + Duration::minutes(10);
        let before = expires_at - Duration::minutes(1);

        cart.set_reservation(pending_reservation(expires_at));
        assert!(cart.is_reservation_active(before));
        assert!(!cart.is_reservation_active(expires_at));
        assert!(!cart.is_reservation_active(expires_at + Duration::seconds(1)));

        for status in [
            ReservationStatus::Confirmed,
            ReservationStatus::Expired,
            ReservationStatus::Cancelled,
        ] {
            let mut reservation = pending_reservation(expires_at);
            reservation.status = status;
            cart.set_reservation(reservation);
            assert!(!cart.is_reservation_active(before), "status {status:?}");
        }
    }

    #[test]
    fn empty_cart_has_no_active_reservation() {
        assert!(!CartState::new().is_reservation_active(Utc::now()));
    }

    #[test]
    fn total_amount_is_count_times_unit_price() {
        let mut cart = CartState::new();
        cart.add_number(number("01"));
        cart.add_number(number("02"));
        cart.add_number(number("03"));

        assert_eq!(cart.total_amount(Money::from_cents(250)), Money::from_cents(750));
    }
}
