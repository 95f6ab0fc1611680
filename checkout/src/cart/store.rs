//! Process-wide cart store.
//!
//! Single shared mutable resource of the checkout flow. All mutations go
//! through the operations below, each of which persists the new snapshot
//! after releasing the write lock. Persistence failures are logged and do
//! not poison the in-memory state: the cart stays usable even if the disk
//! write fails.

use crate::cart::persistence::CartStorage;
use crate::cart::state::CartState;
use crate::types::{Money, NumberId, RaffleId, Reservation, SelectedNumber};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to the persisted cart state.
///
/// Cheap to clone; all clones observe the same state and storage entry.
#[derive(Clone)]
pub struct CartStore {
    state: Arc<RwLock<CartState>>,
    storage: Arc<dyn CartStorage>,
}

impl CartStore {
    /// Open the store, restoring any persisted snapshot.
    ///
    /// A missing snapshot starts an empty cart; an unreadable one is
    /// logged and discarded rather than failing startup.
    #[must_use]
    pub fn load(storage: Arc<dyn CartStorage>) -> Self {
        let initial = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => CartState::new(),
            Err(error) => {
                tracing::warn!(%error, "Failed to restore cart state, starting empty");
                CartState::new()
            },
        };

        Self {
            state: Arc::new(RwLock::new(initial)),
            storage,
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Mutations (each persists the new snapshot)
    // ═══════════════════════════════════════════════════════════

    /// Switch the raffle context. See [`CartState::set_current_raffle`].
    pub async fn set_current_raffle(&self, raffle_id: RaffleId) {
        self.mutate(|cart| cart.set_current_raffle(raffle_id)).await;
    }

    /// Add a number to the pick set (idempotent by id).
    pub async fn add_number(&self, number: SelectedNumber) {
        self.mutate(|cart| cart.add_number(number)).await;
    }

    /// Remove a number from the pick set.
    pub async fn remove_number(&self, id: &NumberId) {
        self.mutate(|cart| cart.remove_number(id)).await;
    }

    /// Toggle a number in the pick set.
    pub async fn toggle_number(&self, number: SelectedNumber) {
        self.mutate(|cart| cart.toggle_number(number)).await;
    }

    /// Empty the pick set.
    pub async fn clear_numbers(&self) {
        self.mutate(CartState::clear_numbers).await;
    }

    /// Store a reservation, graduating the pick set into it.
    pub async fn set_reservation(&self, reservation: Reservation) {
        self.mutate(|cart| cart.set_reservation(reservation)).await;
    }

    /// Drop the reservation and its derived expiry.
    pub async fn clear_reservation(&self) {
        self.mutate(CartState::clear_reservation).await;
    }

    // ═══════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════

    /// A point-in-time copy of the whole cart state.
    pub async fn snapshot(&self) -> CartState {
        self.state.read().await.clone()
    }

    /// Number of picked numbers.
    pub async fn selected_count(&self) -> usize {
        self.state.read().await.selected_count()
    }

    /// Ids of the picked numbers.
    pub async fn selected_ids(&self) -> Vec<NumberId> {
        self.state.read().await.selected_ids()
    }

    /// Total for the pick set at the given raffle-specific unit price.
    pub async fn total_amount(&self, unit_price: Money) -> Money {
        self.state.read().await.total_amount(unit_price)
    }

    /// The cached active reservation, if any.
    pub async fn active_reservation(&self) -> Option<Reservation> {
        self.state.read().await.active_reservation().cloned()
    }

    /// Whether the stored reservation is pending and unexpired.
    pub async fn is_reservation_active(&self, now: DateTime<Utc>) -> bool {
        self.state.read().await.is_reservation_active(now)
    }

    /// Apply a mutation under the write lock, then persist the result.
    async fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut CartState),
    {
        let snapshot = {
            let mut state = self.state.write().await;
            f(&mut state);
            state.clone()
        };

        if let Err(error) = self.storage.save(&snapshot) {
            tracing::warn!(%error, "Failed to persist cart state");
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code

    use super::*;
    use crate::cart::persistence::{InMemoryStorage, StorageError};
    use crate::types::{NumberId, ReservationId, ReservationStatus, SessionToken, UserId};
    use chrono::Duration;

    fn number(display: &str) -> SelectedNumber {
        SelectedNumber {
            id: NumberId::new(),
            display_number: display.to_string(),
        }
    }

    fn pending_reservation(expires_at: DateTime<Utc>) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            raffle_id: RaffleId::new(),
            user_id: UserId::new(),
            number_ids: vec![NumberId::new()],
            status: ReservationStatus::Pending,
            session_id: SessionToken::generate(),
            total_amount: Money::from_cents(500),
            expires_at,
            created_at: expires_at - Duration::minutes(10),
            updated_at: expires_at - Duration::minutes(10),
        }
    }

    #[tokio::test]
    async fn mutations_survive_reload_from_same_storage() {
        let storage = Arc::new(InMemoryStorage::new());

        let store = CartStore::load(Arc::clone(&storage) as Arc<dyn CartStorage>);
        let raffle = RaffleId::new();
        store.set_current_raffle(raffle).await;
        store.add_number(number("01")).await;

        let expires_at = Utc::now() + Duration::minutes(15);
        store.set_reservation(pending_reservation(expires_at)).await;
        drop(store);

        let reloaded = CartStore::load(storage);
        let snapshot = reloaded.snapshot().await;

        assert_eq!(snapshot.current_raffle_id(), Some(raffle));
        assert!(snapshot.selected_numbers().is_empty());
        assert!(snapshot.active_reservation().is_some());
        assert_eq!(snapshot.reservation_expiry(), Some(expires_at));
    }

    #[tokio::test]
    async fn storage_failure_does_not_poison_in_memory_state() {
        struct FailingStorage;

        impl CartStorage for FailingStorage {
            fn load(&self) -> Result<Option<CartState>, StorageError> {
                Ok(None)
            }

            fn save(&self, _state: &CartState) -> Result<(), StorageError> {
                Err(StorageError::Io(std::io::Error::other("disk full")))
            }

            fn clear(&self) -> Result<(), StorageError> {
                Ok(())
            }
        }

        let store = CartStore::load(Arc::new(FailingStorage));
        store.add_number(number("01")).await;

        assert_eq!(store.selected_count().await, 1);
    }

    #[tokio::test]
    async fn clones_share_the_same_cart() {
        let store = CartStore::load(Arc::new(InMemoryStorage::new()));
        let observer = store.clone();

        store.add_number(number("01")).await;

        assert_eq!(observer.selected_count().await, 1);
    }
}
