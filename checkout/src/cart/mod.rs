//! Cart and reservation state, durably persisted.
//!
//! The cart holds the set of tentatively picked ticket numbers and, once
//! created, the active reservation. It survives a full reload through a
//! single persisted JSON entry, and its two halves are mutually exclusive:
//! picks graduate into the reservation when one is created.
//!
//! ```text
//! browse → add/toggle numbers → [selected_numbers]
//!                                      │ set_reservation
//!                                      ▼
//!                              [active_reservation] → pay / expire
//! ```

pub mod persistence;
pub mod state;
pub mod store;

pub use persistence::{CartStorage, InMemoryStorage, JsonFileStorage, StorageError};
pub use state::CartState;
pub use store::CartStore;
