//! Recording navigator mock.

use crate::providers::Navigator;
use std::sync::{Arc, Mutex};

/// Navigator that records every redirect instead of performing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visited: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Create a navigator with no recorded redirects.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs redirected to, in order.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.visited.lock().unwrap().clone()
    }

    /// The most recent redirect target, if any.
    #[must_use]
    pub fn last_visited(&self) -> Option<String> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.visited.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.visited.lock().unwrap().push(url.to_string());
    }
}
