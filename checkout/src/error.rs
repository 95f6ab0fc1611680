//! Error types for checkout operations.

use crate::constants::GENERIC_CHECKOUT_ERROR;
use thiserror::Error;

/// Result type alias for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Error taxonomy for the checkout flow.
///
/// Precondition errors are returned before the flow starts (the caller
/// redirects away); gateway errors are surfaced in-flow as user-visible
/// messages while the state machine rolls back to its last stable state.
/// Expiry is not an error: it is a dedicated flow phase.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    // ═══════════════════════════════════════════════════════════
    // Precondition Errors
    // ═══════════════════════════════════════════════════════════

    /// Checkout requires an authenticated user.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Checkout requires selected numbers or an active reservation.
    #[error("No numbers selected")]
    NothingSelected,

    // ═══════════════════════════════════════════════════════════
    // Backend Failures
    // ═══════════════════════════════════════════════════════════

    /// A backend call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Failure talking to the backend API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend rejected the request with a structured message
    /// (numbers no longer available, raffle not active, limit exceeded).
    #[error("{message}")]
    Rejected {
        /// Backend-provided message
        message: String,
    },

    /// The request never produced a usable response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,
}

impl GatewayError {
    /// The message shown to the user for this failure.
    ///
    /// Preference order: structured backend message, then the transport
    /// error's message, then a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } if !message.trim().is_empty() => message.clone(),
            Self::Transport(message) if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_CHECKOUT_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_structured_backend_message() {
        let error = GatewayError::Rejected {
            message: "Numbers no longer available".to_string(),
        };
        assert_eq!(error.user_message(), "Numbers no longer available");
    }

    #[test]
    fn user_message_falls_back_to_transport_message() {
        let error = GatewayError::Transport("connection reset".to_string());
        assert_eq!(error.user_message(), "connection reset");
    }

    #[test]
    fn user_message_falls_back_to_generic_string() {
        assert_eq!(
            GatewayError::Rejected {
                message: "  ".to_string()
            }
            .user_message(),
            GENERIC_CHECKOUT_ERROR
        );
        assert_eq!(GatewayError::Timeout.user_message(), GENERIC_CHECKOUT_ERROR);
    }
}
