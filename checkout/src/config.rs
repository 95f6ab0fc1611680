//! Configuration management for the checkout engine.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The backend origin (`API_BASE_URL`) is the only variable that affects
//! flow behavior; the rest are delivery details.

use crate::constants::CART_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::env;

/// Checkout configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Backend API origin (e.g., `https://api.example.com`)
    pub api_base_url: String,
    /// URL the payment processor returns to after approval
    pub return_url: String,
    /// URL the payment processor returns to after cancellation
    pub cancel_url: String,
    /// URL the client navigates to after a reservation expires
    pub expired_redirect_url: String,
    /// Request timeout for backend calls, in seconds
    pub request_timeout: u64,
    /// Path of the durable cart-state entry
    pub cart_storage_path: String,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            return_url: env::var("CHECKOUT_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:3000/checkout/return".to_string()),
            cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| "http://localhost:3000/checkout/cancel".to_string()),
            expired_redirect_url: env::var("CHECKOUT_EXPIRED_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/raffles".to_string()),
            request_timeout: env::var("CHECKOUT_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            cart_storage_path: env::var("CART_STORAGE_PATH")
                .unwrap_or_else(|_| format!("{CART_STORAGE_KEY}.json")),
        }
    }
}
