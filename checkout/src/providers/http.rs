//! HTTP providers for the backend reservation and payment endpoints.
//!
//! Error extraction follows the backend contract: a structured
//! `{ "error": { "message": ... } }` body is preferred, then a flat
//! `{ "message": ... }`, then the HTTP status line.

use crate::config::CheckoutConfig;
use crate::error::GatewayError;
use crate::providers::{
    CreateIntentRequest, CreateIntentResponse, CreateReservationRequest, GatewayFuture,
    PaymentGateway, ReservationGateway,
};
use crate::types::{Reservation, ReservationId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Envelope of reservation responses: `{ "reservation": ... }`.
#[derive(Debug, Deserialize)]
struct ReservationEnvelope {
    reservation: Reservation,
}

/// Error body shapes the backend may return.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured {
        message: String,
    },
    Plain(String),
}

/// Build the shared HTTP client.
fn client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| GatewayError::Transport(error.to_string()))
}

fn map_transport(error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(error.to_string())
    }
}

/// Extract the backend's rejection message from an error body, if present.
fn rejection_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;

    let message = match parsed.error {
        Some(ErrorDetail::Structured { message }) | Some(ErrorDetail::Plain(message)) => {
            Some(message)
        },
        None => parsed.message,
    };

    message.filter(|m| !m.trim().is_empty())
}

/// Turn a non-success response into a [`GatewayError`].
async fn error_from_response(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = rejection_message(&body)
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    GatewayError::Rejected { message }
}

/// Send a JSON POST and decode the success body.
async fn post_json<B, T>(
    http: reqwest::Client,
    url: String,
    body: B,
) -> Result<T, GatewayError>
where
    B: serde::Serialize,
    T: DeserializeOwned,
{
    let response = http
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|error| map_transport(&error))?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|error| GatewayError::Transport(error.to_string()))
}

/// Fetch a URL and decode the success body.
async fn get_json<T>(http: reqwest::Client, url: String) -> Result<T, GatewayError>
where
    T: DeserializeOwned,
{
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|error| map_transport(&error))?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    response
        .json::<T>()
        .await
        .map_err(|error| GatewayError::Transport(error.to_string()))
}

/// `ReservationGateway` implementation over the backend REST API.
#[derive(Debug, Clone)]
pub struct HttpReservationGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpReservationGateway {
    /// Create a gateway with an existing client.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(
            client(Duration::from_secs(config.request_timeout))?,
            config.api_base_url.clone(),
        ))
    }
}

impl ReservationGateway for HttpReservationGateway {
    fn create_reservation(&self, request: CreateReservationRequest) -> GatewayFuture<Reservation> {
        let http = self.http.clone();
        let url = format!("{}/reservations", self.base_url);

        Box::pin(async move {
            tracing::debug!(
                raffle_id = %request.raffle_id,
                numbers = request.number_ids.len(),
                session_id = %request.session_id,
                "Creating reservation"
            );

            let envelope: ReservationEnvelope = post_json(http, url, request).await?;
            Ok(envelope.reservation)
        })
    }

    fn get_reservation(&self, id: ReservationId) -> GatewayFuture<Reservation> {
        let http = self.http.clone();
        let url = format!("{}/reservations/{id}", self.base_url);

        Box::pin(async move {
            let envelope: ReservationEnvelope = get_json(http, url).await?;
            Ok(envelope.reservation)
        })
    }
}

/// `PaymentGateway` implementation over the backend REST API.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    /// Create a gateway with an existing client.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &CheckoutConfig) -> Result<Self, GatewayError> {
        Ok(Self::new(
            client(Duration::from_secs(config.request_timeout))?,
            config.api_base_url.clone(),
        ))
    }
}

impl PaymentGateway for HttpPaymentGateway {
    fn create_intent(&self, request: CreateIntentRequest) -> GatewayFuture<CreateIntentResponse> {
        let http = self.http.clone();
        let url = format!("{}/payments/intent", self.base_url);

        Box::pin(async move {
            tracing::debug!(reservation_id = %request.reservation_id, "Creating payment intent");
            post_json(http, url, request).await
        })
    }
}
