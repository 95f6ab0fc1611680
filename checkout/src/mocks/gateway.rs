//! Scripted mock gateways.

use crate::error::GatewayError;
use crate::providers::{
    CreateIntentRequest, CreateIntentResponse, CreateReservationRequest, GatewayFuture,
    PaymentGateway, ReservationGateway,
};
use crate::types::{Money, Payment, PaymentId, PaymentIntent, Reservation, ReservationId};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock reservation gateway with scripted responses.
///
/// Responses are served in enqueue order; an unscripted call fails with a
/// transport error so a test that forgot to script a step fails loudly.
#[derive(Debug, Clone, Default)]
pub struct MockReservationGateway {
    script: Arc<Mutex<VecDeque<Result<Reservation, GatewayError>>>>,
    requests: Arc<Mutex<Vec<CreateReservationRequest>>>,
}

impl MockReservationGateway {
    /// Create a gateway with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue the next `create_reservation` response.
    pub fn enqueue(&self, response: Result<Reservation, GatewayError>) {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.script.lock().unwrap().push_back(response);
    }

    /// All `create_reservation` requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CreateReservationRequest> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.requests.lock().unwrap().clone()
    }
}

impl ReservationGateway for MockReservationGateway {
    fn create_reservation(&self, request: CreateReservationRequest) -> GatewayFuture<Reservation> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.requests.lock().unwrap().push(request);

        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let response = self.script.lock().unwrap().pop_front();

        Box::pin(async move {
            response.unwrap_or_else(|| {
                Err(GatewayError::Transport(
                    "mock: no scripted reservation response".to_string(),
                ))
            })
        })
    }

    fn get_reservation(&self, _id: ReservationId) -> GatewayFuture<Reservation> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let response = self.script.lock().unwrap().pop_front();

        Box::pin(async move {
            response.unwrap_or_else(|| {
                Err(GatewayError::Transport(
                    "mock: no scripted reservation response".to_string(),
                ))
            })
        })
    }
}

/// Mock payment gateway with scripted responses.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    script: Arc<Mutex<VecDeque<Result<CreateIntentResponse, GatewayError>>>>,
    requests: Arc<Mutex<Vec<CreateIntentRequest>>>,
}

impl MockPaymentGateway {
    /// Create a gateway with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue the next `create_intent` response.
    pub fn enqueue(&self, response: Result<CreateIntentResponse, GatewayError>) {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.script.lock().unwrap().push_back(response);
    }

    /// Enqueue a successful intent whose redirect URL is `redirect_url`.
    pub fn enqueue_redirect(&self, reservation_id: ReservationId, redirect_url: &str) {
        self.enqueue(Ok(CreateIntentResponse {
            payment: Payment {
                id: PaymentId::new(),
                reservation_id,
                amount: Money::from_cents(0),
                created_at: Utc::now(),
            },
            payment_intent: PaymentIntent {
                client_secret: redirect_url.to_string(),
            },
        }));
    }

    /// All `create_intent` requests seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<CreateIntentRequest> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.requests.lock().unwrap().clone()
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn create_intent(&self, request: CreateIntentRequest) -> GatewayFuture<CreateIntentResponse> {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        self.requests.lock().unwrap().push(request);

        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        let response = self.script.lock().unwrap().pop_front();

        Box::pin(async move {
            response.unwrap_or_else(|| {
                Err(GatewayError::Transport(
                    "mock: no scripted intent response".to_string(),
                ))
            })
        })
    }
}
