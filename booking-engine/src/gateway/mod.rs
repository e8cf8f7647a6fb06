//! Payment gateway clients
//!
//! Redirect-based methods talk to an external gateway through
//! [`GatewayClient`]. Sessions are keyed by the booking's order code and
//! amounts travel in the gateway currency's minor units.

mod http;
#[cfg(any(test, feature = "testing"))]
pub mod mock;
pub mod signature;

pub use http::{HttpGateway, HttpGatewayConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::PaymentMethod;
use thiserror::Error;

/// Gateway view of an order code, before a session is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderLookup {
    /// Known and still awaiting payment
    Payable,
    /// Known and already paid on the gateway side
    Settled,
    /// The gateway has never seen this order code
    Unknown,
}

/// A freshly created checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub correlation_id: String,
    pub redirect_url: String,
}

/// Pull-side payment status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayStatus {
    pub paid: bool,
    pub amount_minor: i64,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with an error; `message` is the gateway's own text
    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Invalid gateway base URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Message suitable for surfacing to the caller
    pub fn gateway_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn lookup_order(&self, order_code: &str) -> Result<OrderLookup, GatewayError>;

    async fn create_session(
        &self,
        order_code: &str,
        amount_minor: i64,
        currency: &str,
    ) -> Result<GatewaySession, GatewayError>;

    async fn query_status(&self, correlation_id: &str) -> Result<GatewayStatus, GatewayError>;
}

/// One gateway per redirect method
#[derive(Clone)]
pub struct Gateways {
    pub wallet: Arc<dyn GatewayClient>,
    pub card: Arc<dyn GatewayClient>,
}

impl Gateways {
    pub fn new(wallet: Arc<dyn GatewayClient>, card: Arc<dyn GatewayClient>) -> Self {
        Self { wallet, card }
    }

    /// `None` for methods that complete locally
    pub fn for_method(&self, method: PaymentMethod) -> Option<&Arc<dyn GatewayClient>> {
        match method {
            PaymentMethod::CashOnDelivery => None,
            PaymentMethod::WalletRedirect => Some(&self.wallet),
            PaymentMethod::CardRedirect => Some(&self.card),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockGateway;
    use super::*;

    #[test]
    fn test_for_method() {
        let wallet = Arc::new(MockGateway::new("wallet"));
        let card = Arc::new(MockGateway::new("card"));
        let gateways = Gateways::new(wallet, card);

        assert!(gateways.for_method(PaymentMethod::CashOnDelivery).is_none());
        assert_eq!(
            gateways.for_method(PaymentMethod::WalletRedirect).unwrap().name(),
            "wallet"
        );
        assert_eq!(
            gateways.for_method(PaymentMethod::CardRedirect).unwrap().name(),
            "card"
        );
    }

    #[test]
    fn test_gateway_message_prefers_gateway_text() {
        let err = GatewayError::Rejected {
            status: 402,
            message: "Your card was declined.".to_string(),
        };
        assert_eq!(err.gateway_message(), "Your card was declined.");
    }
}
