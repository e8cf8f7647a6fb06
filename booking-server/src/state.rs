//! Application state shared by all handlers

use std::sync::Arc;

use booking_engine::BookingService;
use shared::PaymentMethod;

use crate::config::Config;

/// Per-gateway webhook signing secrets
#[derive(Debug, Clone)]
pub struct WebhookSecrets {
    pub wallet: String,
    pub card: String,
}

impl WebhookSecrets {
    pub fn for_method(&self, method: PaymentMethod) -> Option<&str> {
        match method {
            PaymentMethod::WalletRedirect => Some(&self.wallet),
            PaymentMethod::CardRedirect => Some(&self.card),
            PaymentMethod::CashOnDelivery => None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: BookingService,
    pub staff_api_key: Arc<str>,
    pub webhook_secrets: Arc<WebhookSecrets>,
}

impl AppState {
    pub fn new(service: BookingService, config: &Config) -> Self {
        Self {
            service,
            staff_api_key: Arc::from(config.staff_api_key.as_str()),
            webhook_secrets: Arc::new(WebhookSecrets {
                wallet: config.wallet_webhook_secret.clone(),
                card: config.card_webhook_secret.clone(),
            }),
        }
    }
}
