//! Booking server configuration

use booking_engine::{EngineConfig, HttpGatewayConfig};

use crate::BoxError;

/// Booking server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// redb database file
    pub database_path: String,
    /// Shared key for staff endpoints (`X-Staff-Key` header)
    pub staff_api_key: String,
    /// E-wallet gateway account
    pub wallet_gateway: HttpGatewayConfig,
    /// Card gateway account
    pub card_gateway: HttpGatewayConfig,
    /// Webhook signing secret of the e-wallet gateway
    pub wallet_webhook_secret: String,
    /// Webhook signing secret of the card gateway
    pub card_webhook_secret: String,
    /// Log filter directive, e.g. `info` or `booking_engine=debug`
    pub log_level: Option<String>,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Daily-rolling log files in this directory (stdout when unset)
    pub log_dir: Option<String>,
    /// Expiry windows, currency, polling
    pub engine: EngineConfig,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn gateway(prefix: &str, environment: &str) -> Result<HttpGatewayConfig, BoxError> {
        let public_url =
            std::env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        Ok(HttpGatewayConfig {
            name: prefix.to_ascii_lowercase(),
            base_url: std::env::var(format!("{prefix}_GATEWAY_URL"))
                .unwrap_or_else(|_| "http://localhost:12111".into()),
            secret_key: Self::require_secret(&format!("{prefix}_SECRET_KEY"), environment)?,
            success_url: std::env::var(format!("{prefix}_SUCCESS_URL"))
                .unwrap_or_else(|_| format!("{public_url}/payment/success")),
            cancel_url: std::env::var(format!("{prefix}_CANCEL_URL"))
                .unwrap_or_else(|_| format!("{public_url}/payment/cancel")),
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/bookings.redb".into()),
            staff_api_key: Self::require_secret("STAFF_API_KEY", &environment)?,
            wallet_gateway: Self::gateway("WALLET", &environment)?,
            card_gateway: Self::gateway("CARD", &environment)?,
            wallet_webhook_secret: Self::require_secret("WALLET_WEBHOOK_SECRET", &environment)?,
            card_webhook_secret: Self::require_secret("CARD_WEBHOOK_SECRET", &environment)?,
            log_level: std::env::var("LOG_LEVEL").ok().filter(|s| !s.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            engine: EngineConfig::from_env(),
            environment,
        })
    }
}
