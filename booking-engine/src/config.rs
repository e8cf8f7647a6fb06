//! Engine configuration
//!
//! Timing windows and gateway money conventions. `Default` matches the
//! production policy; [`EngineConfig::from_env`] overrides individual values.

use std::time::Duration;

use crate::money::MAX_MINOR_UNIT_EXPONENT;

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Payment window after a cash-on-delivery dispatch
    pub cash_on_delivery_window_hours: i64,
    /// Payment window after a redirect dispatch
    pub deferred_window_days: i64,
    /// ISO currency code sent to gateways
    pub currency: String,
    /// Decimal places of the gateway currency's minor unit (2 for USD, 0 for VND)
    pub minor_unit_exponent: u32,
    /// Attempts at writing PAID when the version check keeps failing
    pub max_confirmation_retries: u32,
    /// Interval between pull reconciliation passes
    pub poll_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cash_on_delivery_window_hours: 24,
            deferred_window_days: 7,
            currency: "USD".to_string(),
            minor_unit_exponent: 2,
            max_confirmation_retries: 3,
            poll_interval: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    /// Load overrides from environment variables; unset or unparsable values
    /// keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cash_on_delivery_window_hours: env_parse(
                "COD_WINDOW_HOURS",
                defaults.cash_on_delivery_window_hours,
            ),
            deferred_window_days: env_parse("DEFERRED_WINDOW_DAYS", defaults.deferred_window_days),
            currency: std::env::var("PAYMENT_CURRENCY")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.currency),
            minor_unit_exponent: minor_unit_exponent(env_parse(
                "PAYMENT_MINOR_UNIT_EXPONENT",
                defaults.minor_unit_exponent,
            ))
            .unwrap_or(defaults.minor_unit_exponent),
            max_confirmation_retries: env_parse(
                "MAX_CONFIRMATION_RETRIES",
                defaults.max_confirmation_retries,
            ),
            poll_interval: Duration::from_secs(env_parse(
                "POLL_INTERVAL_SECS",
                defaults.poll_interval.as_secs(),
            )),
        }
    }
}

/// Currency exponents above the ISO 4217 maximum are rejected
fn minor_unit_exponent(value: u32) -> Option<u32> {
    if value > MAX_MINOR_UNIT_EXPONENT {
        tracing::warn!(
            value,
            max = MAX_MINOR_UNIT_EXPONENT,
            "PAYMENT_MINOR_UNIT_EXPONENT out of range, using default"
        );
        return None;
    }
    Some(value)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
