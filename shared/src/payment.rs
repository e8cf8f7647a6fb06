//! Payment method, dispatch and reconciliation types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the customer pays
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Pay on site; completes locally without a gateway
    CashOnDelivery,
    /// E-wallet checkout via redirect
    WalletRedirect,
    /// Card checkout via redirect
    CardRedirect,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "CASH_ON_DELIVERY",
            Self::WalletRedirect => "WALLET_REDIRECT",
            Self::CardRedirect => "CARD_REDIRECT",
        }
    }

    pub fn is_redirect(&self) -> bool {
        !matches!(self, Self::CashOnDelivery)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "CASH_ON_DELIVERY" => Ok(Self::CashOnDelivery),
            "WALLET_REDIRECT" | "WALLET" => Ok(Self::WalletRedirect),
            "CARD_REDIRECT" | "CARD" => Ok(Self::CardRedirect),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

/// Outcome of dispatching a booking to a payment method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchResult {
    /// Completed locally; payment stays outstanding until collected on site
    Immediate {
        confirmed_at: i64,
        payment_expiry: i64,
    },
    /// The caller must send the customer to `redirect_target`
    RedirectRequired {
        gateway_correlation_id: String,
        redirect_target: String,
    },
}

/// Inbound push notification from a gateway
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayNotification {
    pub correlation_id: String,
    /// Gateway-declared final outcome
    pub paid: bool,
    /// Amount in the gateway currency's minor units
    pub amount_minor: i64,
}

/// Where a reconciliation fact came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactSource {
    Push,
    Pull,
    Direct,
}

/// What reconciliation did with a fact
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactOutcome {
    Applied,
    AlreadyPaid,
    Orphaned,
    AmountMismatch,
    NotPaid,
    BookingClosed,
}

/// Append-only reconciliation log entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentFact {
    pub booking_id: i64,
    /// Assigned by storage, per booking
    pub sequence: u64,
    /// Absent for payments collected without a gateway session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub source: FactSource,
    pub amount: Decimal,
    pub outcome: FactOutcome,
    pub recorded_at: i64,
}

/// Reconciliation fact held for manual review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewItem {
    pub booking_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub expected: Decimal,
    pub received: Decimal,
    pub reason: String,
    pub flagged_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(
            "cash_on_delivery".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CashOnDelivery
        );
        assert_eq!(
            "wallet".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::WalletRedirect
        );
        assert_eq!(
            "card-redirect".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CardRedirect
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_is_redirect() {
        assert!(!PaymentMethod::CashOnDelivery.is_redirect());
        assert!(PaymentMethod::WalletRedirect.is_redirect());
        assert!(PaymentMethod::CardRedirect.is_redirect());
    }

    #[test]
    fn test_dispatch_result_tagged_json() {
        let result = DispatchResult::RedirectRequired {
            gateway_correlation_id: "sess_1".to_string(),
            redirect_target: "https://pay.example/sess_1".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "REDIRECT_REQUIRED");
        assert_eq!(json["gateway_correlation_id"], "sess_1");
    }
}
