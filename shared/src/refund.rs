//! Refund request types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bank payout details supplied by the customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// Time-tiered refund quote
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefundQuote {
    /// Whole days (rounded up) until service start; zero or negative once started
    pub days_before: i64,
    pub rate_percent: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    PendingStaffConfirmation,
    Confirmed,
    Rejected,
}

impl RefundStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PendingStaffConfirmation)
    }
}

/// Refund state of a booking as seen by callers
///
/// `None` (never requested) is distinct from `Rejected`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundRequestState {
    None,
    PendingStaffConfirmation,
    Confirmed,
    Rejected,
}

impl From<Option<RefundStatus>> for RefundRequestState {
    fn from(status: Option<RefundStatus>) -> Self {
        match status {
            None => Self::None,
            Some(RefundStatus::PendingStaffConfirmation) => Self::PendingStaffConfirmation,
            Some(RefundStatus::Confirmed) => Self::Confirmed,
            Some(RefundStatus::Rejected) => Self::Rejected,
        }
    }
}

/// Customer refund request, at most one per booking
///
/// The quote is frozen at submission; the request changes exactly once,
/// when staff confirm or reject it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefundRequest {
    pub id: i64,
    pub booking_id: i64,
    pub days_before: i64,
    pub rate_percent: u32,
    pub amount: Decimal,
    pub bank: BankDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reason: Option<String>,
    pub status: RefundStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_note: Option<String>,
    pub requested_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<i64>,
}

impl RefundRequest {
    pub fn quote(&self) -> RefundQuote {
        RefundQuote {
            days_before: self.days_before,
            rate_percent: self.rate_percent,
            amount: self.amount,
        }
    }
}
