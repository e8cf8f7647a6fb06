//! Input validation helpers
//!
//! Centralized text length limits and validation functions for booking
//! creation and refund submission.

use shared::BankDetails;

use crate::error::EngineError;

// ── Text length limits ──────────────────────────────────────────────

/// Names: customer, bank, account holder
pub const MAX_NAME_LEN: usize = 200;

/// Reasons and staff notes
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: order code, phone, ID number
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Bank account number length bounds (digits only)
pub const ACCOUNT_NUMBER_MIN_DIGITS: usize = 8;
pub const ACCOUNT_NUMBER_MAX_DIGITS: usize = 20;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(format!("{field} must not be empty")));
    }
    validate_max_len(value, field, max_len)
}

/// Validate only the length limit; empty is allowed.
pub fn validate_max_len(value: &str, field: &str, max_len: usize) -> Result<(), EngineError> {
    if value.len() > max_len {
        return Err(EngineError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), EngineError> {
    if let Some(v) = value {
        validate_max_len(v, field, max_len)?;
    }
    Ok(())
}

/// Account number must match `^[0-9]{8,20}$`
pub fn is_valid_account_number(value: &str) -> bool {
    (ACCOUNT_NUMBER_MIN_DIGITS..=ACCOUNT_NUMBER_MAX_DIGITS).contains(&value.len())
        && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validate refund payout details before a request is accepted
pub fn validate_bank_details(bank: &BankDetails) -> Result<(), EngineError> {
    validate_required_text(&bank.bank_name, "bank_name", MAX_NAME_LEN)?;
    validate_required_text(&bank.account_holder, "account_holder", MAX_NAME_LEN)?;
    if !is_valid_account_number(&bank.account_number) {
        return Err(EngineError::validation(format!(
            "account_number must be {ACCOUNT_NUMBER_MIN_DIGITS}-{ACCOUNT_NUMBER_MAX_DIGITS} digits"
        )));
    }
    Ok(())
}
