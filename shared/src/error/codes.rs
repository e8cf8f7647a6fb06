//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Booking errors
//! - 5xxx: Payment errors
//! - 6xxx: Refund errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Missing or invalid credentials
    NotAuthenticated = 6,

    // ==================== 4xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 4001,
    /// Booking is not in a cancellable state
    BookingNotCancellable = 4002,
    /// Booking is refunded or auto-cancelled
    BookingClosed = 4003,
    /// Requested guests/units exceed what is available
    CapacityExceeded = 4005,
    /// Order is unknown to the gateway or already settled
    InvalidOrder = 4006,
    /// Booking was modified concurrently
    ConcurrentModification = 4007,
    /// Order code already in use
    OrderCodeExists = 4008,

    // ==================== 5xxx: Payment ====================
    /// Gateway session could not be created
    PaymentInitFailed = 5001,
    /// Gateway call failed
    GatewayError = 5002,
    /// Reconciled amount does not match the booking total
    PaymentAmountMismatch = 5003,
    /// Payment method not supported here
    PaymentInvalidMethod = 5004,
    /// Webhook signature missing or invalid
    InvalidSignature = 5005,

    // ==================== 6xxx: Refund ====================
    /// Refund request not found
    RefundRequestNotFound = 6001,
    /// A refund request already exists for the booking
    RefundDuplicateRequest = 6002,
    /// Refund request was already confirmed or rejected
    RefundAlreadyProcessed = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::NotAuthenticated => "Not authenticated",

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::BookingNotCancellable => "Booking cannot be cancelled in its current state",
            ErrorCode::BookingClosed => "Booking is already refunded or cancelled",
            ErrorCode::CapacityExceeded => "Not enough capacity available",
            ErrorCode::InvalidOrder => "Order is unknown or already settled",
            ErrorCode::ConcurrentModification => "Booking was modified concurrently, retry",
            ErrorCode::OrderCodeExists => "Order code already exists",

            // Payment
            ErrorCode::PaymentInitFailed => "Payment could not be initiated",
            ErrorCode::GatewayError => "Payment gateway error",
            ErrorCode::PaymentAmountMismatch => "Payment amount does not match order total",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::InvalidSignature => "Invalid notification signature",

            // Refund
            ErrorCode::RefundRequestNotFound => "Refund request not found",
            ErrorCode::RefundDuplicateRequest => "A refund request already exists for this booking",
            ErrorCode::RefundAlreadyProcessed => "Refund request has already been processed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::NotAuthenticated),

            // Booking
            4001 => Ok(ErrorCode::BookingNotFound),
            4002 => Ok(ErrorCode::BookingNotCancellable),
            4003 => Ok(ErrorCode::BookingClosed),
            4005 => Ok(ErrorCode::CapacityExceeded),
            4006 => Ok(ErrorCode::InvalidOrder),
            4007 => Ok(ErrorCode::ConcurrentModification),
            4008 => Ok(ErrorCode::OrderCodeExists),

            // Payment
            5001 => Ok(ErrorCode::PaymentInitFailed),
            5002 => Ok(ErrorCode::GatewayError),
            5003 => Ok(ErrorCode::PaymentAmountMismatch),
            5004 => Ok(ErrorCode::PaymentInvalidMethod),
            5005 => Ok(ErrorCode::InvalidSignature),

            // Refund
            6001 => Ok(ErrorCode::RefundRequestNotFound),
            6002 => Ok(ErrorCode::RefundDuplicateRequest),
            6003 => Ok(ErrorCode::RefundAlreadyProcessed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
