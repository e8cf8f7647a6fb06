//! Engine error taxonomy
//!
//! Every failure the engine reports is a distinct variant; callers match on
//! variants (or on [`ErrorKind`]) and never on message text.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::{CanonicalStatus, OrderStatus, PaymentMethod};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Requested {requested} guests/units but only {available} available")]
    CapacityExceeded { requested: u32, available: u32 },

    #[error("Booking not found: {0}")]
    BookingNotFound(i64),

    #[error("Refund request not found: {0}")]
    RefundRequestNotFound(i64),

    #[error("Booking {booking_id} cannot be cancelled while {status}")]
    NotCancellable {
        booking_id: i64,
        status: CanonicalStatus,
    },

    #[error("Refund request already exists for booking {0}")]
    DuplicateRequest(i64),

    #[error("Refund request {0} has already been processed")]
    AlreadyProcessed(i64),

    #[error("Invalid order {order_code}: {reason}")]
    InvalidOrder { order_code: String, reason: String },

    #[error("Booking {booking_id} is closed ({status})")]
    BookingClosed { booking_id: i64, status: OrderStatus },

    #[error("Booking {0} was modified concurrently")]
    Conflict(i64),

    #[error("Order code already exists: {0}")]
    OrderCodeExists(String),

    #[error("Payment method {0} has no gateway")]
    UnsupportedMethod(PaymentMethod),

    #[error("Payment initialization failed: {message}")]
    PaymentInit { message: String },

    #[error("Gateway error: {message}")]
    Gateway { message: String },

    #[error("Amount mismatch for booking {booking_id}: expected {expected}, received {received}")]
    AmountMismatch {
        booking_id: i64,
        expected: Decimal,
        received: Decimal,
    },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

/// Coarse classification used for logging and HTTP mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, fixable by the user
    Validation,
    /// Action not allowed in the current state
    InvalidState,
    /// Payment provider failed; state untouched, retryable
    ExternalGateway,
    /// Held for manual review
    AmountMismatch,
    NotFound,
    Internal,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::CapacityExceeded { .. } => ErrorKind::Validation,
            Self::BookingNotFound(_) | Self::RefundRequestNotFound(_) => ErrorKind::NotFound,
            Self::NotCancellable { .. }
            | Self::DuplicateRequest(_)
            | Self::AlreadyProcessed(_)
            | Self::InvalidOrder { .. }
            | Self::BookingClosed { .. }
            | Self::Conflict(_)
            | Self::OrderCodeExists(_)
            | Self::UnsupportedMethod(_) => ErrorKind::InvalidState,
            Self::PaymentInit { .. } | Self::Gateway { .. } => ErrorKind::ExternalGateway,
            Self::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_order(order_code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOrder {
            order_code: order_code.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::BookingNotFound(id) => Self::BookingNotFound(id),
            StorageError::RefundRequestNotFound(id) => Self::RefundRequestNotFound(id),
            StorageError::VersionConflict { booking_id, .. } => Self::Conflict(booking_id),
            StorageError::OrderCodeExists(code) => Self::OrderCodeExists(code),
            StorageError::RefundRequestExists(booking_id) => Self::DuplicateRequest(booking_id),
            StorageError::RefundAlreadyProcessed(id) => Self::AlreadyProcessed(id),
            other => Self::Storage(other),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::Validation(_) => AppError::with_message(ErrorCode::ValidationFailed, message),
            EngineError::CapacityExceeded {
                requested,
                available,
            } => AppError::with_message(ErrorCode::CapacityExceeded, message)
                .with_detail("requested", requested)
                .with_detail("available", available),
            EngineError::BookingNotFound(id) => {
                AppError::with_message(ErrorCode::BookingNotFound, message).with_detail("booking_id", id)
            }
            EngineError::RefundRequestNotFound(id) => {
                AppError::with_message(ErrorCode::RefundRequestNotFound, message)
                    .with_detail("refund_request_id", id)
            }
            EngineError::NotCancellable { status, .. } => {
                AppError::with_message(ErrorCode::BookingNotCancellable, message)
                    .with_detail("status", status.as_str())
            }
            EngineError::DuplicateRequest(_) => {
                AppError::with_message(ErrorCode::RefundDuplicateRequest, message)
            }
            EngineError::AlreadyProcessed(_) => {
                AppError::with_message(ErrorCode::RefundAlreadyProcessed, message)
            }
            EngineError::InvalidOrder { .. } => AppError::with_message(ErrorCode::InvalidOrder, message),
            EngineError::BookingClosed { .. } => AppError::with_message(ErrorCode::BookingClosed, message),
            EngineError::Conflict(_) => {
                AppError::with_message(ErrorCode::ConcurrentModification, message)
            }
            EngineError::OrderCodeExists(_) => {
                AppError::with_message(ErrorCode::OrderCodeExists, message)
            }
            EngineError::UnsupportedMethod(_) => {
                AppError::with_message(ErrorCode::PaymentInvalidMethod, message)
            }
            EngineError::PaymentInit { message: gateway_message } => {
                AppError::with_message(ErrorCode::PaymentInitFailed, message)
                    .with_detail("gateway_message", gateway_message)
            }
            EngineError::Gateway { .. } => AppError::with_message(ErrorCode::GatewayError, message),
            EngineError::AmountMismatch {
                expected, received, ..
            } => AppError::with_message(ErrorCode::PaymentAmountMismatch, message)
                .with_detail("expected", expected.to_string())
                .with_detail("received", received.to_string()),
            EngineError::Storage(e) => {
                tracing::error!(error = %e, "Storage error occurred");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(EngineError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            EngineError::DuplicateRequest(1).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            EngineError::PaymentInit {
                message: "declined".into()
            }
            .kind(),
            ErrorKind::ExternalGateway
        );
        assert_eq!(
            EngineError::AmountMismatch {
                booking_id: 1,
                expected: Decimal::from(100),
                received: Decimal::from(90),
            }
            .kind(),
            ErrorKind::AmountMismatch
        );
    }

    #[test]
    fn test_storage_conflict_maps_to_conflict() {
        let err: EngineError = StorageError::VersionConflict {
            booking_id: 7,
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, EngineError::Conflict(7)));

        let err: EngineError = StorageError::RefundRequestExists(7).into();
        assert!(matches!(err, EngineError::DuplicateRequest(7)));
    }

    #[test]
    fn test_app_error_mapping_keeps_gateway_message() {
        let app: AppError = EngineError::PaymentInit {
            message: "merchant disabled".into(),
        }
        .into();
        assert_eq!(app.code, ErrorCode::PaymentInitFailed);
        let details = app.details.unwrap();
        assert_eq!(details.get("gateway_message").unwrap(), "merchant disabled");

        let app: AppError = EngineError::AlreadyProcessed(3).into();
        assert_eq!(app.code, ErrorCode::RefundAlreadyProcessed);
    }
}
