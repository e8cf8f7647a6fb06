//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::BookingNotFound | Self::RefundRequestNotFound => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderCodeExists
            | Self::BookingNotCancellable
            | Self::BookingClosed
            | Self::InvalidOrder
            | Self::ConcurrentModification
            | Self::RefundDuplicateRequest
            | Self::RefundAlreadyProcessed => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::InvalidSignature | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 422 Unprocessable (held for manual review)
            Self::PaymentAmountMismatch => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 Bad Gateway (upstream payment provider failed)
            Self::PaymentInitFailed | Self::GatewayError => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
