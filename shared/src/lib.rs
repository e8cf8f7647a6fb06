//! Shared types for the booking workspace
//!
//! Domain types for bookings, refund requests and payments, plus the
//! unified error system and small utilities used by both the engine and
//! the HTTP service.

pub mod booking;
pub mod error;
pub mod payment;
pub mod refund;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use booking::{
    Booking, BookingPaymentFields, CanonicalStatus, Capacity, CustomerInfo, OrderStatus,
    Surcharge,
};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use payment::{
    DispatchResult, FactOutcome, FactSource, GatewayNotification, PaymentFact, PaymentMethod,
    PaymentStatus, ReviewItem,
};
pub use refund::{BankDetails, RefundQuote, RefundRequest, RefundRequestState, RefundStatus};
