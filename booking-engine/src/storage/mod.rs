//! Data-access layer
//!
//! [`BookingRepository`] is the seam the engine talks to; [`RedbBookingStore`]
//! is the embedded implementation. Every booking write is conditional on the
//! caller's expected `version`, and refund transitions are conditional on the
//! request still being pending.

mod redb_store;

pub use redb_store::RedbBookingStore;

use shared::{
    Booking, BookingPaymentFields, OrderStatus, PaymentFact, RefundRequest, RefundStatus,
    ReviewItem,
};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Booking not found: {0}")]
    BookingNotFound(i64),

    #[error("Refund request not found: {0}")]
    RefundRequestNotFound(i64),

    #[error("Version conflict on booking {booking_id}: expected {expected}, found {actual}")]
    VersionConflict {
        booking_id: i64,
        expected: u64,
        actual: u64,
    },

    #[error("Order code already exists: {0}")]
    OrderCodeExists(String),

    #[error("Booking already exists: {0}")]
    BookingExists(i64),

    #[error("Refund request already exists for booking {0}")]
    RefundRequestExists(i64),

    #[error("Refund request {0} is no longer pending")]
    RefundAlreadyProcessed(i64),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Staff verdict on a pending refund request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundResolution {
    Confirm,
    Reject,
}

impl RefundResolution {
    pub fn status(&self) -> RefundStatus {
        match self {
            Self::Confirm => RefundStatus::Confirmed,
            Self::Reject => RefundStatus::Rejected,
        }
    }
}

/// A pending → terminal refund transition
#[derive(Debug, Clone)]
pub struct RefundDecision {
    pub request_id: i64,
    pub resolution: RefundResolution,
    pub staff_note: Option<String>,
    pub processed_at: i64,
}

/// Persistence operations the engine depends on
pub trait BookingRepository: Send + Sync {
    // ========== Bookings ==========

    /// Insert a new booking; order codes are unique
    fn insert_booking(&self, booking: &Booking) -> StorageResult<()>;

    fn load_booking(&self, booking_id: i64) -> StorageResult<Booking>;

    /// Look up by any correlation id ever issued to the booking
    fn find_by_correlation_id(&self, correlation_id: &str) -> StorageResult<Option<Booking>>;

    /// Overwrite the payment fields if the stored version still matches.
    /// Returns the booking as written (version bumped).
    fn save_booking_payment_fields(
        &self,
        booking_id: i64,
        expected_version: u64,
        fields: &BookingPaymentFields,
    ) -> StorageResult<Booking>;

    /// Set the order status if the stored version still matches
    fn save_order_status(
        &self,
        booking_id: i64,
        expected_version: u64,
        status: OrderStatus,
    ) -> StorageResult<Booking>;

    /// UNPAID, not closed, with a gateway session outstanding
    fn list_outstanding_redirects(&self) -> StorageResult<Vec<Booking>>;

    // ========== Refund requests ==========

    fn load_refund_request(&self, booking_id: i64) -> StorageResult<Option<RefundRequest>>;

    fn load_refund_request_by_id(&self, request_id: i64) -> StorageResult<Option<RefundRequest>>;

    /// Insert-if-absent, keyed by booking
    fn insert_refund_request(&self, request: &RefundRequest) -> StorageResult<()>;

    /// Apply a staff decision to a pending request. Confirming also moves the
    /// booking to REFUNDED in the same transaction.
    fn save_refund_decision(&self, decision: &RefundDecision) -> StorageResult<RefundRequest>;

    fn list_pending_refunds(&self) -> StorageResult<Vec<RefundRequest>>;

    // ========== Reconciliation log ==========

    /// Append a fact; the per-booking sequence is assigned here
    fn append_payment_fact(&self, fact: &PaymentFact) -> StorageResult<PaymentFact>;

    fn list_payment_facts(&self, booking_id: i64) -> StorageResult<Vec<PaymentFact>>;

    /// Queue an item for manual review, at most once per booking and
    /// correlation id. Returns `false` when one was already queued.
    fn flag_for_review(&self, item: &ReviewItem) -> StorageResult<bool>;

    fn is_flagged_for_review(
        &self,
        booking_id: i64,
        correlation_id: Option<&str>,
    ) -> StorageResult<bool>;

    fn list_review_items(&self) -> StorageResult<Vec<ReviewItem>>;
}
