//! Customer refund request workflow
//!
//! ```text
//! NONE ──submit──► PENDING_STAFF_CONFIRMATION ──confirm──► CONFIRMED (booking → REFUNDED)
//!                                             └─reject───► REJECTED
//! ```
//!
//! A booking has at most one request. The quote is frozen at submission and
//! the request changes exactly once.

use std::sync::Arc;

use shared::util::snowflake_id;
use shared::{
    BankDetails, CanonicalStatus, RefundQuote, RefundRequest, RefundRequestState, RefundStatus,
};

use crate::error::{EngineError, EngineResult};
use crate::refund_policy::quote_refund;
use crate::status::derive_status;
use crate::storage::{BookingRepository, RefundDecision, RefundResolution};
use crate::validation::{MAX_NOTE_LEN, validate_bank_details, validate_optional_text};

/// Refund request state machine over the booking store
#[derive(Clone)]
pub struct RefundWorkflow {
    store: Arc<dyn BookingRepository>,
}

impl RefundWorkflow {
    pub fn new(store: Arc<dyn BookingRepository>) -> Self {
        Self { store }
    }

    /// Quote a cancellation for a booking that may currently be refunded
    pub fn cancellation_quote(&self, booking_id: i64, now: i64) -> EngineResult<RefundQuote> {
        let booking = self.store.load_booking(booking_id)?;
        let status = derive_status(&booking, now);
        if !booking.is_paid() || status != CanonicalStatus::Confirmed {
            return Err(EngineError::NotCancellable { booking_id, status });
        }
        Ok(quote_refund(booking.order_total, booking.service_start, now))
    }

    /// Submit a refund request for a paid, confirmed booking
    pub fn submit(
        &self,
        booking_id: i64,
        bank: BankDetails,
        customer_reason: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        // 1. One request per booking
        if self.store.load_refund_request(booking_id)?.is_some() {
            return Err(EngineError::DuplicateRequest(booking_id));
        }

        // 2. Offerability gate, then freeze the quote
        let quote = self.cancellation_quote(booking_id, now)?;

        // 3. Input
        validate_bank_details(&bank)?;
        validate_optional_text(&customer_reason, "reason", MAX_NOTE_LEN)?;

        let request = RefundRequest {
            id: snowflake_id(),
            booking_id,
            days_before: quote.days_before,
            rate_percent: quote.rate_percent,
            amount: quote.amount,
            bank,
            customer_reason,
            status: RefundStatus::PendingStaffConfirmation,
            staff_note: None,
            requested_at: now,
            processed_at: None,
        };

        // 4. Insert-if-absent; a lost race surfaces as DuplicateRequest
        self.store.insert_refund_request(&request)?;

        tracing::info!(
            booking_id,
            refund_request_id = request.id,
            rate_percent = request.rate_percent,
            amount = %request.amount,
            "Refund request submitted"
        );
        Ok(request)
    }

    /// Staff approval; the booking moves to REFUNDED in the same write
    pub fn confirm(
        &self,
        refund_request_id: i64,
        reason: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        self.decide(refund_request_id, RefundResolution::Confirm, reason, now)
    }

    /// Staff rejection; the booking is untouched
    pub fn reject(
        &self,
        refund_request_id: i64,
        reason: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        self.decide(refund_request_id, RefundResolution::Reject, reason, now)
    }

    fn decide(
        &self,
        refund_request_id: i64,
        resolution: RefundResolution,
        staff_note: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        validate_optional_text(&staff_note, "reason", MAX_NOTE_LEN)?;

        let request = self.store.save_refund_decision(&RefundDecision {
            request_id: refund_request_id,
            resolution,
            staff_note,
            processed_at: now,
        })?;

        tracing::info!(
            refund_request_id,
            booking_id = request.booking_id,
            status = ?request.status,
            "Refund request processed"
        );
        Ok(request)
    }

    /// `None` when no request was ever submitted
    pub fn get_status(&self, booking_id: i64) -> EngineResult<RefundRequestState> {
        let request = self.store.load_refund_request(booking_id)?;
        Ok(RefundRequestState::from(request.map(|r| r.status)))
    }

    pub fn load(&self, booking_id: i64) -> EngineResult<Option<RefundRequest>> {
        Ok(self.store.load_refund_request(booking_id)?)
    }

    pub fn list_pending(&self) -> EngineResult<Vec<RefundRequest>> {
        Ok(self.store.list_pending_refunds()?)
    }
}
