//! BookingService facade
//!
//! Single entry point over creation, dispatch, refunds and reconciliation.
//! Callers pass `now` explicitly; the server reads the wall clock.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    BankDetails, Booking, CanonicalStatus, DispatchResult, FactSource, GatewayNotification,
    PaymentFact, PaymentMethod, RefundQuote, RefundRequest, RefundRequestState, ReviewItem,
};

use crate::config::EngineConfig;
use crate::dispatch::PaymentDispatcher;
use crate::error::EngineResult;
use crate::gateway::Gateways;
use crate::pricing::{self, BookingDraft};
use crate::reconcile::{PollSummary, ReconcileOutcome, Reconciler};
use crate::refund::RefundWorkflow;
use crate::status::derive_status;
use crate::storage::BookingRepository;

/// A booking as displayed: stored fields plus derived state
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub status: CanonicalStatus,
    pub refund: RefundRequestState,
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingRepository>,
    config: Arc<EngineConfig>,
    dispatcher: PaymentDispatcher,
    refunds: RefundWorkflow,
    reconciler: Reconciler,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingRepository>, gateways: Gateways, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        Self {
            dispatcher: PaymentDispatcher::new(store.clone(), gateways.clone(), config.clone()),
            refunds: RefundWorkflow::new(store.clone()),
            reconciler: Reconciler::new(store.clone(), gateways, config.clone()),
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========== Bookings ==========

    pub fn create_booking(
        &self,
        draft: BookingDraft,
        available_capacity: u32,
        now: i64,
    ) -> EngineResult<Booking> {
        pricing::create_booking(self.store.as_ref(), draft, available_capacity, now)
    }

    pub fn get_booking(&self, booking_id: i64, now: i64) -> EngineResult<BookingView> {
        let booking = self.store.load_booking(booking_id)?;
        let refund = self.refunds.get_status(booking_id)?;
        Ok(BookingView {
            status: derive_status(&booking, now),
            booking,
            refund,
        })
    }

    pub async fn dispatch(
        &self,
        booking_id: i64,
        method: PaymentMethod,
        now: i64,
    ) -> EngineResult<DispatchResult> {
        self.dispatcher.dispatch(booking_id, method, now).await
    }

    // ========== Refunds ==========

    pub fn cancellation_quote(&self, booking_id: i64, now: i64) -> EngineResult<RefundQuote> {
        self.refunds.cancellation_quote(booking_id, now)
    }

    pub fn submit_refund(
        &self,
        booking_id: i64,
        bank: BankDetails,
        customer_reason: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        self.refunds.submit(booking_id, bank, customer_reason, now)
    }

    pub fn confirm_refund(
        &self,
        refund_request_id: i64,
        reason: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        self.refunds.confirm(refund_request_id, reason, now)
    }

    pub fn reject_refund(
        &self,
        refund_request_id: i64,
        reason: Option<String>,
        now: i64,
    ) -> EngineResult<RefundRequest> {
        self.refunds.reject(refund_request_id, reason, now)
    }

    pub fn refund_status(&self, booking_id: i64) -> EngineResult<RefundRequestState> {
        self.refunds.get_status(booking_id)
    }

    pub fn refund_request(&self, booking_id: i64) -> EngineResult<Option<RefundRequest>> {
        self.refunds.load(booking_id)
    }

    pub fn list_pending_refunds(&self) -> EngineResult<Vec<RefundRequest>> {
        self.refunds.list_pending()
    }

    // ========== Reconciliation ==========

    pub fn apply_payment_confirmation(
        &self,
        booking_id: i64,
        correlation_id: Option<&str>,
        amount: Decimal,
        source: FactSource,
        now: i64,
    ) -> EngineResult<ReconcileOutcome> {
        self.reconciler
            .apply_payment_confirmation(booking_id, correlation_id, amount, source, now)
    }

    /// Staff recorded a payment collected in person against the booking's
    /// current payment session
    pub fn record_direct_payment(
        &self,
        booking_id: i64,
        amount: Decimal,
        now: i64,
    ) -> EngineResult<ReconcileOutcome> {
        let booking = self.store.load_booking(booking_id)?;
        self.reconciler.apply_payment_confirmation(
            booking_id,
            booking.gateway_correlation_id.as_deref(),
            amount,
            FactSource::Direct,
            now,
        )
    }

    pub fn handle_notification(
        &self,
        method: PaymentMethod,
        notification: &GatewayNotification,
        now: i64,
    ) -> EngineResult<ReconcileOutcome> {
        self.reconciler.handle_notification(method, notification, now)
    }

    pub async fn poll_booking(&self, booking_id: i64, now: i64) -> EngineResult<ReconcileOutcome> {
        self.reconciler.poll_booking(booking_id, now).await
    }

    pub async fn poll_outstanding(&self, now: i64) -> EngineResult<PollSummary> {
        self.reconciler.poll_outstanding(now).await
    }

    pub fn payment_facts(&self, booking_id: i64) -> EngineResult<Vec<PaymentFact>> {
        Ok(self.store.list_payment_facts(booking_id)?)
    }

    pub fn list_review_items(&self) -> EngineResult<Vec<ReviewItem>> {
        Ok(self.store.list_review_items()?)
    }
}
