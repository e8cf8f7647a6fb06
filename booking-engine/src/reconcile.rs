//! Payment reconciliation
//!
//! Push notifications and pull results both end in
//! [`Reconciler::apply_payment_confirmation`], the only path that marks a
//! booking PAID. Every outcome is appended to the payment fact log; rejected
//! facts (amount mismatch, payment on a closed booking) also go to the
//! manual review queue and leave the booking untouched.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    Booking, FactOutcome, FactSource, GatewayNotification, PaymentFact, PaymentMethod,
    PaymentStatus, ReviewItem,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::gateway::Gateways;
use crate::money;
use crate::storage::{BookingRepository, StorageError};

/// What a reconciliation call did
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// Booking marked PAID by this call
    Applied(Booking),
    /// Already PAID; nothing written
    AlreadyPaid,
    /// Correlation id is not the booking's current session; ignored
    Orphaned,
    /// Gateway reports the session as not paid
    NotPaid,
    /// Nothing to poll (no gateway session)
    NoSession,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied(_) => "APPLIED",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::Orphaned => "ORPHANED",
            Self::NotPaid => "NOT_PAID",
            Self::NoSession => "NO_SESSION",
        }
    }
}

/// Result of one pull pass over outstanding redirects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub checked: usize,
    pub applied: usize,
    pub failed: usize,
    /// Skipped: the current session is already held for manual review
    pub held: usize,
}

#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn BookingRepository>,
    gateways: Gateways,
    config: Arc<EngineConfig>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn BookingRepository>,
        gateways: Gateways,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            store,
            gateways,
            config,
        }
    }

    /// Fold one confirmed payment into the booking.
    ///
    /// `correlation_id` is `None` for payments collected without a gateway
    /// session (cash on delivery). Safe under repeated and concurrent calls.
    pub fn apply_payment_confirmation(
        &self,
        booking_id: i64,
        correlation_id: Option<&str>,
        amount: Decimal,
        source: FactSource,
        now: i64,
    ) -> EngineResult<ReconcileOutcome> {
        let mut retries = 0;
        loop {
            let booking = self.store.load_booking(booking_id)?;
            let fact = |outcome| PaymentFact {
                booking_id,
                sequence: 0,
                correlation_id: correlation_id.map(String::from),
                source,
                amount,
                outcome,
                recorded_at: now,
            };

            // 1. Superseded session
            if booking.gateway_correlation_id.as_deref() != correlation_id {
                tracing::info!(booking_id, ?correlation_id, "Ignoring orphaned payment confirmation");
                self.record(fact(FactOutcome::Orphaned));
                return Ok(ReconcileOutcome::Orphaned);
            }

            // 2. Idempotent replay
            if booking.is_paid() {
                self.record(fact(FactOutcome::AlreadyPaid));
                return Ok(ReconcileOutcome::AlreadyPaid);
            }

            // 3. Closed bookings take no payment
            if booking.order_status.is_closed() {
                tracing::warn!(
                    booking_id,
                    status = %booking.order_status,
                    "Payment received for closed booking, flagged for review"
                );
                self.flag(&booking, correlation_id, amount, "payment received for closed booking", now)?;
                self.record(fact(FactOutcome::BookingClosed));
                return Err(EngineError::BookingClosed {
                    booking_id,
                    status: booking.order_status,
                });
            }

            // 4. Amount must match the immutable total, in the gateway
            //    currency's minor units
            if !money::same_minor_amount(amount, booking.order_total, self.config.minor_unit_exponent)? {
                tracing::warn!(
                    booking_id,
                    expected = %booking.order_total,
                    received = %amount,
                    "Payment amount mismatch, flagged for review"
                );
                self.flag(&booking, correlation_id, amount, "amount mismatch", now)?;
                self.record(fact(FactOutcome::AmountMismatch));
                return Err(EngineError::AmountMismatch {
                    booking_id,
                    expected: booking.order_total,
                    received: amount,
                });
            }

            // 5. Conditional write of PAID
            let mut fields = booking.payment_fields();
            fields.payment_status = PaymentStatus::Paid;
            fields.paid_at = Some(now);
            match self
                .store
                .save_booking_payment_fields(booking_id, booking.version, &fields)
            {
                Ok(updated) => {
                    self.record(fact(FactOutcome::Applied));
                    tracing::info!(booking_id, source = ?source, amount = %amount, "Payment applied");
                    return Ok(ReconcileOutcome::Applied(updated));
                }
                Err(StorageError::VersionConflict { .. })
                    if retries < self.config.max_confirmation_retries =>
                {
                    retries += 1;
                    tracing::debug!(booking_id, retries, "Version conflict applying payment, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Push path: a notification received from the gateway serving `method`
    pub fn handle_notification(
        &self,
        method: PaymentMethod,
        notification: &GatewayNotification,
        now: i64,
    ) -> EngineResult<ReconcileOutcome> {
        let Some(booking) = self
            .store
            .find_by_correlation_id(&notification.correlation_id)?
        else {
            tracing::warn!(
                correlation_id = %notification.correlation_id,
                "Notification for unknown correlation id"
            );
            return Ok(ReconcileOutcome::Orphaned);
        };

        let amount = money::from_minor_units(notification.amount_minor, self.config.minor_unit_exponent)?;
        if booking.payment_method != Some(method) {
            tracing::warn!(
                booking_id = booking.id,
                correlation_id = %notification.correlation_id,
                received_from = %method,
                booking_method = ?booking.payment_method,
                "Notification from a gateway the booking was not dispatched to"
            );
            self.record(PaymentFact {
                booking_id: booking.id,
                sequence: 0,
                correlation_id: Some(notification.correlation_id.clone()),
                source: FactSource::Push,
                amount,
                outcome: FactOutcome::Orphaned,
                recorded_at: now,
            });
            return Ok(ReconcileOutcome::Orphaned);
        }

        if !notification.paid {
            self.record(PaymentFact {
                booking_id: booking.id,
                sequence: 0,
                correlation_id: Some(notification.correlation_id.clone()),
                source: FactSource::Push,
                amount,
                outcome: FactOutcome::NotPaid,
                recorded_at: now,
            });
            return Ok(ReconcileOutcome::NotPaid);
        }

        self.apply_payment_confirmation(
            booking.id,
            Some(&notification.correlation_id),
            amount,
            FactSource::Push,
            now,
        )
    }

    /// Pull path: ask the gateway about the booking's current session
    pub async fn poll_booking(&self, booking_id: i64, now: i64) -> EngineResult<ReconcileOutcome> {
        let booking = self.store.load_booking(booking_id)?;
        if booking.is_paid() {
            return Ok(ReconcileOutcome::AlreadyPaid);
        }
        let (Some(correlation_id), Some(method)) =
            (booking.gateway_correlation_id.as_deref(), booking.payment_method)
        else {
            return Ok(ReconcileOutcome::NoSession);
        };
        let Some(gateway) = self.gateways.for_method(method) else {
            return Ok(ReconcileOutcome::NoSession);
        };

        let status = gateway
            .query_status(correlation_id)
            .await
            .map_err(|e| EngineError::Gateway {
                message: e.gateway_message(),
            })?;
        if !status.paid {
            return Ok(ReconcileOutcome::NotPaid);
        }

        let amount = money::from_minor_units(status.amount_minor, self.config.minor_unit_exponent)?;
        self.apply_payment_confirmation(booking_id, Some(correlation_id), amount, FactSource::Pull, now)
    }

    /// Poll every UNPAID booking that has a gateway session, except those
    /// whose session is already held for review
    pub async fn poll_outstanding(&self, now: i64) -> EngineResult<PollSummary> {
        let bookings = self.store.list_outstanding_redirects()?;
        let mut summary = PollSummary::default();

        for booking in bookings {
            if self
                .store
                .is_flagged_for_review(booking.id, booking.gateway_correlation_id.as_deref())?
            {
                summary.held += 1;
                continue;
            }
            summary.checked += 1;
            match self.poll_booking(booking.id, now).await {
                Ok(ReconcileOutcome::Applied(_)) => summary.applied += 1,
                Ok(_) => {}
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(booking_id = booking.id, error = %e, "Poll failed");
                }
            }
        }

        if summary.applied > 0 || summary.failed > 0 {
            tracing::debug!(
                checked = summary.checked,
                applied = summary.applied,
                failed = summary.failed,
                held = summary.held,
                "Poll pass finished"
            );
        }
        Ok(summary)
    }

    /// Append to the fact log; a failed append is logged, never propagated
    fn record(&self, fact: PaymentFact) {
        if let Err(e) = self.store.append_payment_fact(&fact) {
            tracing::error!(
                booking_id = fact.booking_id,
                outcome = ?fact.outcome,
                error = %e,
                "Failed to append payment fact"
            );
        }
    }

    fn flag(
        &self,
        booking: &Booking,
        correlation_id: Option<&str>,
        received: Decimal,
        reason: &str,
        now: i64,
    ) -> EngineResult<()> {
        let queued = self.store.flag_for_review(&ReviewItem {
            booking_id: booking.id,
            correlation_id: correlation_id.map(String::from),
            expected: booking.order_total,
            received,
            reason: reason.to_string(),
            flagged_at: now,
        })?;
        if !queued {
            tracing::debug!(booking_id = booking.id, ?correlation_id, "Already held for review");
        }
        Ok(())
    }
}
