//! Cash on delivery: completes locally, payment collected on site

use async_trait::async_trait;
use shared::{BookingPaymentFields, DispatchResult, PaymentMethod, PaymentStatus};

use super::{DispatchContext, PaymentHandler};
use crate::clock;
use crate::error::EngineResult;

/// CashOnDelivery action
#[derive(Debug, Clone)]
pub struct CashOnDeliveryAction {
    pub booking_id: i64,
}

#[async_trait]
impl PaymentHandler for CashOnDeliveryAction {
    async fn execute(&self, ctx: &DispatchContext<'_>) -> EngineResult<DispatchResult> {
        // 1. Booking must still accept a dispatch
        let booking = ctx.load_dispatchable(self.booking_id)?;

        // 2. Payment stays UNPAID with a short collection window; any earlier
        //    gateway session is dropped
        let payment_expiry = clock::add_hours(ctx.now, ctx.config.cash_on_delivery_window_hours);
        let fields = BookingPaymentFields {
            payment_method: Some(PaymentMethod::CashOnDelivery),
            payment_status: PaymentStatus::Unpaid,
            gateway_correlation_id: None,
            payment_expiry: Some(payment_expiry),
            paid_at: None,
        };

        // 3. Conditional write
        ctx.store
            .save_booking_payment_fields(booking.id, booking.version, &fields)?;

        Ok(DispatchResult::Immediate {
            confirmed_at: ctx.now,
            payment_expiry,
        })
    }
}
