//! Redirect-based methods (wallet, card): completion arrives asynchronously
//! through reconciliation

use async_trait::async_trait;
use shared::{BookingPaymentFields, DispatchResult, PaymentMethod, PaymentStatus};

use super::{DispatchContext, PaymentHandler};
use crate::error::{EngineError, EngineResult};
use crate::gateway::OrderLookup;
use crate::{clock, money};

/// Redirect action, shared by the wallet and card variants
#[derive(Debug, Clone)]
pub struct RedirectAction {
    pub booking_id: i64,
    pub method: PaymentMethod,
}

#[async_trait]
impl PaymentHandler for RedirectAction {
    async fn execute(&self, ctx: &DispatchContext<'_>) -> EngineResult<DispatchResult> {
        // 1. Booking must be UNPAID and open
        let booking = ctx.load_dispatchable(self.booking_id)?;
        let gateway = ctx
            .gateways
            .for_method(self.method)
            .ok_or(EngineError::UnsupportedMethod(self.method))?;

        // 2. External existence check on the order code
        match gateway.lookup_order(&booking.order_code).await {
            Ok(OrderLookup::Payable) => {}
            Ok(OrderLookup::Settled) => {
                return Err(EngineError::invalid_order(
                    &booking.order_code,
                    "already settled on the gateway",
                ));
            }
            Ok(OrderLookup::Unknown) => {
                return Err(EngineError::invalid_order(
                    &booking.order_code,
                    "unknown to the gateway",
                ));
            }
            Err(e) => {
                tracing::warn!(
                    booking_id = booking.id,
                    gateway = gateway.name(),
                    error = %e,
                    "Gateway order lookup failed"
                );
                return Err(EngineError::Gateway {
                    message: e.gateway_message(),
                });
            }
        }

        // 3. Create the session; nothing is written on failure
        let amount_minor = money::to_minor_units(booking.order_total, ctx.config.minor_unit_exponent)?;
        let session = gateway
            .create_session(&booking.order_code, amount_minor, &ctx.config.currency)
            .await
            .map_err(|e| {
                tracing::warn!(
                    booking_id = booking.id,
                    gateway = gateway.name(),
                    error = %e,
                    "Gateway session creation failed"
                );
                EngineError::PaymentInit {
                    message: e.gateway_message(),
                }
            })?;

        // 4. Persist correlation id and deferred expiry, conditional on the
        //    version read in step 1
        let fields = BookingPaymentFields {
            payment_method: Some(self.method),
            payment_status: PaymentStatus::Unpaid,
            gateway_correlation_id: Some(session.correlation_id.clone()),
            payment_expiry: Some(clock::add_days(ctx.now, ctx.config.deferred_window_days)),
            paid_at: None,
        };
        ctx.store
            .save_booking_payment_fields(booking.id, booking.version, &fields)?;

        tracing::debug!(
            booking_id = booking.id,
            correlation_id = %session.correlation_id,
            "Gateway session created"
        );

        Ok(DispatchResult::RedirectRequired {
            gateway_correlation_id: session.correlation_id,
            redirect_target: session.redirect_url,
        })
    }
}
