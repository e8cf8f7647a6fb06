//! Payment dispatch
//!
//! Each payment method is one variant of [`PaymentAction`]. Cash on delivery
//! completes locally; the redirect methods create a gateway session and hand
//! back a redirect target. Gateway calls happen outside any storage
//! transaction and the correlation id is persisted only after success,
//! conditional on the booking version read before the call.

mod cash;
mod redirect;

pub use cash::CashOnDeliveryAction;
pub use redirect::RedirectAction;

use std::sync::Arc;

use async_trait::async_trait;
use shared::{Booking, CanonicalStatus, DispatchResult, PaymentMethod};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::gateway::Gateways;
use crate::status::derive_status;
use crate::storage::BookingRepository;

/// Everything a payment action may touch
pub struct DispatchContext<'a> {
    pub store: &'a dyn BookingRepository,
    pub gateways: &'a Gateways,
    pub config: &'a EngineConfig,
    pub now: i64,
}

impl DispatchContext<'_> {
    /// Load a booking that can still take a payment dispatch
    fn load_dispatchable(&self, booking_id: i64) -> EngineResult<Booking> {
        let booking = self.store.load_booking(booking_id)?;
        if booking.is_paid() {
            return Err(EngineError::invalid_order(&booking.order_code, "already paid"));
        }
        if booking.order_status.is_closed() {
            return Err(EngineError::invalid_order(
                &booking.order_code,
                format!("order is {}", booking.order_status),
            ));
        }
        if derive_status(&booking, self.now) == CanonicalStatus::AutoCancelled {
            return Err(EngineError::invalid_order(
                &booking.order_code,
                "payment window has expired",
            ));
        }
        Ok(booking)
    }
}

#[async_trait]
pub trait PaymentHandler {
    async fn execute(&self, ctx: &DispatchContext<'_>) -> EngineResult<DispatchResult>;
}

/// A request to pay a booking with a given method
#[derive(Debug, Clone, Copy)]
pub struct DispatchCommand {
    pub booking_id: i64,
    pub method: PaymentMethod,
}

/// PaymentAction enum - dispatches to the concrete method implementations
pub enum PaymentAction {
    CashOnDelivery(CashOnDeliveryAction),
    WalletRedirect(RedirectAction),
    CardRedirect(RedirectAction),
}

#[async_trait]
impl PaymentHandler for PaymentAction {
    async fn execute(&self, ctx: &DispatchContext<'_>) -> EngineResult<DispatchResult> {
        match self {
            PaymentAction::CashOnDelivery(action) => action.execute(ctx).await,
            PaymentAction::WalletRedirect(action) => action.execute(ctx).await,
            PaymentAction::CardRedirect(action) => action.execute(ctx).await,
        }
    }
}

/// This is the ONLY place with a match on PaymentMethod for dispatch.
impl From<&DispatchCommand> for PaymentAction {
    fn from(cmd: &DispatchCommand) -> Self {
        match cmd.method {
            PaymentMethod::CashOnDelivery => PaymentAction::CashOnDelivery(CashOnDeliveryAction {
                booking_id: cmd.booking_id,
            }),
            PaymentMethod::WalletRedirect => PaymentAction::WalletRedirect(RedirectAction {
                booking_id: cmd.booking_id,
                method: PaymentMethod::WalletRedirect,
            }),
            PaymentMethod::CardRedirect => PaymentAction::CardRedirect(RedirectAction {
                booking_id: cmd.booking_id,
                method: PaymentMethod::CardRedirect,
            }),
        }
    }
}

/// Entry point for payment dispatch
#[derive(Clone)]
pub struct PaymentDispatcher {
    store: Arc<dyn BookingRepository>,
    gateways: Gateways,
    config: Arc<EngineConfig>,
}

impl PaymentDispatcher {
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

    pub async fn dispatch(
        &self,
        booking_id: i64,
        method: PaymentMethod,
        now: i64,
    ) -> EngineResult<DispatchResult> {
        let ctx = DispatchContext {
            store: self.store.as_ref(),
            gateways: &self.gateways,
            config: &self.config,
            now,
        };
        let action = PaymentAction::from(&DispatchCommand { booking_id, method });

        match action.execute(&ctx).await {
            Ok(result) => {
                tracing::info!(booking_id, method = %method, "Payment dispatched");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(booking_id, method = %method, error = %e, "Payment dispatch failed");
                Err(e)
            }
        }
    }
}
