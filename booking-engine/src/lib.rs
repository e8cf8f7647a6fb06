//! Booking lifecycle and refund settlement engine
//!
//! - **status**: canonical status derivation from stored fields and time
//! - **refund_policy**: time-tiered refund quotes
//! - **pricing**: booking creation, tier pricing, one-time capacity check
//! - **dispatch**: payment dispatch (local completion or gateway redirect)
//! - **refund**: customer refund request workflow with staff confirmation
//! - **reconcile**: push/pull gateway confirmation funnel
//! - **storage**: data-access trait and the redb implementation
//!
//! # Data Flow
//!
//! ```text
//! load booking → derive_status ──► quote_refund (cancellation preview)
//!                    │
//!                    ├─► dispatch ──► GatewayClient::create_session
//!                    │                      │
//!                    │            persist correlation id
//!                    │                      ▼
//!                    │      push notification / poll ──► apply_payment_confirmation
//!                    │                                          │
//!                    └─► refund submit ──► staff confirm ───────┴─► storage
//! ```

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod money;
pub mod pricing;
pub mod reconcile;
pub mod refund;
pub mod refund_policy;
pub mod service;
pub mod status;
pub mod storage;
pub mod validation;

// Re-exports
pub use config::EngineConfig;
pub use dispatch::{PaymentAction, PaymentDispatcher, PaymentHandler};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use gateway::{GatewayClient, GatewayError, Gateways, HttpGateway, HttpGatewayConfig};
pub use pricing::BookingDraft;
pub use reconcile::{PollSummary, ReconcileOutcome, Reconciler};
pub use refund::RefundWorkflow;
pub use refund_policy::quote_refund;
pub use service::{BookingService, BookingView};
pub use status::derive_status;
pub use storage::{BookingRepository, RedbBookingStore, StorageError};

#[cfg(test)]
pub(crate) mod test_support;
