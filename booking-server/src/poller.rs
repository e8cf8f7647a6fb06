//! Background pull reconciliation
//!
//! Periodically asks the gateways about every booking with an outstanding
//! redirect session. Push notifications are the primary path; this catches
//! missed or delayed webhooks.

use std::time::Duration;

use booking_engine::BookingService;
use shared::util::now_millis;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run poll passes every `every` until the returned handle is aborted.
///
/// Each pass runs in its own task so a panicking gateway call is logged and
/// the next pass still happens.
pub fn spawn_poller(service: BookingService, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(MIN_POLL_INTERVAL));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let service = service.clone();
            let pass = tokio::spawn(async move { service.poll_outstanding(now_millis()).await });
            match pass.await {
                Ok(Ok(summary)) if summary.checked > 0 || summary.held > 0 => {
                    tracing::info!(
                        checked = summary.checked,
                        applied = summary.applied,
                        failed = summary.failed,
                        held = summary.held,
                        "Payment poll finished"
                    );
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Payment poll failed"),
                Err(e) => tracing::error!(error = %e, "Payment poll task panicked"),
            }
        }
    })
}
