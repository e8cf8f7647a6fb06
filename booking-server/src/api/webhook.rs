//! Gateway webhook handler
//!
//! POST /gateway/{method}/webhook: push confirmations (raw body for
//! signature verification)

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use booking_engine::EngineError;
use booking_engine::gateway::signature::verify_signature;
use shared::util::now_millis;
use shared::{GatewayNotification, PaymentMethod};

use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-gateway-signature";

/// Handle a gateway push notification
///
/// Returns 2xx once the notification is settled either way (applied,
/// duplicate, orphaned or held for review) so the gateway stops retrying;
/// 5xx only for failures a redelivery may fix.
pub async fn handle_webhook(
    State(state): State<AppState>,
    Path(method): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Which gateway
    let Some((payment_method, secret)) = method
        .parse::<PaymentMethod>()
        .ok()
        .and_then(|m| state.webhook_secrets.for_method(m).map(|secret| (m, secret)))
    else {
        tracing::warn!(method = %method, "Webhook for unknown gateway");
        return StatusCode::NOT_FOUND;
    };

    // 2. Signature header
    let Some(sig_header) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        tracing::warn!(method = %method, "Missing webhook signature header");
        return StatusCode::BAD_REQUEST;
    };

    // 3. Verify signature
    let now = now_millis();
    if let Err(e) = verify_signature(&body, sig_header, secret, now / 1000) {
        tracing::warn!(method = %method, error = %e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    // 4. Parse notification
    let notification: GatewayNotification = match serde_json::from_slice(&body) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(method = %method, error = %e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(
        method = %method,
        correlation_id = %notification.correlation_id,
        paid = notification.paid,
        "Received gateway webhook"
    );

    // 5. Reconcile; bookings dispatched to another gateway are left alone
    match state
        .service
        .handle_notification(payment_method, &notification, now)
    {
        Ok(outcome) => {
            tracing::info!(
                correlation_id = %notification.correlation_id,
                outcome = outcome.as_str(),
                "Webhook reconciled"
            );
            StatusCode::OK
        }
        Err(e @ (EngineError::Storage(_) | EngineError::Conflict(_))) => {
            tracing::error!(
                correlation_id = %notification.correlation_id,
                error = %e,
                "Webhook reconciliation failed, gateway will redeliver"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
        Err(e) => {
            tracing::warn!(
                correlation_id = %notification.correlation_id,
                error = %e,
                "Webhook not applied"
            );
            StatusCode::OK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{
        CARD_SECRET, STAFF_KEY, WALLET_SECRET, create_booking, get_request, json_request, send,
        staff_request, test_app,
    };
    use axum::body::Body;
    use axum::http::Request;
    use booking_engine::gateway::signature::sign_payload;
    use serde_json::json;

    fn webhook_request(method: &str, body: &serde_json::Value, secret: &str) -> Request<Body> {
        let payload = body.to_string();
        let signature = sign_payload(payload.as_bytes(), secret, now_millis() / 1000).unwrap();
        Request::builder()
            .method("POST")
            .uri(format!("/gateway/{method}/webhook"))
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(payload))
            .unwrap()
    }

    async fn redirect_booking(app: &crate::api::test_support::TestApp, code: &str) -> (i64, String) {
        let id = create_booking(&app.router, code).await;
        let (_, body) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/bookings/{id}/dispatch"),
                json!({"method": "WALLET_REDIRECT"}),
            ),
        )
        .await;
        let correlation_id = body["data"]["gateway_correlation_id"]
            .as_str()
            .unwrap()
            .to_string();
        (id, correlation_id)
    }

    #[tokio::test]
    async fn test_signed_webhook_marks_paid() {
        let app = test_app();
        let (id, correlation_id) = redirect_booking(&app, "WH-1").await;

        let notification = json!({"correlation_id": correlation_id, "paid": true, "amount_minor": 30000});
        let (status, _) = send(
            &app.router,
            webhook_request("wallet", &notification, WALLET_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app.router, get_request(&format!("/api/bookings/{id}"))).await;
        assert_eq!(body["data"]["status"], "CONFIRMED");

        // Redelivery is a no-op
        let (status, _) = send(
            &app.router,
            webhook_request("wallet", &notification, WALLET_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(
            &app.router,
            staff_request("GET", &format!("/api/bookings/{id}/payment-facts"), json!(null)),
        )
        .await;
        let outcomes: Vec<_> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["outcome"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(outcomes, ["APPLIED", "ALREADY_PAID"]);
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let app = test_app();
        let (id, correlation_id) = redirect_booking(&app, "WH-2").await;

        let notification = json!({"correlation_id": correlation_id, "paid": true, "amount_minor": 30000});
        let (status, _) = send(
            &app.router,
            webhook_request("wallet", &notification, "whsec_forged"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app.router, get_request(&format!("/api/bookings/{id}"))).await;
        assert_eq!(body["data"]["status"], "PENDING_PAYMENT");
    }

    #[tokio::test]
    async fn test_missing_signature_rejected() {
        let app = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/gateway/wallet/webhook")
            .body(Body::from("{}"))
            .unwrap();
        let (status, _) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_gateway_is_not_found() {
        let app = test_app();
        let notification = json!({"correlation_id": "x", "paid": true, "amount_minor": 1});
        let (status, _) = send(
            &app.router,
            webhook_request("cash-on-delivery", &notification, WALLET_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_orphaned_correlation_acknowledged() {
        let app = test_app();
        let notification = json!({"correlation_id": "wallet_sess_404", "paid": true, "amount_minor": 100});
        let (status, _) = send(
            &app.router,
            webhook_request("wallet", &notification, WALLET_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_amount_mismatch_acknowledged_and_flagged() {
        let app = test_app();
        let (id, correlation_id) = redirect_booking(&app, "WH-3").await;

        let notification = json!({"correlation_id": correlation_id, "paid": true, "amount_minor": 100});
        let (status, _) = send(
            &app.router,
            webhook_request("wallet", &notification, WALLET_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app.router, get_request(&format!("/api/bookings/{id}"))).await;
        assert_eq!(body["data"]["payment_status"], "UNPAID");

        let req = Request::builder()
            .uri("/api/review-items")
            .header("x-staff-key", STAFF_KEY)
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app.router, req).await;
        assert_eq!(body["data"][0]["booking_id"], id);
    }

    #[tokio::test]
    async fn test_other_gateway_cannot_settle_booking() {
        let app = test_app();
        let (id, correlation_id) = redirect_booking(&app, "WH-4").await;

        // Wallet session, delivered to the card endpoint with the card secret
        let notification = json!({"correlation_id": correlation_id, "paid": true, "amount_minor": 30000});
        let (status, _) = send(
            &app.router,
            webhook_request("card", &notification, CARD_SECRET),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app.router, get_request(&format!("/api/bookings/{id}"))).await;
        assert_eq!(body["data"]["payment_status"], "UNPAID");
    }
}
