//! Booking endpoints: creation, status, payment dispatch, reconciliation

use axum::Json;
use axum::extract::{Path, State};
use booking_engine::{BookingDraft, BookingView, ReconcileOutcome};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError};
use shared::util::now_millis;
use shared::{Booking, DispatchResult, PaymentFact, PaymentMethod, RefundQuote, ReviewItem};

use crate::state::AppState;

type ApiResult<T> = Result<ApiResponse<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(flatten)]
    pub draft: BookingDraft,
    /// Remaining capacity of the service, looked up by the caller
    pub available_capacity: u32,
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    pub amount: Decimal,
}

/// Reconciliation outcome plus the booking as it now displays
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub outcome: &'static str,
    pub booking: BookingView,
}

/// POST /api/bookings
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> ApiResult<Booking> {
    let booking = state
        .service
        .create_booking(req.draft, req.available_capacity, now_millis())?;
    Ok(ApiResponse::success(booking))
}

/// GET /api/bookings/{id}
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<BookingView> {
    Ok(ApiResponse::success(
        state.service.get_booking(id, now_millis())?,
    ))
}

/// GET /api/bookings/{id}/refund-quote
pub async fn refund_quote(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<RefundQuote> {
    Ok(ApiResponse::success(
        state.service.cancellation_quote(id, now_millis())?,
    ))
}

/// POST /api/bookings/{id}/dispatch
pub async fn dispatch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DispatchRequest>,
) -> ApiResult<DispatchResult> {
    let result = state.service.dispatch(id, req.method, now_millis()).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/bookings/{id}/poll
///
/// Ask the gateway now instead of waiting for the webhook or the poller.
pub async fn poll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ReconcileResponse> {
    let now = now_millis();
    let outcome = state.service.poll_booking(id, now).await?;
    reconcile_response(&state, id, &outcome, now)
}

/// POST /api/bookings/{id}/collect (staff)
///
/// Payment taken in person, e.g. cash on delivery.
pub async fn collect(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CollectRequest>,
) -> ApiResult<ReconcileResponse> {
    let now = now_millis();
    let outcome = state.service.record_direct_payment(id, req.amount, now)?;
    tracing::info!(booking_id = id, amount = %req.amount, outcome = outcome.as_str(), "Staff recorded payment");
    reconcile_response(&state, id, &outcome, now)
}

/// GET /api/bookings/{id}/payment-facts (staff)
pub async fn payment_facts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PaymentFact>> {
    Ok(ApiResponse::success(state.service.payment_facts(id)?))
}

/// GET /api/review-items (staff)
pub async fn review_items(State(state): State<AppState>) -> ApiResult<Vec<ReviewItem>> {
    Ok(ApiResponse::success(state.service.list_review_items()?))
}

fn reconcile_response(
    state: &AppState,
    booking_id: i64,
    outcome: &ReconcileOutcome,
    now: i64,
) -> ApiResult<ReconcileResponse> {
    Ok(ApiResponse::success(ReconcileResponse {
        outcome: outcome.as_str(),
        booking: state.service.get_booking(booking_id, now)?,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use booking_engine::gateway::OrderLookup;
    use rust_decimal::Decimal;
    use serde_json::json;
    use shared::error::ErrorCode;

    use crate::api::test_support::{
        create_booking, get_request, json_request, send, staff_request, test_app,
    };

    #[tokio::test]
    async fn test_create_and_get_booking() {
        let app = test_app();
        let id = create_booking(&app.router, "BK-1").await;

        let (status, body) = send(&app.router, get_request(&format!("/api/bookings/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["order_code"], "BK-1");
        let total: Decimal = body["data"]["order_total"].as_str().unwrap().parse().unwrap();
        assert_eq!(total, Decimal::from(300));
        assert_eq!(body["data"]["status"], "PENDING_PAYMENT");
        assert_eq!(body["data"]["refund"], "NONE");
    }

    #[tokio::test]
    async fn test_duplicate_order_code_rejected() {
        let app = test_app();
        create_booking(&app.router, "BK-1").await;
        let start = shared::util::now_millis() + 86_400_000;
        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/bookings",
                json!({
                    "order_code": "BK-1",
                    "customer_id": 8,
                    "customer": {"full_name": "Bob", "email": "bob@example.com", "phone": "+15550101"},
                    "capacity": {"kind": "TOUR", "adults": 1},
                    "unit_price": "50",
                    "service_start": start,
                    "service_end": start + 86_400_000,
                    "available_capacity": 20
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], ErrorCode::OrderCodeExists.code());
    }

    #[tokio::test]
    async fn test_missing_booking_is_not_found() {
        let app = test_app();
        let (status, body) = send(&app.router, get_request("/api/bookings/42")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], ErrorCode::BookingNotFound.code());
    }

    #[tokio::test]
    async fn test_dispatch_redirect_then_poll() {
        let app = test_app();
        let id = create_booking(&app.router, "BK-2").await;

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/bookings/{id}/dispatch"),
                json!({"method": "WALLET_REDIRECT"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["type"], "REDIRECT_REQUIRED");
        let correlation_id = body["data"]["gateway_correlation_id"]
            .as_str()
            .unwrap()
            .to_string();

        app.wallet.set_status(&correlation_id, true, 30000);
        let (status, body) = send(
            &app.router,
            json_request("POST", &format!("/api/bookings/{id}/poll"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["outcome"], "APPLIED");
        assert_eq!(body["data"]["booking"]["status"], "CONFIRMED");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_order_is_invalid() {
        let app = test_app();
        let id = create_booking(&app.router, "BK-3").await;
        app.wallet.set_order("BK-3", OrderLookup::Unknown);

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/bookings/{id}/dispatch"),
                json!({"method": "WALLET_REDIRECT"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], ErrorCode::InvalidOrder.code());
    }

    #[tokio::test]
    async fn test_cash_on_delivery_collected_by_staff() {
        let app = test_app();
        let id = create_booking(&app.router, "BK-4").await;

        let (_, body) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/bookings/{id}/dispatch"),
                json!({"method": "CASH_ON_DELIVERY"}),
            ),
        )
        .await;
        assert_eq!(body["data"]["type"], "IMMEDIATE");

        // Customers cannot mark their own booking paid
        let (status, _) = send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/bookings/{id}/collect"),
                json!({"amount": "300.00"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app.router,
            staff_request(
                "POST",
                &format!("/api/bookings/{id}/collect"),
                json!({"amount": "300.00"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["outcome"], "APPLIED");
        assert_eq!(body["data"]["booking"]["payment_status"], "PAID");
    }

    #[tokio::test]
    async fn test_collect_wrong_amount_goes_to_review() {
        let app = test_app();
        let id = create_booking(&app.router, "BK-5").await;
        send(
            &app.router,
            json_request(
                "POST",
                &format!("/api/bookings/{id}/dispatch"),
                json!({"method": "CASH_ON_DELIVERY"}),
            ),
        )
        .await;

        let (status, body) = send(
            &app.router,
            staff_request(
                "POST",
                &format!("/api/bookings/{id}/collect"),
                json!({"amount": "250.00"}),
            ),
        )
        .await;
        assert_eq!(body["code"], ErrorCode::PaymentAmountMismatch.code());
        assert!(status.is_client_error());

        let (_, body) = send(
            &app.router,
            staff_request("GET", "/api/review-items", json!(null)),
        )
        .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["booking_id"], id);
    }
}
