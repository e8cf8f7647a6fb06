//! Refund endpoints: customer requests and staff decisions

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError};
use shared::util::now_millis;
use shared::{BankDetails, RefundRequest, RefundRequestState};

use crate::state::AppState;

type ApiResult<T> = Result<ApiResponse<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct SubmitRefundRequest {
    pub bank: BankDetails,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    /// Staff note recorded with the decision
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefundStatusResponse {
    pub state: RefundRequestState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RefundRequest>,
}

/// POST /api/bookings/{id}/refund
pub async fn submit(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<SubmitRefundRequest>,
) -> ApiResult<RefundRequest> {
    let request = state
        .service
        .submit_refund(booking_id, req.bank, req.reason, now_millis())?;
    Ok(ApiResponse::success(request))
}

/// GET /api/bookings/{id}/refund
pub async fn get(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> ApiResult<RefundStatusResponse> {
    let request = state.service.refund_request(booking_id)?;
    Ok(ApiResponse::success(RefundStatusResponse {
        state: RefundRequestState::from(request.as_ref().map(|r| r.status)),
        request,
    }))
}

/// GET /api/refunds/pending (staff)
pub async fn list_pending(State(state): State<AppState>) -> ApiResult<Vec<RefundRequest>> {
    Ok(ApiResponse::success(state.service.list_pending_refunds()?))
}

/// POST /api/refunds/{id}/confirm (staff)
pub async fn confirm(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<RefundRequest> {
    let request = state
        .service
        .confirm_refund(request_id, req.reason, now_millis())?;
    Ok(ApiResponse::success(request))
}

/// POST /api/refunds/{id}/reject (staff)
pub async fn reject(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> ApiResult<RefundRequest> {
    let request = state
        .service
        .reject_refund(request_id, req.reason, now_millis())?;
    Ok(ApiResponse::success(request))
}
