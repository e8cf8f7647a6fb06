//! HTTP API routes

pub mod auth;
pub mod bookings;
pub mod health;
pub mod refunds;
pub mod webhook;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/bookings", post(bookings::create))
        .route("/api/bookings/{id}", get(bookings::get))
        .route("/api/bookings/{id}/refund-quote", get(bookings::refund_quote))
        .route("/api/bookings/{id}/dispatch", post(bookings::dispatch))
        .route("/api/bookings/{id}/poll", post(bookings::poll))
        .route(
            "/api/bookings/{id}/refund",
            post(refunds::submit).get(refunds::get),
        )
        .route("/gateway/{method}/webhook", post(webhook::handle_webhook));

    let staff = Router::new()
        .route("/api/bookings/{id}/collect", post(bookings::collect))
        .route("/api/bookings/{id}/payment-facts", get(bookings::payment_facts))
        .route("/api/refunds/pending", get(refunds::list_pending))
        .route("/api/refunds/{id}/confirm", post(refunds::confirm))
        .route("/api/refunds/{id}/reject", post(refunds::reject))
        .route("/api/review-items", get(bookings::review_items))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::staff_auth_middleware,
        ));

    public
        .merge(staff)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
