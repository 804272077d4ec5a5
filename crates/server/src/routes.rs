use axum::{
    routing::{get, post},
    Json, Router,
};
use service::ledger::LedgerService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod clients;
pub mod drivers;

/// Shared handler state. Cloned per request; the stores behind it are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerService,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let driver_routes = Router::new()
        .route("/drivers", get(drivers::list_drivers).post(drivers::add_driver))
        .route("/driver-details", get(drivers::driver_details));

    let client_routes = Router::new()
        .route("/clients", get(clients::list_clients).post(clients::upsert_booking))
        .route("/update-payment", post(clients::update_payment));

    Router::new()
        .route("/health", get(health))
        .merge(driver_routes)
        .merge(client_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
