use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::ledger::domain::{Driver, DriverBooking};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverQuery {
    pub driver_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverDetails {
    pub driver_details: Vec<DriverBooking>,
}

/// List every stored driver
pub async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, JsonApiError> {
    Ok(Json(state.ledger.list_drivers().await?))
}

/// Append a driver; acknowledged with plain text
pub async fn add_driver(
    State(state): State<AppState>,
    ApiJson(driver): ApiJson<Driver>,
) -> Result<(StatusCode, &'static str), JsonApiError> {
    state.ledger.add_driver(driver).await?;
    Ok((StatusCode::CREATED, "Driver added successfully"))
}

/// Bookings of every driver whose name contains `driverName`
pub async fn driver_details(
    State(state): State<AppState>,
    Query(q): Query<DriverQuery>,
) -> Result<Json<DriverDetails>, JsonApiError> {
    let query = q.driver_name.unwrap_or_default();
    let driver_details = state.ledger.find_bookings_by_driver(&query).await?;
    Ok(Json(DriverDetails { driver_details }))
}
