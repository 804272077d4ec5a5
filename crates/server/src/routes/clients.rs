use axum::{extract::State, Json};
use common::types::Message;
use service::ledger::domain::{ClientLedger, NewBooking, PaymentUpdate};

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::routes::AppState;

pub async fn list_clients(State(state): State<AppState>) -> Result<Json<ClientLedger>, JsonApiError> {
    Ok(Json(state.ledger.list_clients().await?))
}

/// Add a booking for a client, creating the client on first use
pub async fn upsert_booking(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBooking>,
) -> Result<Json<Message>, JsonApiError> {
    state.ledger.upsert_booking(input).await?;
    Ok(Json(Message::new("Client data added/updated successfully.")))
}

pub async fn update_payment(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<PaymentUpdate>,
) -> Result<Json<Message>, JsonApiError> {
    state.ledger.update_payment(input).await?;
    Ok(Json(Message::new("Payment updated successfully")))
}
