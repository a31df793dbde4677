use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use huddle_core::{
    models::slot::{
        AvailabilityResponse, ClaimSlotRequest, ClaimSlotResponse, HistoryResponse, SlotsResponse,
        UpdateAvailabilityRequest,
    },
    registry,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::{Authenticated, MaybeAuthenticated},
        error_handling::AppError,
        json_body::JsonBody,
    },
};

/// Claims a slot. Anonymous invitees may claim; when identity headers are
/// present they are validated and the account is recorded first.
#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn claim_slot(
    State(state): State<Arc<ApiState>>,
    MaybeAuthenticated(_identity): MaybeAuthenticated,
    JsonBody(payload): JsonBody<ClaimSlotRequest>,
) -> Result<(StatusCode, Json<ClaimSlotResponse>), AppError> {
    let slot = registry::claim_slot(state.store.as_ref(), payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ClaimSlotResponse {
            slot,
            message: "Availability submitted successfully".to_string(),
        }),
    ))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_slots(
    State(state): State<Arc<ApiState>>,
    Path(proposal_id): Path<Uuid>,
) -> Result<Json<SlotsResponse>, AppError> {
    let slots = registry::slots_for_proposal(state.store.as_ref(), proposal_id).await?;
    Ok(Json(SlotsResponse { slots }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let availability = registry::availability_for_slot(state.store.as_ref(), slot_id).await?;
    Ok(Json(AvailabilityResponse { availability }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    Authenticated(identity): Authenticated,
    Path(slot_id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateAvailabilityRequest>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let availability = registry::update_availability(
        state.store.as_ref(),
        Some(&identity),
        slot_id,
        payload.availability,
        state.history_policy,
    )
    .await?;

    Ok(Json(AvailabilityResponse { availability }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_history(
    State(state): State<Arc<ApiState>>,
    Authenticated(identity): Authenticated,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let history = registry::history_for_slot(state.store.as_ref(), &identity, slot_id).await?;
    Ok(Json(HistoryResponse { history }))
}
