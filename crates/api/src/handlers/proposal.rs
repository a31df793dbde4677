use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use huddle_core::{
    calendar, lifecycle,
    models::{
        calendar::CalendarResponse,
        proposal::{
            CancelProposalResponse, CreateProposalRequest, ProposalDetailResponse, ProposalListing,
            ProposalResponse, UpdateProposalRequest,
        },
    },
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::Authenticated, error_handling::AppError, json_body::JsonBody},
};

/// Number of best days returned when the client does not ask for a count.
pub const DEFAULT_BEST_DAYS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub top: Option<usize>,
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn create_proposal(
    State(state): State<Arc<ApiState>>,
    Authenticated(identity): Authenticated,
    JsonBody(payload): JsonBody<CreateProposalRequest>,
) -> Result<(StatusCode, Json<ProposalResponse>), AppError> {
    let today = Utc::now().date_naive();
    let proposal =
        lifecycle::create_proposal(state.store.as_ref(), &identity, payload, today).await?;

    Ok((StatusCode::CREATED, Json(ProposalResponse { proposal })))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn list_proposals(
    State(state): State<Arc<ApiState>>,
    Authenticated(identity): Authenticated,
) -> Result<Json<ProposalListing>, AppError> {
    let listing = lifecycle::list_for_user(state.store.as_ref(), &identity).await?;
    Ok(Json(listing))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_proposal(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProposalDetailResponse>, AppError> {
    let proposal = lifecycle::get_proposal(state.store.as_ref(), id).await?;
    Ok(Json(ProposalDetailResponse { proposal }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn update_proposal(
    State(state): State<Arc<ApiState>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateProposalRequest>,
) -> Result<Json<ProposalResponse>, AppError> {
    let proposal =
        lifecycle::update_proposal(state.store.as_ref(), &identity, id, payload.into()).await?;
    Ok(Json(ProposalResponse { proposal }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn cancel_proposal(
    State(state): State<Arc<ApiState>>,
    Authenticated(identity): Authenticated,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelProposalResponse>, AppError> {
    let proposal = lifecycle::cancel_proposal(state.store.as_ref(), &identity, id).await?;
    Ok(Json(CancelProposalResponse {
        message: "Proposal cancelled".to_string(),
        proposal,
    }))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn get_calendar(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let (proposal, calendar) = calendar::calendar_for_proposal(state.store.as_ref(), id).await?;
    let best_days = calendar
        .best_days(query.top.unwrap_or(DEFAULT_BEST_DAYS))
        .into_iter()
        .map(|day| day.date)
        .collect();

    Ok(Json(CalendarResponse {
        proposal,
        days: calendar.days,
        best_days,
    }))
}
