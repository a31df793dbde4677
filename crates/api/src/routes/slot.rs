use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/slots", post(handlers::slot::claim_slot))
        .route(
            "/api/slots/proposal/:proposal_id",
            get(handlers::slot::list_slots),
        )
        .route(
            "/api/slots/:slot_id/availability",
            get(handlers::slot::get_availability).patch(handlers::slot::update_availability),
        )
        .route("/api/slots/:slot_id/history", get(handlers::slot::get_history))
}
