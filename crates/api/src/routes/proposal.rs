use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/proposals",
            get(handlers::proposal::list_proposals).post(handlers::proposal::create_proposal),
        )
        .route(
            "/api/proposals/:id",
            get(handlers::proposal::get_proposal)
                .patch(handlers::proposal::update_proposal)
                .delete(handlers::proposal::cancel_proposal),
        )
        .route(
            "/api/proposals/:id/calendar",
            get(handlers::proposal::get_calendar),
        )
}
