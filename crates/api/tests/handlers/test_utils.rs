use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use huddle_api::{
    ApiState, app,
    middleware::auth::{USER_EMAIL_HEADER, USER_ID_HEADER},
};
use huddle_core::{
    models::{identity::Identity, slot::AvailabilityHistoryPolicy},
    store::SchedulingStore,
};
use huddle_db::mock::MemoryStore;
use serde_json::{Value, json};
use uuid::Uuid;

pub struct TestContext {
    pub server: TestServer,
    pub store: MemoryStore,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(AvailabilityHistoryPolicy::ClaimOnly)
    }

    pub fn with_policy(policy: AvailabilityHistoryPolicy) -> Self {
        let store = MemoryStore::new();
        let server = server_for(Arc::new(store.clone()), policy);
        Self { server, store }
    }

    /// Creates a proposal over HTTP and returns its JSON body.
    pub async fn create_proposal(&self, creator: &Identity, num_slots: i32) -> Value {
        let response = as_user(self.server.post("/api/proposals"), creator)
            .json(&json!({
                "title": "Game night",
                "description": "Bring a board game",
                "dateRangeStart": "2025-01-01",
                "dateRangeEnd": "2025-01-02",
                "numSlots": num_slots,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["proposal"].clone()
    }

    /// Claims a slot anonymously and returns the slot JSON.
    pub async fn claim(&self, proposal_id: &str, name: &str, email: &str, availability: Value) -> Value {
        let response = self
            .server
            .post("/api/slots")
            .json(&json!({
                "proposalId": proposal_id,
                "name": name,
                "email": email,
                "availability": availability,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["slot"].clone()
    }
}

pub fn server_for(store: Arc<dyn SchedulingStore>, policy: AvailabilityHistoryPolicy) -> TestServer {
    let state = Arc::new(ApiState::new(store, policy));
    TestServer::new(app(state)).unwrap()
}

pub fn user(email: &str) -> Identity {
    Identity::new(Uuid::new_v4(), email)
}

pub fn as_user(request: TestRequest, identity: &Identity) -> TestRequest {
    request
        .add_header(
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_str(&identity.user_id.to_string()).unwrap(),
        )
        .add_header(
            HeaderName::from_static(USER_EMAIL_HEADER),
            HeaderValue::from_str(&identity.email).unwrap(),
        )
}
