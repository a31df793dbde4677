use std::sync::Arc;

use axum::{body::to_bytes, http::StatusCode};
use huddle_api::middleware::error_handling::map_error;
use huddle_core::{
    errors::{Conflict, HuddleError},
    models::slot::AvailabilityHistoryPolicy,
};
use huddle_db::mock::MockStore;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{as_user, server_for, user};

async fn body_of(err: HuddleError) -> (StatusCode, Value) {
    let response = map_error(err);
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[rstest]
#[case(HuddleError::NotFound("Proposal".to_string()), StatusCode::NOT_FOUND)]
#[case(HuddleError::validation("Invalid input"), StatusCode::BAD_REQUEST)]
#[case(HuddleError::Authentication("Missing identity".to_string()), StatusCode::UNAUTHORIZED)]
#[case(HuddleError::not_authorized(), StatusCode::FORBIDDEN)]
#[case(HuddleError::Conflict(Conflict::CapacityExceeded), StatusCode::CONFLICT)]
#[case(HuddleError::Conflict(Conflict::DuplicateClaim), StatusCode::CONFLICT)]
#[case(HuddleError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn errors_map_to_status_codes(#[case] err: HuddleError, #[case] expected: StatusCode) {
    let (status, _) = body_of(err).await;
    assert_eq!(status, expected);
}

#[tokio::test]
async fn internal_error_is_mapped_to_500() {
    let err = HuddleError::Internal(Box::new(std::io::Error::other("disk full")));
    let (status, body) = body_of(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn database_detail_never_reaches_client() {
    let (_, body) = body_of(HuddleError::Database(eyre::eyre!(
        "password authentication failed for user huddle at 10.0.0.7"
    )))
    .await;

    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn conflict_body_carries_bare_message() {
    let (_, body) = body_of(HuddleError::Conflict(Conflict::ProposalInactive)).await;

    assert_eq!(body, json!({ "error": "Proposal is not active" }));
}

#[test_log::test(tokio::test)]
async fn store_failure_is_opaque_over_http() {
    let mut store = MockStore::new();
    store
        .expect_get_proposal()
        .returning(|_| Err(HuddleError::Database(eyre::eyre!("relation \"proposals\" does not exist"))));
    let server = server_for(Arc::new(store), AvailabilityHistoryPolicy::ClaimOnly);

    let response = server
        .get(&format!("/api/proposals/{}", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Internal server error" })
    );
}

#[test_log::test(tokio::test)]
async fn missing_identity_never_reaches_store() {
    let mut store = MockStore::new();
    store.expect_remember_account().never();
    store.expect_insert_proposal().never();
    store.expect_list_created_by().never();
    let server = server_for(Arc::new(store), AvailabilityHistoryPolicy::ClaimOnly);

    server
        .post("/api/proposals")
        .json(&json!({ "title": "Lunch", "numSlots": 2 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/proposals")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn malformed_identity_is_rejected() {
    let mut store = MockStore::new();
    store.expect_remember_account().never();
    let server = server_for(Arc::new(store), AvailabilityHistoryPolicy::ClaimOnly);

    let response = server
        .get("/api/proposals")
        .add_header(
            axum::http::HeaderName::from_static("x-user-id"),
            axum::http::HeaderValue::from_static("not-a-uuid"),
        )
        .add_header(
            axum::http::HeaderName::from_static("x-user-email"),
            axum::http::HeaderValue::from_static("pat@example.com"),
        )
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn authenticated_request_records_account() {
    let member = user("member@example.com");
    let expected_id = member.user_id;

    let mut store = MockStore::new();
    store
        .expect_remember_account()
        .withf(move |identity| identity.user_id == expected_id)
        .times(1)
        .returning(|_| Ok(()));
    store.expect_list_created_by().returning(|_| Ok(vec![]));
    store.expect_list_responded_by().returning(|_| Ok(vec![]));
    let server = server_for(Arc::new(store), AvailabilityHistoryPolicy::ClaimOnly);

    let response = as_user(server.get("/api/proposals"), &member).await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "created": [], "responded": [] })
    );
}
