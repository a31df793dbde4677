use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, as_user, user};

#[tokio::test]
async fn health_and_version_respond() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(
        health.json::<Value>(),
        json!({ "status": "ok", "message": "Server is running", "service": "huddle" })
    );

    let version = ctx.server.get("/version").await;
    version.assert_status_ok();
    assert_eq!(version.json::<Value>()["service"], "huddle");
    assert_eq!(version.json::<Value>()["version"], env!("CARGO_PKG_VERSION"));
}

#[test_log::test(tokio::test)]
async fn create_requires_identity() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/proposals")
        .json(&json!({ "title": "Lunch", "numSlots": 2 }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn create_returns_proposal_in_camel_case() {
    let ctx = TestContext::new();
    let creator = user("host@example.com");

    let proposal = ctx.create_proposal(&creator, 3).await;

    assert_eq!(proposal["title"], "Game night");
    assert_eq!(proposal["numSlots"], 3);
    assert_eq!(proposal["status"], "active");
    assert_eq!(proposal["dateRangeStart"], "2025-01-01");
    assert_eq!(proposal["creatorId"], creator.user_id.to_string());
}

#[test_log::test(tokio::test)]
async fn create_rejects_invalid_input() {
    let ctx = TestContext::new();
    let creator = user("host@example.com");

    for body in [
        json!({ "title": "  ", "numSlots": 2 }),
        json!({ "title": "Lunch", "numSlots": 0 }),
        json!({ "title": "Lunch", "numSlots": 2, "dateRangeStart": "2025-02-10", "dateRangeEnd": "2025-02-01" }),
    ] {
        let response = as_user(ctx.server.post("/api/proposals"), &creator)
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}

#[test_log::test(tokio::test)]
async fn create_without_title_is_400_json() {
    let ctx = TestContext::new();

    let response = as_user(ctx.server.post("/api/proposals"), &user("host@example.com"))
        .json(&json!({ "numSlots": 2 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Validation error: All fields are required" })
    );
}

#[test_log::test(tokio::test)]
async fn create_with_malformed_json_is_400() {
    let ctx = TestContext::new();

    let response = as_user(ctx.server.post("/api/proposals"), &user("host@example.com"))
        .content_type("application/json")
        .bytes("{\"title\": ".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Validation error: Request body is not valid JSON"
    );
}

#[test_log::test(tokio::test)]
async fn get_includes_filled_slots() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;
    let id = proposal["id"].as_str().unwrap();
    ctx.claim(id, "Ann", "ann@example.com", json!([])).await;

    let response = ctx.server.get(&format!("/api/proposals/{id}")).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["proposal"]["filledSlots"], 1);
    assert_eq!(body["proposal"]["title"], "Game night");
}

#[test_log::test(tokio::test)]
async fn get_unknown_proposal_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/proposals/{}", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn patch_updates_only_sent_fields() {
    let ctx = TestContext::new();
    let creator = user("host@example.com");
    let proposal = ctx.create_proposal(&creator, 3).await;
    let path = format!("/api/proposals/{}", proposal["id"].as_str().unwrap());

    let response = as_user(ctx.server.patch(&path), &creator)
        .json(&json!({ "numSlots": 6, "description": null }))
        .await;

    response.assert_status_ok();
    let updated = response.json::<Value>()["proposal"].clone();
    assert_eq!(updated["numSlots"], 6);
    assert_eq!(updated["description"], Value::Null);
    assert_eq!(updated["title"], "Game night");
}

#[test_log::test(tokio::test)]
async fn patch_with_no_fields_is_rejected() {
    let ctx = TestContext::new();
    let creator = user("host@example.com");
    let proposal = ctx.create_proposal(&creator, 3).await;
    let path = format!("/api/proposals/{}", proposal["id"].as_str().unwrap());

    let response = as_user(ctx.server.patch(&path), &creator)
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Validation error: No updates provided"
    );
}

#[test_log::test(tokio::test)]
async fn only_creator_may_patch_or_cancel() {
    let ctx = TestContext::new();
    let creator = user("host@example.com");
    let other = user("other@example.com");
    let proposal = ctx.create_proposal(&creator, 3).await;
    let path = format!("/api/proposals/{}", proposal["id"].as_str().unwrap());

    as_user(ctx.server.patch(&path), &other)
        .json(&json!({ "title": "Mine now" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    as_user(ctx.server.delete(&path), &other)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    ctx.server
        .delete(&path)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn cancel_twice_succeeds_and_blocks_claims() {
    let ctx = TestContext::new();
    let creator = user("host@example.com");
    let proposal = ctx.create_proposal(&creator, 3).await;
    let id = proposal["id"].as_str().unwrap();
    let path = format!("/api/proposals/{id}");

    for _ in 0..2 {
        let response = as_user(ctx.server.delete(&path), &creator).await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["message"], "Proposal cancelled");
        assert_eq!(body["proposal"]["status"], "cancelled");
    }

    let response = ctx
        .server
        .post("/api/slots")
        .json(&json!({
            "proposalId": id,
            "name": "Late",
            "email": "late@example.com",
            "availability": [],
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "Proposal is not active");
}

#[test_log::test(tokio::test)]
async fn list_separates_created_and_responded() {
    let ctx = TestContext::new();
    let me = user("me@example.com");
    let friend = user("friend@example.com");
    let mine = ctx.create_proposal(&me, 3).await;
    let theirs = ctx.create_proposal(&friend, 3).await;
    ctx.claim(theirs["id"].as_str().unwrap(), "Me", "ME@example.com", json!([]))
        .await;

    let response = as_user(ctx.server.get("/api/proposals"), &me).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["created"].as_array().unwrap().len(), 1);
    assert_eq!(body["created"][0]["id"], mine["id"]);
    assert_eq!(body["responded"].as_array().unwrap().len(), 1);
    assert_eq!(body["responded"][0]["id"], theirs["id"]);
}

#[test_log::test(tokio::test)]
async fn calendar_aggregates_claims() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 2).await;
    let id = proposal["id"].as_str().unwrap();
    ctx.claim(
        id,
        "A",
        "a@example.com",
        json!([
            { "date": "2025-01-01", "busyTimes": [{ "start": "09:00", "end": "10:00" }] },
            { "date": "2025-01-02", "busyTimes": [] },
        ]),
    )
    .await;
    ctx.claim(id, "B", "b@example.com", json!([{ "date": "2025-01-01" }]))
        .await;

    let response = ctx
        .server
        .get(&format!("/api/proposals/{id}/calendar"))
        .add_query_param("top", 1)
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    let days = body["days"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-01-01");
    assert_eq!(days[0]["count"], 2);
    assert_eq!(days[0]["tier"], "all-free");
    assert_eq!(days[0]["availableSlots"][0]["busyTimes"], json!(["09:00-10:00"]));
    assert_eq!(days[1]["count"], 1);
    assert_eq!(days[1]["tier"], "some-free");
    assert_eq!(days[1]["unavailableSlots"][0]["name"], "B");
    assert_eq!(body["bestDays"], json!(["2025-01-01"]));
}

#[test_log::test(tokio::test)]
async fn calendar_for_unknown_proposal_is_not_found() {
    let ctx = TestContext::new();

    ctx.server
        .get(&format!("/api/proposals/{}/calendar", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
