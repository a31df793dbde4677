use axum::http::StatusCode;
use huddle_core::models::slot::AvailabilityHistoryPolicy;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, as_user, user};

#[test_log::test(tokio::test)]
async fn anonymous_claim_is_accepted() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 2).await;

    let response = ctx
        .server
        .post("/api/slots")
        .json(&json!({
            "proposalId": proposal["id"],
            "name": "Ann",
            "email": "Ann@Example.com",
            "availability": [{ "date": "2025-01-01", "busyTimes": [{ "start": "09:00", "end": "10:30" }] }],
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Availability submitted successfully");
    assert_eq!(body["slot"]["email"], "ann@example.com");
    assert_eq!(body["slot"]["hasAccount"], false);
}

#[test_log::test(tokio::test)]
async fn claim_by_known_user_snapshots_account() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 2).await;
    let member = user("member@example.com");

    let response = as_user(ctx.server.post("/api/slots"), &member)
        .json(&json!({
            "proposalId": proposal["id"],
            "name": "Member",
            "email": member.email,
            "availability": [],
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["slot"]["hasAccount"], true);
}

#[test_log::test(tokio::test)]
async fn claim_on_full_proposal_is_409() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 1).await;
    let id = proposal["id"].as_str().unwrap();
    ctx.claim(id, "Ann", "ann@example.com", json!([])).await;

    let response = ctx
        .server
        .post("/api/slots")
        .json(&json!({ "proposalId": id, "name": "Bo", "email": "bo@example.com", "availability": [] }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "All slots are filled");
    assert_eq!(ctx.store.slot_total().await, 1);
}

#[test_log::test(tokio::test)]
async fn duplicate_claim_is_reported_when_slots_remain() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;
    let id = proposal["id"].as_str().unwrap();
    ctx.claim(id, "Ann", "ann@example.com", json!([])).await;

    let response = ctx
        .server
        .post("/api/slots")
        .json(&json!({ "proposalId": id, "name": "Ann again", "email": "ANN@example.com", "availability": [] }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "You have already claimed a slot");
    assert_eq!(ctx.store.slot_total().await, 1);
}

#[test_log::test(tokio::test)]
async fn claim_validation_failures_are_400() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;
    let id = proposal["id"].as_str().unwrap();

    for body in [
        json!({ "proposalId": id, "name": "Ann", "email": "not-an-email", "availability": [] }),
        json!({ "proposalId": id, "name": " ", "email": "ann@example.com", "availability": [] }),
        json!({ "proposalId": id, "name": "Ann", "email": "ann@example.com",
                "availability": [{ "date": "2025-03-01" }] }),
        json!({ "proposalId": id, "name": "Ann", "email": "ann@example.com",
                "availability": [{ "date": "2025-01-01", "busyTimes": [{ "start": "11:00", "end": "10:00" }] }] }),
    ] {
        ctx.server
            .post("/api/slots")
            .json(&body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
    assert_eq!(ctx.store.slot_total().await, 0);
}

#[test_log::test(tokio::test)]
async fn claim_with_missing_email_is_400_json() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;

    let response = ctx
        .server
        .post("/api/slots")
        .json(&json!({ "proposalId": proposal["id"], "name": "Ann", "availability": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Validation error: All fields are required" })
    );
    assert_eq!(ctx.store.slot_total().await, 0);
}

#[test_log::test(tokio::test)]
async fn null_busy_times_means_free_all_day() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;

    let response = ctx
        .server
        .post("/api/slots")
        .json(&json!({
            "proposalId": proposal["id"],
            "name": "Ann",
            "email": "ann@example.com",
            "availability": [{ "date": "2025-01-01", "busyTimes": null }],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let slot_id = response.json::<Value>()["slot"]["id"].clone();
    let current = ctx
        .server
        .get(&format!("/api/slots/{}/availability", slot_id.as_str().unwrap()))
        .await
        .json::<Value>();
    assert_eq!(current["availability"][0]["busyTimes"], json!([]));
}

#[test_log::test(tokio::test)]
async fn slots_listing_includes_availability() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;
    let id = proposal["id"].as_str().unwrap();
    ctx.claim(
        id,
        "Ann",
        "ann@example.com",
        json!([{ "date": "2025-01-02" }, { "date": "2025-01-01" }]),
    )
    .await;

    let response = ctx.server.get(&format!("/api/slots/proposal/{id}")).await;

    response.assert_status_ok();
    let slots = response.json::<Value>()["slots"].clone();
    assert_eq!(slots[0]["name"], "Ann");
    assert_eq!(slots[0]["availabilityCount"], 2);
    assert_eq!(slots[0]["availability"][0]["date"], "2025-01-01");
    assert_eq!(slots[0]["availability"][1]["date"], "2025-01-02");

    ctx.server
        .get(&format!("/api/slots/proposal/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn claimant_replaces_availability() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;
    let claimant = user("ann@example.com");
    let slot = ctx
        .claim(proposal["id"].as_str().unwrap(), "Ann", &claimant.email, json!([{ "date": "2025-01-01" }]))
        .await;
    let path = format!("/api/slots/{}/availability", slot["id"].as_str().unwrap());

    let response = as_user(ctx.server.patch(&path), &claimant)
        .json(&json!({
            "availability": [{ "date": "2025-01-02", "busyTimes": [{ "start": "14:00", "end": "15:00" }] }]
        }))
        .await;
    response.assert_status_ok();

    let current = ctx.server.get(&path).await.json::<Value>();
    assert_eq!(
        current["availability"],
        json!([{
            "id": current["availability"][0]["id"],
            "slotId": slot["id"],
            "date": "2025-01-02",
            "busyTimes": [{ "start": "14:00", "end": "15:00" }],
            "createdAt": current["availability"][0]["createdAt"],
        }])
    );
}

#[test_log::test(tokio::test)]
async fn only_claimant_may_replace_availability() {
    let ctx = TestContext::new();
    let proposal = ctx.create_proposal(&user("host@example.com"), 3).await;
    let slot = ctx
        .claim(proposal["id"].as_str().unwrap(), "Ann", "ann@example.com", json!([]))
        .await;
    let path = format!("/api/slots/{}/availability", slot["id"].as_str().unwrap());
    let body = json!({ "availability": [] });

    as_user(ctx.server.patch(&path), &user("eve@example.com"))
        .json(&body)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    ctx.server
        .patch(&path)
        .json(&body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    as_user(
        ctx.server
            .patch(&format!("/api/slots/{}/availability", Uuid::new_v4())),
        &user("ann@example.com"),
    )
    .json(&body)
    .await
    .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn history_follows_configured_policy() {
    for (policy, expected) in [
        (AvailabilityHistoryPolicy::ClaimOnly, vec!["updated"]),
        (
            AvailabilityHistoryPolicy::ClaimAndUpdate,
            vec!["updated", "deleted", "created"],
        ),
    ] {
        let ctx = TestContext::with_policy(policy);
        let creator = user("host@example.com");
        let proposal = ctx.create_proposal(&creator, 3).await;
        let claimant = user("ann@example.com");
        let slot = ctx
            .claim(proposal["id"].as_str().unwrap(), "Ann", &claimant.email, json!([{ "date": "2025-01-01" }]))
            .await;
        let slot_id = slot["id"].as_str().unwrap();

        as_user(ctx.server.patch(&format!("/api/slots/{slot_id}/availability")), &claimant)
            .json(&json!({ "availability": [{ "date": "2025-01-02" }] }))
            .await
            .assert_status_ok();

        let history_path = format!("/api/slots/{slot_id}/history");
        for viewer in [&claimant, &creator] {
            let response = as_user(ctx.server.get(&history_path), viewer).await;
            response.assert_status_ok();
            let actions: Vec<String> = response.json::<Value>()["history"]
                .as_array()
                .unwrap()
                .iter()
                .map(|record| record["action"].as_str().unwrap().to_string())
                .collect();
            assert_eq!(actions, expected);
        }

        as_user(ctx.server.get(&history_path), &user("eve@example.com"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
