//! Notification integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

/// Owner with one like and one dislike notification.
async fn owner_with_votes() -> TestHarness {
    let harness = TestHarness::new();
    harness.sign_in("owner", "Sari").await;
    harness.sign_in("fan", "Budi").await;
    harness.sign_in("critic", "Rina").await;
    let id = harness.publish("owner", "Aria").await;

    for (user, vote) in [("fan", "like"), ("critic", "dislike")] {
        harness
            .server
            .post("/v1/catalog/vote")
            .add_header("authorization", TestHarness::auth(user))
            .json(&json!({ "globalCharId": id, "voteType": vote }))
            .await
            .assert_status_ok();
    }
    harness
}

#[tokio::test]
async fn list_newest_first_with_unread_count() {
    let harness = owner_with_votes().await;

    let response = harness
        .server
        .get("/v1/notifications")
        .add_header("authorization", TestHarness::auth("owner"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["unreadCount"], 2);
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications[0]["type"], "VOTE_DISLIKE");
    assert_eq!(notifications[0]["message"], "Rina disliked your character \"Aria\".");
    assert_eq!(notifications[1]["type"], "VOTE_LIKE");
    assert!(notifications[1].get("orderId").is_none());
}

#[tokio::test]
async fn mark_read_and_filter_unread() {
    let harness = owner_with_votes().await;
    let notifications = harness.notifications("owner").await;
    let id = notifications[1]["id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/v1/notifications/{id}/read"))
        .add_header("authorization", TestHarness::auth("owner"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["isRead"], true);

    let unread = harness
        .server
        .get("/v1/notifications")
        .add_query_param("unread_only", true)
        .add_header("authorization", TestHarness::auth("owner"))
        .await;
    unread.assert_status_ok();
    let body: serde_json::Value = unread.json();
    assert_eq!(body["unreadCount"], 1);
    let remaining = body["notifications"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["type"], "VOTE_DISLIKE");

    assert_eq!(harness.notifications("owner").await.len(), 2);
}

#[tokio::test]
async fn marking_twice_is_harmless() {
    let harness = owner_with_votes().await;
    let notifications = harness.notifications("owner").await;
    let id = notifications[0]["id"].as_str().unwrap();

    for _ in 0..2 {
        harness
            .server
            .post(&format!("/v1/notifications/{id}/read"))
            .add_header("authorization", TestHarness::auth("owner"))
            .await
            .assert_status_ok();
    }
}

#[tokio::test]
async fn invalid_id_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/notifications/not-a-ulid/read")
        .add_header("authorization", TestHarness::auth("owner"))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn other_users_notification_is_not_found() {
    let harness = owner_with_votes().await;
    let notifications = harness.notifications("owner").await;
    let id = notifications[0]["id"].as_str().unwrap();

    harness
        .server
        .post(&format!("/v1/notifications/{id}/read"))
        .add_header("authorization", TestHarness::auth("fan"))
        .await
        .assert_status_not_found();

    let owner = harness.notifications("owner").await;
    assert_eq!(owner[0]["isRead"], false);
}

#[tokio::test]
async fn empty_list_for_new_user() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/notifications")
        .add_header("authorization", TestHarness::auth("nobody"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["unreadCount"], 0);
    assert!(body["notifications"].as_array().unwrap().is_empty());
}
