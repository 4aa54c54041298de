//! Generative-AI proxy integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-test:generateContent";

fn prompt() -> serde_json::Value {
    json!({
        "contents": [{
            "parts": [
                { "text": "Describe this character." },
                { "inline_data": { "mime_type": "image/png", "data": "iVBORw0KGgo=" } }
            ]
        }]
    })
}

#[tokio::test]
async fn proxies_provider_response_verbatim() {
    let provider = MockServer::start().await;
    let reply = json!({
        "candidates": [{ "content": { "parts": [{ "text": "Aria is a bard." }] } }],
        "usageMetadata": { "totalTokenCount": 42 }
    });
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "gemini-test-key"))
        .and(body_partial_json(prompt()))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
        .expect(1)
        .mount(&provider)
        .await;
    let harness = TestHarness::with_generative(&provider.uri());

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", TestHarness::auth("user-1"))
        .json(&prompt())
        .await;

    response.assert_status_ok();
    response.assert_json(&reply);
}

#[tokio::test]
async fn text_route_strips_code_fences() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "```json\n{\"name\":\"Aria\"}\n```" }] }
            }]
        })))
        .mount(&provider)
        .await;
    let harness = TestHarness::with_generative(&provider.uri());

    let response = harness
        .server
        .post("/v1/generate/text")
        .add_header("authorization", TestHarness::auth("user-1"))
        .json(&prompt())
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "text": "{\"name\":\"Aria\"}" }));
}

#[tokio::test]
async fn provider_error_is_internal_with_details() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&provider)
        .await;
    let harness = TestHarness::with_generative(&provider.uri());

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", TestHarness::auth("user-1"))
        .json(&prompt())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "internal");
    assert_eq!(body["error"]["details"], "quota exceeded");
}

#[tokio::test]
async fn empty_contents_are_rejected_before_forwarding() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&provider)
        .await;
    let harness = TestHarness::with_generative(&provider.uri());

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", TestHarness::auth("user-1"))
        .json(&json!({ "contents": [{ "parts": [] }] }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn text_route_without_text_is_internal() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&provider)
        .await;
    let harness = TestHarness::with_generative(&provider.uri());

    let response = harness
        .server
        .post("/v1/generate/text")
        .add_header("authorization", TestHarness::auth("user-1"))
        .json(&prompt())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn not_configured_is_internal() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/generate")
        .add_header("authorization", TestHarness::auth("user-1"))
        .json(&prompt())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn requires_authentication() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/v1/generate")
        .json(&prompt())
        .await
        .assert_status_unauthorized();
}
