use axum::http::StatusCode;
use integration_tests::completions::CompletionServiceMock;
use serde_json::json;

use crate::{mock, relay_for};

#[tokio::test]
async fn relays_completion_in_result_envelope() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    let response = server.client.post("/", &json!({ "text": "hello world" })).await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "application/json");

    let body = response.text().await.unwrap();
    assert_eq!(body, r#"{"result":{"choices":[{"message":{"content":"hi"}}]}}"#);
}

#[tokio::test]
async fn sends_defaults_and_credentials_upstream() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    server.client.post("/", &json!({ "text": "hello world" })).await;

    let received = upstream.received();
    assert_eq!(received.len(), 1);

    let request = &received[0];
    assert_eq!(request.path, "/v1/chat/completions");
    assert_eq!(request.authorization.as_deref(), Some("Bearer sk-integration"));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));

    assert_eq!(
        request.body,
        json!({
            "model": "gpt-4o-mini",
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": "Please summarize this text:" },
                    { "type": "text", "text": "hello world" },
                ],
            }],
            "max_tokens": 1000,
        })
    );
}

#[tokio::test]
async fn request_overrides_prompt_and_model() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    let payload = json!({
        "text": "Der schnelle braune Fuchs",
        "prompt": "Translate to English:",
        "model": "gpt-4o",
    });

    let response = server.client.post("/", &payload).await;
    assert_eq!(response.status(), 200);

    let body = &upstream.received()[0].body;

    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["messages"][0]["content"][0]["text"], "Translate to English:");
    assert_eq!(body["messages"][0]["content"][1]["text"], "Der schnelle braune Fuchs");
}

#[tokio::test]
async fn request_can_choose_upstream_url() {
    let default_upstream = mock().await;
    let other_upstream = CompletionServiceMock::new()
        .with_response(json!({ "choices": [{ "message": { "content": "from elsewhere" } }] }))
        .spawn()
        .await
        .unwrap();

    let server = relay_for(&default_upstream, "").await;

    let payload = json!({ "text": "hello", "apiUrl": other_upstream.url_for("/custom/completions") });
    let response = server.client.post("/", &payload).await;

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["result"]["choices"][0]["message"]["content"], "from elsewhere");

    assert!(default_upstream.received().is_empty());
    assert_eq!(other_upstream.received()[0].path, "/custom/completions");
}

#[tokio::test]
async fn upstream_url_override_can_be_disabled() {
    let default_upstream = mock().await;
    let other_upstream = mock().await;

    let server = relay_for(&default_upstream, "allow_url_override = false").await;

    let payload = json!({ "text": "hello", "apiUrl": other_upstream.url() });
    let response = server.client.post("/", &payload).await;

    assert_eq!(response.status(), 200);
    assert_eq!(default_upstream.received().len(), 1);
    assert!(other_upstream.received().is_empty());
}

#[tokio::test]
async fn any_path_is_relayed() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    let response = server.client.post("/some/deep/path", &json!({ "text": "hello" })).await;

    assert_eq!(response.status(), 200);
    assert_eq!(upstream.received().len(), 1);
}

#[tokio::test]
async fn upstream_error_body_is_relayed_as_result() {
    let upstream = CompletionServiceMock::new()
        .with_error(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" } }),
        )
        .spawn()
        .await
        .unwrap();

    let server = relay_for(&upstream, "").await;

    let response = server.client.post("/", &json!({ "text": "hello" })).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(
        body,
        json!({
            "result": {
                "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" },
            },
        })
    );
}
