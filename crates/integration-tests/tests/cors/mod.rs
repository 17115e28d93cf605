use reqwest::Method;
use serde_json::json;

use crate::{mock, relay_for};

#[tokio::test]
async fn preflight_echoes_allowed_origin() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    let response = server
        .client
        .request(Method::OPTIONS, "/")
        .header("Origin", "https://b.example")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "https://b.example");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");

    assert_eq!(response.text().await.unwrap(), "");
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn unknown_origin_gets_first_configured_origin() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    let response = server
        .client
        .request(Method::OPTIONS, "/")
        .header("Origin", "https://not-allowed.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://a.example"
    );
}

#[tokio::test]
async fn cors_headers_on_every_response() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "").await;

    let requests = [
        (Method::POST, json!({ "text": "hello" }), 200),
        (Method::POST, json!({ "text": "" }), 400),
        (Method::GET, json!({}), 405),
    ];

    for (method, body, status) in requests {
        let response = server
            .client
            .request(method.clone(), "/")
            .header("Origin", "https://b.example")
            .json(&body)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), status, "{method}");

        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "https://b.example", "{method}");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
    }
}

#[tokio::test]
async fn cors_headers_on_upstream_failure() {
    let upstream = integration_tests::completions::CompletionServiceMock::new()
        .with_raw_response("not json")
        .spawn()
        .await
        .unwrap();

    let server = relay_for(&upstream, "").await;

    let response = server
        .client
        .request(Method::POST, "/")
        .header("Origin", "https://a.example")
        .json(&json!({ "text": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://a.example"
    );
}

#[tokio::test]
async fn cors_disabled() {
    let upstream = mock().await;
    let server = relay_for(&upstream, "cors = false").await;

    let response = server
        .client
        .request(Method::OPTIONS, "/")
        .header("Origin", "https://a.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.headers().get("access-control-allow-origin").is_none());
    assert!(response.headers().get("access-control-allow-methods").is_none());
}
