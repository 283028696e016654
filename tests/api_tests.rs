use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use push_notifier::models::subscription::SubscriptionInfo;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, header_exists, method, path},
};

use crate::common::{browser_subscription, spawn_app};

async fn call(router: &Router, request: Request<Body>) -> Result<(StatusCode, Vec<u8>)> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;

    Ok((status, body.to_vec()))
}

fn post_json(uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn get(uri: &str) -> Result<Request<Body>> {
    Ok(Request::builder().uri(uri).body(Body::empty())?)
}

/// Test: Subscribing stores the subscription once
#[tokio::test]
async fn test_subscribe_saves_subscription() -> Result<()> {
    let app = spawn_app().await?;
    let subscription = serde_json::to_value(browser_subscription("https://push.example/abc"))?;

    let (status, body) = call(&app.router, post_json("/api/subscribe", &subscription)?).await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body, json!({ "status": "success", "message": "Subscription saved" }));

    let (status, _) = call(&app.router, post_json("/api/subscribe", &subscription)?).await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.state.store.load().await.len(), 1);

    Ok(())
}

/// Test: Subscriptions without keys are rejected
#[tokio::test]
async fn test_subscribe_rejects_incomplete_body() -> Result<()> {
    let app = spawn_app().await?;

    let (status, _) = call(
        &app.router,
        post_json("/api/subscribe", &json!({ "endpoint": "https://push.example/x" }))?,
    )
    .await?;

    assert!(status.is_client_error());
    assert!(app.state.store.load().await.is_empty());

    Ok(())
}

/// Test: The public key endpoint serves the generated key
#[tokio::test]
async fn test_vapid_public_key() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = call(&app.router, get("/vapid-public-key")?).await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body)?;
    let expected = app.state.vapid.current().await.public_key;
    assert_eq!(body["publicKey"], expected);

    Ok(())
}

/// Test: A missing public key file is reported as a server error
#[tokio::test]
async fn test_vapid_public_key_missing() -> Result<()> {
    let app = spawn_app().await?;
    std::fs::remove_file(app.state.config.vapid_public_key_file())?;

    let (status, body) = call(&app.router, get("/vapid-public-key")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["detail"], "VAPID public key not available");

    Ok(())
}

/// Test: Broadcast delivers, removes gone endpoints, and counts failures
#[tokio::test]
async fn test_broadcast_results() -> Result<()> {
    let push_service = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/push/active"))
        .and(header("content-encoding", "aes128gcm"))
        .and(header_exists("ttl"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&push_service)
        .await;

    Mock::given(method("POST"))
        .and(path("/push/expired"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&push_service)
        .await;

    Mock::given(method("POST"))
        .and(path("/push/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&push_service)
        .await;

    let app = spawn_app().await?;
    for name in ["active", "expired", "broken"] {
        let subscription = browser_subscription(format!("{}/push/{}", push_service.uri(), name));
        app.state.store.save(subscription).await?;
    }

    let (status, body) = call(
        &app.router,
        post_json(
            "/api/broadcast",
            &json!({ "title": "Meeting", "body": "Starts in 5 minutes" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(
        body,
        json!({
            "status": "completed",
            "results": { "success": 1, "failed": 1, "removed": 1 }
        })
    );

    let remaining: Vec<String> = app
        .state
        .store
        .load()
        .await
        .into_iter()
        .map(|s| s.endpoint)
        .collect();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|e| !e.ends_with("/push/expired")));

    Ok(())
}

/// Test: Pushed content is encrypted on the wire
#[tokio::test]
async fn test_broadcast_payload_is_encrypted() -> Result<()> {
    let push_service = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/push/active"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&push_service)
        .await;

    let app = spawn_app().await?;
    let subscription = browser_subscription(format!("{}/push/active", push_service.uri()));
    app.state.store.save(subscription).await?;

    call(
        &app.router,
        post_json("/api/broadcast", &json!({ "title": "Secret", "body": "plans" }))?,
    )
    .await?;

    let requests = push_service.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);

    let wire = String::from_utf8_lossy(&requests[0].body);
    assert!(!requests[0].body.is_empty());
    assert!(!wire.contains("Secret"));

    Ok(())
}

/// Test: Subscriptions with unusable keys count as failed without reaching the endpoint
#[tokio::test]
async fn test_broadcast_with_invalid_subscription_keys() -> Result<()> {
    let push_service = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&push_service)
        .await;

    let app = spawn_app().await?;
    app.state
        .store
        .save(SubscriptionInfo::new(
            format!("{}/push/bad-keys", push_service.uri()),
            "not-a-key",
            "x",
        ))
        .await?;

    let (status, body) = call(
        &app.router,
        post_json("/api/broadcast", &json!({ "title": "t", "body": "b" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["results"], json!({ "success": 0, "failed": 1, "removed": 0 }));
    assert_eq!(app.state.store.load().await.len(), 1);

    Ok(())
}

/// Test: Broadcasting with no subscribers reports zero counts
#[tokio::test]
async fn test_broadcast_without_subscribers() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = call(
        &app.router,
        post_json("/api/broadcast", &json!({ "title": "t", "body": "b" }))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["results"], json!({ "success": 0, "failed": 0, "removed": 0 }));

    Ok(())
}

/// Test: Static pages are served from the static directory
#[tokio::test]
async fn test_static_pages() -> Result<()> {
    let app = spawn_app().await?;
    let static_dir = app.dir.path().join("static");
    std::fs::write(static_dir.join("index.html"), "<h1>push demo</h1>")?;
    std::fs::write(static_dir.join("admin.html"), "<h1>admin</h1>")?;
    std::fs::write(static_dir.join("sw.js"), "self.addEventListener('push', () => {});")?;

    let (status, body) = call(&app.router, get("/")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>push demo</h1>");

    let (status, body) = call(&app.router, get("/admin")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>admin</h1>");

    let (status, _) = call(&app.router, get("/sw.js")?).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app.router, get("/manifest.json")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

/// Test: Missing admin page is a 404
#[tokio::test]
async fn test_admin_page_missing() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = call(&app.router, get("/admin")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["detail"], "File not found");

    Ok(())
}

/// Test: Health reflects the subscription file state
#[tokio::test]
async fn test_health_check() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = call(&app.router, get("/health")?).await?;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["vapid_keys"]["status"], "healthy");
    let timestamp = body["timestamp"].as_str().unwrap_or_default();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    std::fs::write(app.state.config.subscriptions_file(), "not json")?;

    let (status, body) = call(&app.router, get("/health")?).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = serde_json::from_slice(&body)?;
    assert_eq!(body["checks"]["subscription_store"]["status"], "unhealthy");

    Ok(())
}
