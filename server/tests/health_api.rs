mod common;

use axum::http::StatusCode;

use common::{get, TestApp};

#[tokio::test]
async fn test_health_ok_with_security_headers() {
    let app = TestApp::new().await;

    let response = {
        use tower::ServiceExt;
        app.router
            .clone()
            .oneshot(get("/health", None))
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().get("strict-transport-security").is_none());

    let (_, body) = app.send(get("/health", None)).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_health_reports_unavailable_store() {
    let app = TestApp::new().await;
    app.store.set_offline(true).await;

    let (status, body) = app.send(get("/health", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}
