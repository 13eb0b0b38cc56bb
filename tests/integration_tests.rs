use actix_web::test;
use gemini_relay::{AppContext, Settings, create_app};

fn mock_context() -> AppContext {
    let mut settings = Settings::default();
    settings.generation.provider = "mock".to_string();
    AppContext::new(settings).expect("Failed to build app context")
}

#[actix_web::test]
async fn test_health_endpoint() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "gemini-relay");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_metrics_endpoint() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;

    // Drive one request through so the counters are non-trivial.
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/plain"));

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).expect("metrics output is utf-8");
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("app_uptime_seconds"));
}

#[actix_web::test]
async fn test_metrics_endpoint_disabled() {
    let mut settings = Settings::default();
    settings.generation.provider = "mock".to_string();
    settings.metrics.enabled = false;
    let ctx = AppContext::new(settings).expect("Failed to build app context");
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
}

#[actix_web::test]
async fn test_openapi_spec_endpoint() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::get().uri("/api/spec/v2").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let spec: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(spec["info"]["title"], "Gemini Relay");
    assert!(spec["paths"]["/generate"].is_object());
    assert!(spec["paths"]["/rpc/generate"].is_object());
    assert!(spec["paths"]["/health"].is_object());
}

#[actix_web::test]
async fn test_request_id_header_present() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .expect("X-Request-ID header should be present");
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}

#[actix_web::test]
async fn test_security_headers_present() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    let headers = resp.headers();
    assert_eq!(
        headers.get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert!(headers.contains_key("x-frame-options"));
    assert!(headers.contains_key("referrer-policy"));
}

#[actix_web::test]
async fn test_cors_preflight_returns_no_content() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::with_uri("/generate")
        .method(actix_web::http::Method::OPTIONS)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 204);

    let headers = resp.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "POST");
    let allowed_headers = headers
        .get("access-control-allow-headers")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert!(allowed_headers.contains("Content-Type"));
    assert!(allowed_headers.contains("X-User-Id"));
    assert!(headers.contains_key("access-control-max-age"));
}

#[actix_web::test]
async fn test_cors_origin_header_on_regular_response() {
    let ctx = mock_context();
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
