use actix_web::test;
use gemini_relay::{AppContext, RateLimitStore, Settings, create_app};
use serde_json::json;

fn mock_context_with_user_limit(max_per_window: u32) -> AppContext {
    let mut settings = Settings::default();
    settings.generation.provider = "mock".to_string();
    settings.user_rate_limit.max_per_window = max_per_window;
    AppContext::new(settings).expect("Failed to build app context")
}

#[actix_web::test]
async fn test_rpc_generate_success() {
    let ctx = mock_context_with_user_limit(20);
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "user-1"))
        .set_json(json!({"prompt": "Hello there"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(!body["response"].as_str().unwrap_or("").is_empty());

    // Accepted request is counted against the user's window and usage-logged.
    let record = ctx.store.get("user-1").unwrap().expect("record exists");
    assert_eq!(record.count, 1);
    assert_eq!(ctx.store.usage_count(), 1);
}

#[actix_web::test]
async fn test_rpc_generate_missing_identity() {
    let ctx = mock_context_with_user_limit(20);
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .set_json(json!({"prompt": "Hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Authentication required");
    assert_eq!(body["code"], "unauthenticated");
}

#[actix_web::test]
async fn test_rpc_generate_blank_identity_rejected() {
    let ctx = mock_context_with_user_limit(20);
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "   "))
        .set_json(json!({"prompt": "Hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_rpc_generate_invalid_prompt_not_counted() {
    let ctx = mock_context_with_user_limit(20);
    let app = test::init_service(create_app(&ctx)).await;
    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "user-1"))
        .set_json(json!({"prompt": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);

    // A rejected prompt never reaches the limiter.
    assert!(ctx.store.get("user-1").unwrap().is_none());
}

#[actix_web::test]
async fn test_rpc_generate_user_rate_limited() {
    let ctx = mock_context_with_user_limit(3);
    let app = test::init_service(create_app(&ctx)).await;

    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/rpc/generate")
            .insert_header(("X-User-Id", "user-1"))
            .set_json(json!({"prompt": "Hello"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "user-1"))
        .set_json(json!({"prompt": "Hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 429);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Rate limit exceeded. Please try again later.");
    assert_eq!(body["code"], "resource-exhausted");

    // The denied request was not counted and produced no usage entry.
    let record = ctx.store.get("user-1").unwrap().expect("record exists");
    assert_eq!(record.count, 3);
    assert_eq!(ctx.store.usage_count(), 3);
}

#[actix_web::test]
async fn test_rpc_generate_users_limited_independently() {
    let ctx = mock_context_with_user_limit(1);
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "user-1"))
        .set_json(json!({"prompt": "Hello"}))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "user-1"))
        .set_json(json!({"prompt": "Hello"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 429);

    let req = test::TestRequest::post()
        .uri("/rpc/generate")
        .insert_header(("X-User-Id", "user-2"))
        .set_json(json!({"prompt": "Hello"}))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());
}
