/// Integration tests with a mocked model provider
/// Drives the full router (auth, validation, prompt, model call, shape check)
/// without hitting the real provider
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use universe_api::config::Config;
use universe_api::handlers::AppState;
use universe_api::llm_client::LlmClient;
use universe_api::server::{build_rate_limited_router, build_router};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-master-key";

/// Helper function to create the router against a mock provider
fn create_test_app(provider_url: &str, master_key: Option<&str>) -> Router {
    let config = Config::for_tests(provider_url, master_key);
    let llm = LlmClient::from_config(&config)
        .unwrap()
        .with_retry_delay(Duration::from_millis(1));
    build_router(Arc::new(AppState::new(config, llm)))
}

fn post_json(uri: &str, body: &Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Wraps model output in a chat-completions envelope
fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn completion_json(plan: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(completion(&plan.to_string()))
}

fn workout_profile() -> Value {
    json!({
        "age": 30,
        "gender": "M",
        "weight": 75.0,
        "height": 180,
        "fitness_level": "intermediate",
        "primary_goal": "muscle_gain",
        "available_equipment": "full_gym",
        "sessions_per_week": 4,
        "session_duration": 60
    })
}

fn nutrition_profile() -> Value {
    json!({
        "age": 28,
        "gender": "F",
        "weight": 65.0,
        "height": 168,
        "target_weight": 60.0,
        "activity_level": "moderately_active",
        "nutrition_goal": "weight_loss",
        "dietary_restrictions": ["vegetarian"],
        "allergies": ["peanuts"]
    })
}

fn tips_profile() -> Value {
    json!({
        "domain": "sleep",
        "experience_level": "beginner",
        "format_preference": "quick_tips",
        "current_challenges": ["poor sleep"]
    })
}

fn workout_plan() -> Value {
    json!({
        "warmup": {"duration": "10 minutes", "exercises": []},
        "main_workout": {"duration": "40 minutes", "exercises": [{"name": "Bench Press"}]},
        "cooldown": {"duration": "10 minutes", "exercises": []},
        "workout_summary": {"total_time": "60 minutes", "difficulty": "intermediate"}
    })
}

fn nutrition_plan() -> Value {
    json!({
        "daily_calories": 1900,
        "daily_macros": {"protein_g": 130, "carbs_g": 200, "fat_g": 53},
        "meals": [{"name": "Breakfast"}, {"name": "Lunch"}, {"name": "Dinner"}],
        "weekly_meal_prep": {"sunday": ["cook lentils"]},
        "shopping_list": ["lentils", "oats"]
    })
}

fn tips_reply(count: usize) -> Value {
    let tips: Vec<Value> = (0..count)
        .map(|i| json!({"title": format!("Tip {}", i), "difficulty": "easy"}))
        .collect();
    json!({
        "tips": tips,
        "implementation_strategy": {"start_with": "Tip 0"},
        "priority_order": ["Tip 0"]
    })
}

#[tokio::test]
async fn test_workout_generation_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("test-openai-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 2500,
            "response_format": {"type": "json_object"}
        })))
        .respond_with(completion_json(&workout_plan()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    for key in ["warmup", "main_workout", "cooldown", "workout_summary"] {
        assert!(body.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(body, workout_plan());
}

#[tokio::test]
async fn test_out_of_range_age_rejected_without_provider_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion_json(&workout_plan()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut profile = workout_profile();
    profile["age"] = json!(150);

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &profile, Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation failed");
    let detail = body["detail"].as_array().unwrap();
    assert!(detail.iter().any(|issue| issue["field"] == "age"));
}

#[tokio::test]
async fn test_unknown_enum_value_is_validation_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_json(&workout_plan()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut profile = workout_profile();
    profile["primary_goal"] = json!("become_superhero");

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &profile, Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_array());
}

#[tokio::test]
async fn test_missing_content_type_is_validation_error() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri(), None);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/fitness/workout")
        .body(Body::from(workout_profile().to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["field"], "content-type");
}

#[tokio::test]
async fn test_wrong_type_reported_under_field_name() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_json(&workout_plan()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut profile = workout_profile();
    profile["age"] = json!("invalid");

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &profile, Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_array().unwrap();
    assert!(detail.iter().any(|issue| issue["field"] == "age"));
}

#[tokio::test]
async fn test_every_missing_field_listed() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri(), Some(API_KEY));

    let (status, body) = send(
        app,
        post_json("/api/v1/nutrition/plan", &json!({"age": 30}), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["detail"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|issue| issue["field"].as_str())
        .collect();
    assert_eq!(
        fields,
        vec!["gender", "weight", "height", "activity_level", "nutrition_goal"]
    );
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion_json(&workout_plan()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));

    let (status, body) = send(
        app.clone(),
        post_json("/api/v1/fitness/workout", &workout_profile(), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    // Auth runs before body parsing
    let (status, _) = send(
        app.clone(),
        post_json("/api/v1/tips/generate", &json!({"domain": "nope"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app,
        post_json(
            "/api/v1/nutrition/plan",
            &nutrition_profile(),
            Some("wrong-key"),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_disabled_without_master_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&workout_plan()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), None);
    let (status, _) = send(
        app,
        post_json("/api/v1/fitness/workout", &workout_profile(), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_incomplete_reply_names_missing_key() {
    let mock_server = MockServer::start().await;

    let mut plan = workout_plan();
    plan.as_object_mut().unwrap().remove("cooldown");

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&plan))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Incomplete AI response");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("incomplete"));
    assert!(message.contains("cooldown"));
}

#[tokio::test]
async fn test_invalid_json_exhausts_retry_budget() {
    let mock_server = MockServer::start().await;

    // retry_budget 2 => 3 attempts
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("Sure! Here is your plan: {warmup")),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Malformed AI response");
    // Parser detail is logged, not returned
    assert!(!body.to_string().contains("{warmup"));
}

#[tokio::test]
async fn test_invalid_json_then_valid_reply_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("not json")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&nutrition_plan()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/nutrition/plan", &nutrition_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["daily_calories"], 1900);
}

#[tokio::test]
async fn test_provider_error_is_service_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/tips/generate", &tips_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "AI service temporarily unavailable");
    assert!(!body.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_rejected_provider_credentials_are_configuration_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Service misconfigured");
}

#[tokio::test]
async fn test_tips_require_three_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&tips_reply(2)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/tips/generate", &tips_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("tips"));
}

#[tokio::test]
async fn test_tips_generation_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 2000})))
        .respond_with(completion_json(&tips_reply(4)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (status, body) = send(
        app,
        post_json("/api/v1/tips/generate", &tips_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tips"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_identical_requests_yield_identical_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&workout_plan()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (first_status, first) = send(
        app.clone(),
        post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
    )
    .await;
    let (second_status, second) = send(
        app,
        post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
    )
    .await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);

    // Same profile must produce the same prompt
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_metadata_lists() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri(), Some(API_KEY));

    let routes = [
        ("/api/v1/metadata/fitness/fitness-levels", "fitness_levels"),
        ("/api/v1/metadata/fitness/equipment", "equipment_options"),
        ("/api/v1/metadata/fitness/goals", "goals"),
        ("/api/v1/metadata/nutrition/dietary-preferences", "dietary_preferences"),
        ("/api/v1/metadata/nutrition/activity-levels", "activity_levels"),
        ("/api/v1/metadata/nutrition/goals", "goals"),
        ("/api/v1/metadata/tips/fitness-levels", "fitness_levels"),
        ("/api/v1/metadata/tips/challenges", "challenges"),
        ("/api/v1/metadata/tips/activities", "activities"),
        ("/api/v1/metadata/tips/health-conditions", "health_conditions"),
        ("/api/v1/metadata/tips/domains", "domains"),
        ("/api/v1/metadata/tips/formats", "formats"),
    ];

    for (uri, list_name) in routes {
        // Metadata is public
        let (status, body) = send(app.clone(), get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        let entries = body[list_name].as_array().unwrap();
        assert!(!entries.is_empty(), "{} is empty", uri);
        for entry in entries {
            assert!(entry["id"].is_string());
            assert!(entry["name"].is_string());
            assert!(entry["description"].is_string());
        }
    }
}

#[tokio::test]
async fn test_catalog_ids_are_accepted_by_profiles() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&workout_plan()))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));
    let (_, body) = send(app.clone(), get("/api/v1/metadata/fitness/equipment")).await;

    for entry in body["equipment_options"].as_array().unwrap() {
        let mut profile = workout_profile();
        profile["available_equipment"] = entry["id"].clone();
        let (status, _) = send(
            app.clone(),
            post_json("/api/v1/fitness/workout", &profile, Some(API_KEY)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{} rejected", entry["id"]);
    }
}

#[tokio::test]
async fn test_service_endpoints() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri(), Some(API_KEY));

    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, body) = send(app.clone(), get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/tips/generate"].is_object());

    let response = app.oneshot(get("/redoc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri(), Some(API_KEY));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/fitness/workout")
        .header(header::ORIGIN, "https://app.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-api-key,content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_concurrent_generations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&workout_plan()).set_delay(Duration::from_millis(50)))
        .expect(5)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri(), Some(API_KEY));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                send(
                    app,
                    post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY)),
                )
                .await
                .0
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_rate_limit_applies_per_ip_to_generation_routes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion_json(&workout_plan()))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = Config::for_tests(&mock_server.uri(), Some(API_KEY));
    let llm = LlmClient::from_config(&config)
        .unwrap()
        .with_retry_delay(Duration::from_millis(1));
    let app = build_rate_limited_router(Arc::new(AppState::new(config, llm)), 10, 2).unwrap();

    let from = |ip: &str, mut request: Request<Body>| {
        request
            .headers_mut()
            .insert("x-forwarded-for", ip.parse().unwrap());
        request
    };
    let workout = || post_json("/api/v1/fitness/workout", &workout_profile(), Some(API_KEY));

    for _ in 0..2 {
        let (status, _) = send(app.clone(), from("203.0.113.7", workout())).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(app.clone(), from("203.0.113.7", workout())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Metadata stays open for the same client
    let (status, body) = send(
        app.clone(),
        from("203.0.113.7", get("/api/v1/metadata/fitness/goals")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["goals"].is_array());

    // Another client has its own quota
    let (status, _) = send(app, from("198.51.100.20", workout())).await;
    assert_eq!(status, StatusCode::OK);
}
