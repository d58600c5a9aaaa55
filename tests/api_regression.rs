//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and
//! exercise the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port — runs in CI without `#[ignore]`.

use agrosense::advisor::{AdvisoryEngine, CropInfoTable, MarketBoard};
use agrosense::api::{create_app, DashboardState};
use agrosense::chat::{ChatBackend, ChatError};
use agrosense::config::{NarrationConfig, WeatherConfig};
use agrosense::model::{ArtifactMetadata, DecisionTree, ModelArtifact, TreeNode, ARTIFACT_VERSION};
use agrosense::narration::Narrator;
use agrosense::weather::WeatherClient;
use agrosense::FEATURE_NAMES;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

/// Chat stub that always answers, or always fails, without HTTP.
struct StubChat {
    fail: bool,
}

#[async_trait]
impl ChatBackend for StubChat {
    async fn ask(&self, query: &str) -> Result<String, ChatError> {
        if self.fail {
            Err(ChatError::MissingApiKey)
        } else {
            Ok(format!("stub answer to: {query}"))
        }
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}

/// A two-label artifact: rainfall > 150 votes rice, else wheat.
fn test_classifier() -> ModelArtifact {
    ModelArtifact {
        version: ARTIFACT_VERSION,
        feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
        labels: vec!["rice".to_string(), "wheat".to_string()],
        trees: vec![DecisionTree {
            root: TreeNode::Split {
                feature: 6,
                threshold: 150.0,
                left: Box::new(TreeNode::Leaf { label: 1 }),
                right: Box::new(TreeNode::Leaf { label: 0 }),
            },
        }],
        metadata: ArtifactMetadata {
            trained_at: "2025-01-01T00:00:00Z".to_string(),
            dataset_rows: 2,
            holdout_accuracy: 1.0,
            seed: 42,
        },
    }
}

fn create_test_state(chat_fails: bool) -> DashboardState {
    let classifier = Arc::new(test_classifier().into_classifier().expect("valid artifact"));
    // Unroutable provider so forecast attempts fail fast
    let weather = WeatherClient::new(&WeatherConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_key: "test".to_string(),
        timeout_secs: 1,
    });
    let crop_info = Arc::new(CropInfoTable::builtin());
    let engine = Arc::new(AdvisoryEngine::new(
        classifier,
        weather.clone(),
        crop_info.clone(),
        Narrator::new(NarrationConfig::default()),
    ));
    DashboardState {
        engine,
        weather,
        chat: Arc::new(StubChat { fail: chat_fails }),
        market: Arc::new(MarketBoard::builtin()),
        crop_info,
    }
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// All side-effect-free GET endpoints should return 200 with an envelope.
#[tokio::test]
async fn test_get_endpoints_return_envelope() {
    let endpoints = [
        "/api/v1/dashboard",
        "/api/v1/health",
        "/api/v1/market",
        "/api/v1/market/rice",
        "/api/v1/crops/rice",
        "/api/v1/crops/durian",
    ];

    for endpoint in &endpoints {
        let app = create_app(create_test_state(false));
        let resp = app
            .oneshot(Request::builder().uri(*endpoint).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(
            resp.status().is_success(),
            "GET {endpoint} returned status {}",
            resp.status()
        );
        let v = body_json(resp).await;
        assert!(v.get("data").is_some(), "GET {endpoint} missing data envelope");
        assert_eq!(v["meta"]["version"], "1");
    }
}

#[tokio::test]
async fn test_advise_without_city_uses_defaults() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(post_json(
            "/api/v1/advise",
            serde_json::json!({
                "nitrogen": 85.0,
                "phosphorus": 45.0,
                "potassium": 45.0,
                "ph": 6.5,
                "rainfall": 200.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["crop"], "rice");
    assert_eq!(v["data"]["environment"]["temperature"], 25.0);
    assert_eq!(v["data"]["environment"]["humidity"], 50.0);
    assert_eq!(v["data"]["weather_source"]["kind"], "default");
    // Low nitrogen line only; P and K sit on the lower band edge
    assert_eq!(
        v["data"]["fertilizer"]["lines"][0],
        "Nitrogen is low. Use Urea or Ammonium Sulphate."
    );
}

#[tokio::test]
async fn test_advise_with_unreachable_weather_still_succeeds() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(post_json(
            "/api/v1/advise",
            serde_json::json!({
                "nitrogen": 100.0,
                "phosphorus": 50.0,
                "potassium": 50.0,
                "city": "Kadapa,IN",
                "rainfall": 60.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["crop"], "wheat");
    assert_eq!(v["data"]["environment"]["temperature"], 25.0);
    assert_eq!(v["data"]["environment"]["humidity"], 50.0);
}

#[tokio::test]
async fn test_advise_rejects_non_finite_input() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(post_json(
            "/api/v1/advise",
            serde_json::json!({
                "nitrogen": 85.0,
                "phosphorus": 45.0,
                "potassium": 45.0,
                "ph": null,
                "rainfall": 200.0
            }),
        ))
        .await
        .unwrap();
    // serde rejects null for a defaulted f64 at deserialization time
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_weather_route_unavailable_maps_to_503() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/weather?city=Kadapa,IN")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(v["error"]["message"], "Weather data unavailable");
}

#[tokio::test]
async fn test_market_quote_miss_is_404() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/market/durian")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_crop_info_miss_is_neutral() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/crops/durian")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert!(v["data"]["info"].is_null());
    assert_eq!(v["data"]["message"], "No detailed info available.");
}

#[tokio::test]
async fn test_crop_info_lookup_case_insensitive() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/crops/RICE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["crop"], "rice");
    assert!(v["data"]["info"]["tips"].as_str().unwrap().contains("water"));
}

#[tokio::test]
async fn test_chat_relay_success() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(post_json(
            "/api/v1/chat",
            serde_json::json!({"query": "When should I sow wheat?"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let v = body_json(resp).await;
    assert_eq!(v["data"]["answer"], "stub answer to: When should I sow wheat?");
}

#[tokio::test]
async fn test_chat_failure_rendered_per_kind() {
    let app = create_app(create_test_state(true));
    let resp = app
        .oneshot(post_json(
            "/api/v1/chat",
            serde_json::json!({"query": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let v = body_json(resp).await;
    assert_eq!(v["error"]["message"], "Chat assistant is not configured");
}

#[tokio::test]
async fn test_dashboard_page_served_on_fallback() {
    let app = create_app(create_test_state(false));
    let resp = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
