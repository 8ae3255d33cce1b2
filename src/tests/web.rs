//! Handler-level tests driving the axum router directly.
//!
//! The recommendation service runs over the deterministic mock embedder and
//! the generation backend points at a closed port, so no network or model
//! download is involved.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::config::GenerationConfig;
use crate::generate::SentenceGenerator;
use crate::tests::support::{full_vocabulary, service_with_index};
use crate::web;

fn test_app() -> axum::Router {
    let service = Arc::new(service_with_index(&full_vocabulary()));
    // Building the blocking reqwest client spins up and drops a short-lived
    // runtime, which is disallowed directly on an async worker thread. Mirror
    // the production blocking bridge and construct it inside `block_in_place`.
    let generator = Arc::new(tokio::task::block_in_place(|| {
        SentenceGenerator::new(GenerationConfig {
            // Nothing listens on this port.
            base_url: "http://127.0.0.1:1".to_string(),
            ..GenerationConfig::default()
        })
    }));
    web::app(service, generator, 4)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_root_reports_vocabulary_size() {
    let response = test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "wordcue");
    assert_eq!(
        body["vocabulary_size"].as_u64().unwrap() as usize,
        full_vocabulary().len()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_initial_words_are_the_starters() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/api/initial-words")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["words"],
        serde_json::json!(["안녕", "오늘", "날씨", "좋다"])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recommend_known_word() {
    let request = post_json(
        "/api/recommend",
        serde_json::json!({"word": "안녕", "context": ["오늘"]}),
    );
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 4);
    assert!(!recommendations.contains(&serde_json::json!("안녕")));
    assert!(!recommendations.contains(&serde_json::json!("오늘")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recommend_unknown_word_falls_back_to_starters() {
    let request = post_json("/api/recommend", serde_json::json!({"word": "미등록어"}));
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["recommendations"],
        serde_json::json!(["안녕", "오늘", "날씨", "좋다"])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recommend_oversized_k_is_bad_request() {
    let request = post_json(
        "/api/recommend",
        serde_json::json!({"word": "안녕", "k": 1000}),
    );
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid request"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_recommend_diverse_flag() {
    let request = post_json(
        "/api/recommend",
        serde_json::json!({"word": "안녕", "k": 3, "diverse": true}),
    );
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_empty_words_is_bad_request() {
    let request = post_json("/api/generate", serde_json::json!({"words": []}));
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_unreachable_backend_is_service_unavailable() {
    let request = post_json("/api/generate", serde_json::json!({"words": ["안녕", "오늘"]}));
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
