//! End-to-end tests of the HTTP API against real backends.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use velocity_api::{AppState, Claims, TokenVerifier, create_router};
use velocity_core::{ContractorRecord, Corpus, RecordStatus};
use velocity_fts::{FtsConfig, TantivyKeywordBackend};
use velocity_search::{SearchConfig, SearchEngine};
use velocity_vector::SimpleVectorBackend;

const SECRET: &str = "integration-secret";

// ============================================================================
// Fixtures
// ============================================================================

fn corpus() -> Corpus {
    Corpus::new(vec![
        ContractorRecord::new(1, "CONT-0001")
            .with_name("John", "Martinez")
            .with_email("john.martinez@techparts.com")
            .with_company("TechParts Manufacturing Inc.")
            .with_location("Dearborn, MI")
            .with_job_description("CNC machinist for precision engine components")
            .with_embedding(vec![1.0, 0.0, 0.0]),
        ContractorRecord::new(2, "CONT-0002")
            .with_name("Lisa", "Thompson")
            .with_company("Precision Casting Solutions")
            .with_location("Warren, MI")
            .with_job_description("Quality inspector for aluminum casting"),
        ContractorRecord::new(3, "CONT-0003")
            .with_name("Robert", "Kim")
            .with_company("FastLogistics LLC")
            .with_location("Detroit, MI")
            .with_job_description("Logistics coordinator")
            .with_embedding(vec![0.0, 1.0, 0.0]),
        ContractorRecord::new(4, "CONT-0004")
            .with_name("Paul", "Precision")
            .with_company("Precision Retired Works")
            .with_status(RecordStatus::Inactive)
            .with_embedding(vec![1.0, 0.0, 0.0]),
    ])
    .unwrap()
}

fn app_for(corpus: Corpus) -> Router {
    let keyword = TantivyKeywordBackend::build(&corpus, &FtsConfig::default()).unwrap();
    let vector = SimpleVectorBackend::build(&corpus);
    let engine = SearchEngine::new(
        Arc::new(keyword),
        Arc::new(vector),
        Arc::new(corpus),
        SearchConfig::default(),
    )
    .unwrap();
    create_router(AppState::new(engine, TokenVerifier::new(SECRET)))
}

fn app() -> Router {
    app_for(corpus())
}

fn token_with(secret: &str, exp_offset: i64) -> String {
    let now = jsonwebtoken::get_current_timestamp() as i64;
    let claims = Claims {
        id: 1,
        email: "admin@velocity.test".to_string(),
        role: "admin".to_string(),
        exp: (now + exp_offset) as u64,
        iat: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn token() -> String {
    token_with(SECRET, 3600)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .body(Body::empty())
        .unwrap()
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

fn ids(body: &Value) -> Vec<i64> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

// ============================================================================
// Health and auth
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_missing_token() {
    let request = Request::builder()
        .uri("/api/search/test")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "No token provided"}));
}

#[tokio::test]
async fn test_invalid_tokens() {
    for bad in [
        "garbage".to_string(),
        token_with("wrong-secret", 3600),
        token_with(SECRET, -3600),
    ] {
        let request = Request::builder()
            .uri("/api/search/test")
            .header(header::AUTHORIZATION, format!("Bearer {bad}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Invalid token"}));
    }
}

#[tokio::test]
async fn test_auth_checked_before_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/search/hybrid")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Hybrid
// ============================================================================

#[tokio::test]
async fn test_hybrid_keyword_only() {
    let (status, body) = send(app(), post("/api/search/hybrid", json!({"query": "precision"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "keyword_only");

    let mut found = ids(&body);
    found.sort();
    assert_eq!(found, vec![1, 2]);

    let first = &body["results"][0];
    assert_eq!(first["rank"], 1);
    assert!(first["score"].as_f64().unwrap() > 0.0);
    assert!(first.get("contractor_id").is_some());
}

#[tokio::test]
async fn test_hybrid_null_embedding_falls_back() {
    let (status, body) = send(
        app(),
        post("/api/search/hybrid", json!({"query": "logistics", "embedding": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "keyword_only");
    assert_eq!(ids(&body), vec![3]);
}

#[tokio::test]
async fn test_hybrid_fused() {
    let (status, body) = send(
        app(),
        post(
            "/api/search/hybrid",
            json!({"query": "casting", "embedding": [0.0, 1.0, 0.0], "limit": 10}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "hybrid_rrf");

    // casting -> Lisa (keyword only); embedding -> Robert then John (vector only)
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(ids(&body), vec![3, 1, 2]);

    let robert = &results[0];
    assert_eq!(robert["vector_rank"], 1);
    assert!(robert.get("keyword_rank").is_none());
    let expected = 0.6 / 61.0;
    assert!((robert["rrf_score"].as_f64().unwrap() - expected).abs() < 1e-12);

    let lisa = &results[2];
    assert_eq!(lisa["keyword_rank"], 1);
    assert!(lisa.get("vector_rank").is_none());
}

#[tokio::test]
async fn test_hybrid_never_returns_inactive() {
    let (_, body) = send(
        app(),
        post(
            "/api/search/hybrid",
            json!({"query": "precision retired", "embedding": [1.0, 0.0, 0.0]}),
        ),
    )
    .await;
    assert!(!ids(&body).contains(&4));
}

#[tokio::test]
async fn test_hybrid_limit() {
    let (status, body) = send(
        app(),
        post(
            "/api/search/hybrid",
            json!({"query": "mi", "embedding": [1.0, 1.0, 0.0], "limit": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_hybrid_missing_query() {
    for body in [json!({}), json!({"query": ""}), json!({"query": "  ", "limit": 5})] {
        let (status, response) = send(app(), post("/api/search/hybrid", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Query parameter is required"}));
    }
}

#[tokio::test]
async fn test_hybrid_bad_inputs() {
    let cases = [
        json!({"query": "casting", "embedding": "not-an-array"}),
        json!({"query": "casting", "embedding": []}),
        json!({"query": "casting", "embedding": [1.0, 0.0]}),
        json!({"query": "casting", "limit": 0}),
        json!({"query": "casting", "limit": 1000}),
        json!({"query": "casting", "limit": -1}),
    ];
    for case in cases {
        let (status, body) = send(app(), post("/api/search/hybrid", case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
        assert!(body["error"].is_string(), "{case}");
        assert!(body.get("details").is_none(), "{case}");
    }
}

#[tokio::test]
async fn test_hybrid_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/search/hybrid")
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"query\": "))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Semantic
// ============================================================================

#[tokio::test]
async fn test_semantic_search() {
    let (status, body) = send(
        app(),
        post("/api/search/semantic", json!({"embedding": [0.9, 0.1, 0.0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "semantic");
    assert_eq!(ids(&body), vec![1, 3]);
    assert_eq!(body["results"][0]["rank"], 1);
}

#[tokio::test]
async fn test_semantic_requires_embedding_array() {
    for case in [json!({}), json!({"embedding": null}), json!({"embedding": "x"})] {
        let (status, body) = send(app(), post("/api/search/semantic", case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Embedding array is required"}));
    }
}

#[tokio::test]
async fn test_semantic_rejects_degenerate_embeddings() {
    for case in [
        json!({"embedding": []}),
        json!({"embedding": [0.0, 0.0, 0.0]}),
        json!({"embedding": [1.0]}),
    ] {
        let (status, _) = send(app(), post("/api/search/semantic", case)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

// ============================================================================
// Status
// ============================================================================

#[tokio::test]
async fn test_status() {
    let (status, body) = send(app(), get("/api/search/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": "Hybrid search system status",
            "stats": {"total_contractors": 3, "has_fts": 3, "has_embedding": 2},
            "capabilities": {"keyword_search": true, "semantic_search": true, "hybrid_rrf": true}
        })
    );
}

#[tokio::test]
async fn test_status_without_embeddings() {
    let corpus = Corpus::new(vec![
        ContractorRecord::new(1, "CONT-0001").with_name("Ann", "Lee"),
    ])
    .unwrap();
    let (status, body) = send(app_for(corpus), get("/api/search/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capabilities"]["semantic_search"], false);
    assert_eq!(body["capabilities"]["hybrid_rrf"], false);
    assert_eq!(body["capabilities"]["keyword_search"], true);
}
