//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use maskwise_chat::TextGenerator;
use maskwise_core::{Error, Result, ServiceConfig};
use maskwise_engine::{EntityDetector, EntityType, Span};
use maskwise_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Flags every occurrence of fixed needles.
struct NeedleDetector {
    needles: Vec<(EntityType, &'static str)>,
}

#[async_trait]
impl EntityDetector for NeedleDetector {
    async fn analyze(&self, text: &str, requested: &[EntityType], min_score: f64) -> Result<Vec<Span>> {
        let mut spans = Vec::new();
        for (entity_type, needle) in &self.needles {
            if !requested.contains(entity_type) || min_score > 0.9 {
                continue;
            }
            for (start, _) in text.match_indices(needle) {
                spans.push(Span::from_source(
                    *entity_type,
                    text,
                    start,
                    start + needle.len(),
                    0.9,
                )?);
            }
        }
        Ok(spans)
    }

    fn name(&self) -> &'static str {
        "needle"
    }
}

struct BrokenDetector;

#[async_trait]
impl EntityDetector for BrokenDetector {
    async fn analyze(&self, _text: &str, _requested: &[EntityType], _min_score: f64) -> Result<Vec<Span>> {
        Err(Error::DetectorUnavailable("connection refused".into()))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Returns a span that runs backwards.
struct InvertedSpanDetector;

#[async_trait]
impl EntityDetector for InvertedSpanDetector {
    async fn analyze(&self, text: &str, _requested: &[EntityType], _min_score: f64) -> Result<Vec<Span>> {
        Ok(vec![Span {
            entity_type: EntityType::Person,
            start: 4,
            end: 2,
            score: 0.9,
            text: text.chars().take(2).collect(),
        }])
    }

    fn name(&self) -> &'static str {
        "inverted"
    }
}

/// Replies with a fixed text and remembers every prompt it was shown.
struct ScriptedGenerator {
    reply: std::result::Result<String, String>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, anonymized: &str, _allowed: &[String]) -> Result<String> {
        self.seen.lock().unwrap().push(anonymized.to_string());
        self.reply.clone().map_err(Error::GeneratorFailure)
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

fn contact_detector() -> Arc<dyn EntityDetector> {
    Arc::new(NeedleDetector {
        needles: vec![
            (EntityType::Person, "John Smith"),
            (EntityType::Person, "Sarah"),
            (EntityType::EmailAddress, "john@example.com"),
            (EntityType::PhoneNumber, "555-123-4567"),
        ],
    })
}

fn app(detector: Arc<dyn EntityDetector>, generator: Option<Arc<dyn TextGenerator>>) -> Router {
    build_router(Arc::new(AppState::new(
        ServiceConfig::default(),
        detector,
        generator,
    )))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(contact_detector(), None), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "active"}));
}

#[tokio::test]
async fn test_process_rejects_get() {
    let request = Request::builder().uri("/process").body(Body::empty()).unwrap();
    let (status, body) = send(app(contact_detector(), None), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Use POST method"}));
}

#[tokio::test]
async fn test_process_round_trip() {
    let generator = ScriptedGenerator::replying(
        "I will email <EMAIL_ADDRESS_1> and call <PHONE_NUMBER_1> for <PERSON_1>.",
    );
    let router = app(contact_detector(), Some(generator.clone()));
    let prompt = "Contact John Smith at john@example.com or 555-123-4567.";

    let (status, body) = send(router, post_json("/process", json!({"prompt": prompt}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["anonymized_prompt"],
        "Contact <PERSON_1> at <EMAIL_ADDRESS_1> or <PHONE_NUMBER_1>."
    );
    assert_eq!(
        body["response"],
        "I will email john@example.com and call 555-123-4567 for John Smith."
    );
    assert_eq!(
        body["mapping"][0],
        json!({"type": "PERSON", "original": "John Smith", "anonymized": "<PERSON_1>"})
    );
    assert_eq!(body["mapping"].as_array().unwrap().len(), 3);

    let seen = generator.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].contains("John Smith"));
    assert!(!seen[0].contains("john@example.com"));
}

#[tokio::test]
async fn test_process_drops_invented_placeholders() {
    let generator = ScriptedGenerator::replying("Hello <PERSON_1>, your code is <PASSWORD_1>.");
    let router = app(contact_detector(), Some(generator));

    let (status, body) = send(router, post_json("/process", json!({"prompt": "My name is Sarah"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["anonymized_prompt"], "My name is <PERSON_1>");
    assert_eq!(body["response"], "Hello Sarah, your code is .");
}

#[tokio::test]
async fn test_process_missing_prompt_is_empty() {
    let generator = ScriptedGenerator::replying("Nothing to do.");
    let router = app(contact_detector(), Some(generator.clone()));

    let (status, body) = send(router, post_json("/process", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["anonymized_prompt"], "");
    assert_eq!(body["mapping"], json!([]));
    assert_eq!(generator.seen.lock().unwrap().as_slice(), [String::new()]);
}

#[tokio::test]
async fn test_generator_failure_is_bad_gateway() {
    let router = app(contact_detector(), Some(ScriptedGenerator::failing("API error 500")));

    let (status, body) = send(router, post_json("/process", json!({"prompt": "Hi Sarah"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Text generator failed: API error 500"}));
}

#[tokio::test]
async fn test_missing_generator_is_unavailable() {
    let (status, body) = send(
        app(contact_detector(), None),
        post_json("/process", json!({"prompt": "Hi Sarah"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "No LLM provider configured"}));
}

#[tokio::test]
async fn test_detector_failure_is_bad_gateway() {
    let generator = ScriptedGenerator::replying("unused");
    let router = app(Arc::new(BrokenDetector), Some(generator.clone()));

    let (status, body) = send(router, post_json("/process", json!({"prompt": "Hi Sarah"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
    assert!(generator.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_span_is_bad_gateway() {
    let generator = ScriptedGenerator::replying("unused");
    let router = app(Arc::new(InvertedSpanDetector), Some(generator.clone()));

    let (status, body) = send(router, post_json("/process", json!({"prompt": "Hi Sarah"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid span"));
    assert!(generator.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/process")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"prompt\": "))
        .unwrap();
    let (status, body) = send(app(contact_detector(), None), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_anonymize_endpoint() {
    let router = app(contact_detector(), None);
    let prompt = "Email john@example.com, then email john@example.com again.";

    let (status, body) = send(router, post_json("/anonymize", json!({"prompt": prompt}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["anonymized_prompt"],
        "Email <EMAIL_ADDRESS_1>, then email <EMAIL_ADDRESS_1> again."
    );
    assert_eq!(
        body["mapping"],
        json!([{"type": "EMAIL_ADDRESS", "original": "john@example.com", "anonymized": "<EMAIL_ADDRESS_1>"}])
    );
}

#[tokio::test]
async fn test_restore_endpoint() {
    let router = app(contact_detector(), None);
    let payload = json!({
        "text": "Dear <PERSON_1>, see <URL_4>.",
        "mapping": [{"type": "PERSON", "original": "Sarah", "anonymized": "<PERSON_1>"}],
    });

    let (status, body) = send(router, post_json("/restore", payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "Dear Sarah, see ."}));
}

#[tokio::test]
async fn test_cors_preflight() {
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/process")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let response = app(contact_detector(), None)
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let response = app(contact_detector(), None)
        .oneshot(preflight("http://evil.example"))
        .await
        .unwrap();
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
