use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};
use tower::ServiceExt;
use spin_core::{CompletionModel, CompletionRequest, Result, Voice};
use spin_inference::models::DummyModel;
use spin_inference::{AnalysisPipeline, PipelineConfig};
use spin_narration::{NarrationConfig, NarrationController, Narrator, SilentSpeechDevice};
use spin_web::{create_app, AppState};

fn narration() -> spin_narration::NarrationHandle {
    let (events, events_rx) = mpsc::unbounded_channel();
    let voices = vec![Voice { id: "v1".into(), name: "Samantha".into(), lang: "en-US".into(), local_service: true }];
    let device = SilentSpeechDevice::with_voices(events, voices);
    let config = NarrationConfig { settle_delay: Duration::from_millis(1), ..NarrationConfig::default() };
    NarrationController::spawn(Narrator::new(device, config), events_rx)
}

fn app(model: Arc<dyn CompletionModel>, with_narration: bool) -> Router {
    let pipeline = Arc::new(AnalysisPipeline::new(model, PipelineConfig::default()));
    create_app(AppState::new(pipeline, with_narration.then(narration)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn topic(text: &str) -> Value {
    json!({ "input": { "type": "topic", "value": text } })
}

#[tokio::test]
async fn test_headlines_and_direct_analysis() {
    let app = app(Arc::new(DummyModel::new()), true);

    let (status, headlines) = send(&app, Method::GET, "/api/headlines", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headlines["latest"].as_array().unwrap().len(), 2);

    let headline = headlines["left_leaning"][0].clone();
    let body = json!({ "input": { "type": "headline", "value": headline }, "strategy": "direct" });
    let (status, result) = send(&app, Method::POST, "/api/analysis", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["schema_version"], 1);
    assert_eq!(result["perspectives"].as_array().unwrap().len(), 3);

    let (_, state) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(state["loading"], false);
    assert_eq!(state["has_analysis"], true);
    assert_eq!(state["speech_state"], "stopped");
}

#[tokio::test]
async fn test_narration_controls() {
    let app = app(Arc::new(DummyModel::new()), true);

    // Nothing to narrate yet.
    let (status, body) = send(&app, Method::POST, "/api/narration/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);
    let (_, body) = send(&app, Method::POST, "/api/narration/pause", None).await;
    assert_eq!(body["changed"], false);

    let (status, _) = send(&app, Method::POST, "/api/analysis", Some(topic("tax plan"))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, Method::POST, "/api/narration/start", None).await;
    assert_eq!(body["changed"], true);

    let (_, body) = send(&app, Method::POST, "/api/narration/stop", None).await;
    assert_eq!(body["state"]["speech_state"], "stopped");
    assert_eq!(body["state"]["active_section_id"], Value::Null);

    let (status, _) = send(&app, Method::POST, "/api/narration/rewind", None).await;
    assert!(!status.is_success());
}

#[tokio::test]
async fn test_voice_selection() {
    let app = app(Arc::new(DummyModel::new()), true);

    let (_, voices) = send(&app, Method::GET, "/api/voices", None).await;
    assert_eq!(voices["voices"][0]["name"], "Samantha");
    assert_eq!(voices["selected_voice_id"], Value::Null);

    let (status, voices) =
        send(&app, Method::PUT, "/api/voices/selected", Some(json!({ "voice_id": "v1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voices["selected_voice_id"], "v1");

    let (status, error) =
        send(&app, Method::PUT, "/api/voices/selected", Some(json!({ "voice_id": "nope" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["kind"], "unknown_voice");
}

#[tokio::test]
async fn test_narration_unavailable() {
    let app = app(Arc::new(DummyModel::new()), false);
    let (status, error) = send(&app, Method::POST, "/api/narration/start", None).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(error["kind"], "narration_unsupported");
    assert_eq!(error["recoverable"], false);

    let (_, state) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(state["narration_available"], false);
}

/// Holds every request until released.
#[derive(Debug, Default)]
struct GatedModel {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl CompletionModel for GatedModel {
    fn name(&self) -> &str {
        "Gated"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.entered.notify_one();
        self.release.notified().await;
        DummyModel::new().complete(request).await
    }
}

#[tokio::test]
async fn test_navigating_back_drops_pending_analysis() {
    let model = Arc::new(GatedModel::default());
    let app = app(model.clone(), true);

    let pending = {
        let app = app.clone();
        let body = json!({
            "input": { "type": "headline", "value": {
                "text": "Senate passes budget", "source": "AP", "tone_emoji": "📰",
                "published_at": null, "url": null
            }}
        });
        tokio::spawn(async move { send(&app, Method::POST, "/api/analysis", Some(body)).await })
    };

    model.entered.notified().await;
    let (_, state) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(state["loading"], true);

    let (status, state) = send(&app, Method::DELETE, "/api/analysis", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["loading"], false);

    model.release.notify_one();
    let (status, error) = pending.await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["kind"], "stale");

    let (_, state) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(state["has_analysis"], false);
    assert_eq!(state["analysis_error"], Value::Null);
}
