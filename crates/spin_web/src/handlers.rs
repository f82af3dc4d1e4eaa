use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use spin_core::{AnalysisInput, AnalysisResult, Error, ErrorKind, HeadlineSet, Voice};
use spin_inference::Strategy;
use crate::state::StateView;
use crate::AppState;

pub enum ApiError {
    Domain(Error),
    /// A newer analysis or a navigation superseded this one.
    Stale,
    UnknownVoice(String),
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::Domain(error)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ConfigurationMissing | ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::HeadlinesUnavailable | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorKind::ArticlesNotFound => StatusCode::NOT_FOUND,
        ErrorKind::NarrationUnsupported => StatusCode::NOT_IMPLEMENTED,
        ErrorKind::RequestTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::NarrationDeviceError | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Domain(error) => {
                let kind = error.kind();
                let body = json!({
                    "kind": kind,
                    "message": error.user_message(),
                    "recoverable": error.is_recoverable(),
                });
                (status_for(kind), body)
            }
            ApiError::Stale => (
                StatusCode::CONFLICT,
                json!({ "kind": "stale", "message": "The analysis was superseded before it finished." }),
            ),
            ApiError::UnknownVoice(id) => (
                StatusCode::NOT_FOUND,
                json!({ "kind": "unknown_voice", "message": format!("No voice named {}", id) }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateView> {
    Json(state.state_view())
}

#[derive(Debug, Default, Deserialize)]
pub struct HeadlinesQuery {
    #[serde(default)]
    pub refresh: bool,
}

pub async fn fetch_headlines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeadlinesQuery>,
) -> ApiResult<HeadlineSet> {
    if !query.refresh {
        if let Some(headlines) = state.feed.as_ref().and_then(|f| f.snapshot().headlines) {
            return Ok(Json(headlines));
        }
    }

    {
        let mut view = state.view();
        view.loading = true;
        view.loading_message = Some("Fetching the latest headlines...".to_string());
        view.headlines_error = None;
    }

    let outcome = state.pipeline.discover_headlines().await;

    let mut view = state.view();
    view.loading = false;
    view.loading_message = None;
    match outcome {
        Ok(headlines) => Ok(Json(headlines)),
        Err(error) => {
            tracing::error!("❌ Headline fetch failed: {}", error);
            view.headlines_error = Some(error.user_message());
            Err(error.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub input: AnalysisInput,
    pub strategy: Option<Strategy>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<AnalysisResult> {
    let ticket = state.next_ticket();
    if let Some(narration) = &state.narration {
        narration.stop().await?;
    }
    if !state.begin_analysis(ticket, format!("Analyzing \"{}\"...", request.input.text())) {
        tracing::info!("🗑️ Analysis of \"{}\" superseded before it started", request.input.text());
        return Err(ApiError::Stale);
    }

    let strategy = request.strategy.unwrap_or_else(|| Strategy::default_for(&request.input));
    let outcome = state.pipeline.analyze_with(&request.input, strategy).await;

    if !state.is_current(ticket) {
        tracing::info!("🗑️ Dropping superseded analysis of \"{}\"", request.input.text());
        return Err(ApiError::Stale);
    }

    let mut view = state.view();
    view.loading = false;
    view.loading_message = None;
    match outcome {
        Ok(result) => {
            view.analysis = Some(result.clone());
            Ok(Json(result))
        }
        Err(error) => {
            tracing::error!("❌ Analysis failed: {}", error);
            view.analysis_error = Some(error.user_message());
            Err(error.into())
        }
    }
}

/// Navigating back: speech stops and any analysis still running is dropped.
pub async fn clear_analysis(State(state): State<Arc<AppState>>) -> ApiResult<StateView> {
    state.invalidate();
    if let Some(narration) = &state.narration {
        narration.stop().await?;
    }
    {
        let mut view = state.view();
        view.loading = false;
        view.loading_message = None;
        view.analysis = None;
        view.analysis_error = None;
    }
    Ok(Json(state.state_view()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationAction {
    Start,
    Pause,
    Resume,
    Stop,
    Toggle,
}

#[derive(Debug, Serialize)]
pub struct NarrationResponse {
    pub changed: bool,
    pub state: StateView,
}

pub async fn control_narration(
    State(state): State<Arc<AppState>>,
    Path(action): Path<NarrationAction>,
) -> ApiResult<NarrationResponse> {
    let narration = state
        .narration
        .as_ref()
        .ok_or_else(|| Error::NarrationUnsupported("no speech engine configured".to_string()))?;

    let changed = match action {
        NarrationAction::Start => {
            let analysis = state.view().analysis.clone();
            match analysis {
                Some(result) => narration.start(result).await?,
                None => false,
            }
        }
        NarrationAction::Pause => narration.pause().await?,
        NarrationAction::Resume => narration.resume().await?,
        NarrationAction::Stop => narration.stop().await?,
        NarrationAction::Toggle => narration.toggle_pause().await?,
    };

    Ok(Json(NarrationResponse { changed, state: state.state_view() }))
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
    pub selected_voice_id: Option<String>,
}

pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    let snapshot = state.narration_snapshot();
    Json(VoicesResponse {
        voices: snapshot.as_ref().map(|s| s.voices.clone()).unwrap_or_default(),
        selected_voice_id: snapshot.and_then(|s| s.preferred_voice),
    })
}

#[derive(Debug, Deserialize)]
pub struct SelectVoiceRequest {
    pub voice_id: Option<String>,
}

pub async fn select_voice(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectVoiceRequest>,
) -> ApiResult<VoicesResponse> {
    let narration = state
        .narration
        .as_ref()
        .ok_or_else(|| Error::NarrationUnsupported("no speech engine configured".to_string()))?;

    if !narration.select_voice(request.voice_id.clone()).await? {
        return Err(ApiError::UnknownVoice(request.voice_id.unwrap_or_default()));
    }
    Ok(list_voices(State(state)).await)
}
