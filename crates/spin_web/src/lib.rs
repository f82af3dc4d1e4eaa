use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::{AppState, StateView, ViewModel};

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/state", get(handlers::get_state))
        .route("/api/headlines", get(handlers::fetch_headlines))
        .route("/api/analysis", post(handlers::analyze).delete(handlers::clear_analysis))
        .route("/api/narration/:action", post(handlers::control_narration))
        .route("/api/voices", get(handlers::list_voices))
        .route("/api/voices/selected", put(handlers::select_voice))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub mod prelude {
    pub use crate::{create_app, AppState};
    pub use spin_core::{Error, Result};
}
