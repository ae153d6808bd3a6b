//! toolrelay HTTP server
//!
//! Routes:
//! - `POST /speak`: complete answer, optionally with base64 audio
//! - `POST /speak/stream`: final answer as a chunked text stream
//! - `POST /mcp`: JSON-RPC tool endpoint backed by the built-in registry
//! - `POST /transcribe`: multipart audio upload to text
//! - `POST /log`: client log ingestion
//! - `GET /` and `/static/*`: demo page

pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::AppState;

/// Build the complete router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/speak", post(handlers::speak))
        .route("/speak/stream", post(handlers::speak_stream))
        .route("/mcp", post(handlers::mcp))
        .route("/transcribe", post(handlers::transcribe))
        .route("/log", post(handlers::log))
        .route_service("/", index)
        .nest_service("/static", assets)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
