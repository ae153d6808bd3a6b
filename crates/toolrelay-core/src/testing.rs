//! Test helpers: in-process HTTP servers on ephemeral ports

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::logging::NoOpLogger;
use crate::rpc::Dispatcher;
use crate::tools::ToolRegistry;

async fn mcp(State(dispatcher): State<Arc<Dispatcher>>, Json(raw): Json<Value>) -> Response {
    match dispatcher.handle_value(raw) {
        Ok(response) => Json(response).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

/// Router serving the built-in tools at `/mcp`
pub fn tool_router() -> Router {
    let registry = ToolRegistry::with_builtin_tools().unwrap();
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), NoOpLogger::shared()));
    Router::new().route("/mcp", post(mcp)).with_state(dispatcher)
}

/// Serve `app` in the background and return its base URL
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// URL nothing is listening on
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/mcp", addr)
}
