//! Stub upstream endpoint for tests
//!
//! Binds an axum server on an ephemeral local port, records every JSON body
//! posted to `/api/chat`, and answers with a configurable status, body and
//! delay.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::sync::Mutex;

struct StubState {
    calls: Mutex<Vec<Value>>,
    reply: Mutex<(StatusCode, String)>,
    delay: Mutex<Option<Duration>>,
}

pub struct StubUpstream {
    url: String,
    state: Arc<StubState>,
}

impl StubUpstream {
    pub async fn start(body: &str) -> Self {
        let state = Arc::new(StubState {
            calls: Mutex::new(Vec::new()),
            reply: Mutex::new((StatusCode::OK, body.to_string())),
            delay: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/chat", post(handle))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}/api/chat", addr),
            state,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn respond(&self, status: StatusCode, body: &str) {
        *self.state.reply.lock().await = (status, body.to_string());
    }

    /// Wait this long before answering each request
    pub async fn delay(&self, delay: Duration) {
        *self.state.delay.lock().await = Some(delay);
    }

    /// Request bodies received so far, oldest first
    pub async fn calls(&self) -> Vec<Value> {
        self.state.calls.lock().await.clone()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.calls.lock().await.push(body);
    let delay = *state.delay.lock().await;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    state.reply.lock().await.clone()
}
