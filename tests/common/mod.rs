//! Shared test utilities

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::any,
};
use tokio::net::TcpListener;

/// Canned response for one request path
#[derive(Clone)]
pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Route {
    #[must_use]
    pub fn new(path: &'static str, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            status: 200,
            content_type,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Request captured by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Local axum server answering from a route table and recording every request
pub struct MockServer {
    pub base_url: String,
    requests: Recorded,
}

impl MockServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let requests = Recorded::default();

        let mut app: Router<Recorded> = Router::new();
        for route in routes {
            let path = route.path;
            app = app.route(
                path,
                any(
                    move |State(recorded): State<Recorded>,
                          uri: Uri,
                          headers: HeaderMap,
                          body: Bytes| {
                        let route = route.clone();
                        async move {
                            record(&recorded, &uri, &headers, &body);
                            canned(&route)
                        }
                    },
                ),
            );
        }
        let app = app.fallback(not_found).with_state(Arc::clone(&requests));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

fn record(recorded: &Recorded, uri: &Uri, headers: &HeaderMap, body: &Bytes) {
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();

    recorded.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.to_vec(),
    });
}

fn canned(route: &Route) -> Response {
    let status = StatusCode::from_u16(route.status).expect("invalid status in route");
    (
        status,
        [(header::CONTENT_TYPE, route.content_type)],
        route.body.clone(),
    )
        .into_response()
}

async fn not_found(
    State(recorded): State<Recorded>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&recorded, &uri, &headers, &body);
    (StatusCode::NOT_FOUND, "not found").into_response()
}

/// One line of an Ollama chat stream
#[must_use]
pub fn chat_line(content: &str, done: bool) -> String {
    serde_json::json!({
        "model": "llama3.2:3b",
        "created_at": "2026-01-01T00:00:00Z",
        "message": { "role": "assistant", "content": content },
        "done": done,
    })
    .to_string()
}

/// Newline-delimited chat stream body
#[must_use]
pub fn chat_body(lines: &[String]) -> Vec<u8> {
    let mut body = lines.join("\n");
    body.push('\n');
    body.into_bytes()
}
