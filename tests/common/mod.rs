#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use applin::config::ClientConfig;
use applin::model::WidgetSpec;
use applin::navigation::{Entry, Overlay, Presentation, Presenter};
use applin::remote::APPLIN_RESPONSE;
use applin::widget_cache::{Widget, WidgetId};

/// Canned response for one path.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        let mut headers = Vec::new();
        if let Some(ct) = content_type {
            headers.push(("content-type".to_string(), ct.to_string()));
        }
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: body.into(),
        }
    }

    pub fn page(page: serde_json::Value) -> Self {
        let body = serde_json::json!({ "page": page }).to_string();
        Self::new(200, Some(APPLIN_RESPONSE), body)
    }

    pub fn empty() -> Self {
        Self::new(200, None, Vec::new())
    }

    pub fn user_error(status: u16, message: &str) -> Self {
        let body = serde_json::json!({ "message": message }).to_string();
        Self::new(status, Some(APPLIN_RESPONSE), body)
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::new(status, Some("text/plain; charset=utf-8"), body)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct Shared {
    routes: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// In-process page server on an ephemeral port. Stops when dropped.
pub struct FakeServer {
    pub base_url: String,
    shared: Shared,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl FakeServer {
    pub fn reply(&self, path: &str, reply: Reply) {
        self.shared
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.clone()).unwrap();
        config.retry.initial_delay_ms = 50;
        config.retry.max_delay_ms = 200;
        config
    }
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    shared.requests.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        headers,
        body: body.to_vec(),
    });
    let reply = shared.routes.lock().unwrap().get(&path).cloned();
    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, "no such page").into_response();
    };
    let mut headers = HeaderMap::new();
    for (name, value) in &reply.headers {
        headers.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    (reply.status, headers, reply.body).into_response()
}

pub async fn spawn_fake_server() -> Result<FakeServer> {
    let shared = Shared::default();
    let app = Router::new()
        .fallback(handle)
        .with_state(shared.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind fake server")?;
    let addr = listener.local_addr().context("fake server addr")?;
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(FakeServer {
        base_url: format!("http://{}", addr),
        shared,
        task,
    })
}

/// Serves `lines` as one applin stream at every path, pausing `gap` before each
/// line after the first. Returns the base URL.
pub async fn spawn_slow_stream_server(lines: Vec<String>, gap: Duration) -> Result<String> {
    let app = Router::new().fallback(move || {
        let lines = lines.clone();
        async move {
            let (mut tx, rx) = tokio::io::duplex(64 * 1024);
            tokio::spawn(async move {
                for (n, line) in lines.iter().enumerate() {
                    if n > 0 {
                        tokio::time::sleep(gap).await;
                    }
                    if tx.write_all(format!("{}\n", line).as_bytes()).await.is_err() {
                        return;
                    }
                }
            });
            let body = Body::from_stream(ReaderStream::new(rx));
            ([(CONTENT_TYPE, APPLIN_RESPONSE)], body).into_response()
        }
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind stream server")?;
    let addr = listener.local_addr().context("stream server addr")?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{}", addr))
}

/// Base URL where nothing is listening.
pub async fn closed_base_url() -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind")?;
    let addr = listener.local_addr().context("addr")?;
    drop(listener);
    Ok(format!("http://{}", addr))
}

pub fn plain_page(title: &str, widget: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "type": "plain-page", "title": title, "widget": widget })
}

pub fn nav_page(title: &str, widget: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "type": "nav-page", "title": title, "widget": widget })
}

pub fn text(s: &str) -> serde_json::Value {
    serde_json::json!({ "type": "text", "text": s })
}

/// Polls `check` until it holds or the timeout passes.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check().await
}

pub struct NoopWidget;

impl Widget for NoopWidget {
    fn new(_spec: &WidgetSpec) -> Self {
        NoopWidget
    }

    fn accepts(&self, _spec: &WidgetSpec) -> bool {
        true
    }

    fn update(&mut self, _spec: &WidgetSpec, _subs: &[WidgetId]) {}
}

/// What the recording presenter currently shows.
#[derive(Clone, Debug, Default)]
pub struct Shown {
    pub stack: Vec<String>,
    pub titles: Vec<Option<String>>,
    pub overlay: Option<String>,
    pub stack_updates: usize,
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub shown: Arc<Mutex<Shown>>,
}

#[async_trait]
impl Presenter for RecordingPresenter {
    type Widget = NoopWidget;

    async fn set_stack(&mut self, stack: &[&Entry<NoopWidget>], _animated: bool) {
        let mut shown = self.shown.lock().unwrap();
        shown.stack = stack.iter().map(|e| e.key().to_string()).collect();
        shown.titles = stack.iter().map(|e| e.title().map(str::to_string)).collect();
        shown.stack_updates += 1;
    }

    async fn present(&mut self, overlay: &Overlay, _presentation: Presentation) {
        let label = match overlay {
            Overlay::Working { text } => format!("working:{}", text),
            Overlay::Modal { key, .. } => format!("modal:{}", key),
        };
        self.shown.lock().unwrap().overlay = Some(label);
    }

    async fn dismiss(&mut self, _overlay: &Overlay, _presentation: Presentation) {
        self.shown.lock().unwrap().overlay = None;
    }

    fn page_updated(&mut self, entry: &Entry<NoopWidget>) {
        let mut shown = self.shown.lock().unwrap();
        let key = entry.key().to_string();
        if let Some(pos) = shown.stack.iter().position(|k| *k == key) {
            shown.titles[pos] = entry.title().map(str::to_string);
        }
    }
}
