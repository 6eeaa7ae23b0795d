// ABOUTME: Static file server implementing the ServerProcess contract
// ABOUTME: Serves the workspace root over HTTP with a graceful shutdown trigger

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Path as AxumPath, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tower_http::cors::{Any, CorsLayer};

use crate::host::ServerProcess;
use crate::types::ServerEvent;

struct RunningServer {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    port: u16,
}

/// Serves files under a root directory. `start` binds and reports readiness
/// through the event channel the host wires to the coordinator's connected
/// handler; `stop` triggers graceful shutdown and waits for it.
pub struct StaticPreviewServer {
    root: PathBuf,
    host: String,
    events: mpsc::UnboundedSender<ServerEvent>,
    running: RwLock<Option<RunningServer>>,
}

impl StaticPreviewServer {
    pub fn new(root: PathBuf, events: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            root,
            host: "127.0.0.1".to_string(),
            events,
            running: RwLock::new(None),
        }
    }

    /// The port actually bound, useful when started with port 0.
    pub async fn bound_port(&self) -> Option<u16> {
        self.running.read().await.as_ref().map(|r| r.port)
    }

    fn router(&self) -> Router {
        let state = Arc::new(self.root.clone());
        Router::new()
            .route("/", get(serve_index))
            .route("/{*path}", get(serve_file))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }
}

#[async_trait]
impl ServerProcess for StaticPreviewServer {
    async fn start(&self, port: u16) -> bool {
        let mut slot = self.running.write().await;
        if slot.is_some() {
            return true;
        }

        let addr = format!("{}:{}", self.host, port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("failed to bind {}: {}", addr, e);
                return false;
            }
        };
        let bound: SocketAddr = match listener.local_addr() {
            Ok(bound) => bound,
            Err(e) => {
                error!("failed to read bound address for {}: {}", addr, e);
                return false;
            }
        };

        let app = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("static preview server terminated: {}", e);
            }
        });

        *slot = Some(RunningServer {
            shutdown: shutdown_tx,
            handle,
            port: bound.port(),
        });

        let uri = format!("http://{}", bound);
        info!(
            "static preview server listening at {} serving {}",
            uri,
            self.root.display()
        );
        let _ = self.events.send(ServerEvent::Connected(uri));
        true
    }

    async fn stop(&self) {
        if let Some(running) = self.running.write().await.take() {
            let _ = running.shutdown.send(());
            if running.handle.await.is_err() {
                warn!("static preview server task ended abnormally");
            }
            info!("static preview server stopped");
        }
    }

    async fn is_running(&self) -> bool {
        self.running.read().await.is_some()
    }
}

async fn serve_index(State(root): State<Arc<PathBuf>>) -> Result<Response, StaticServeError> {
    serve_file_from_path(&root.join("index.html")).await
}

async fn serve_file(
    AxumPath(path): AxumPath<String>,
    State(root): State<Arc<PathBuf>>,
) -> Result<Response, StaticServeError> {
    let requested = root.join(&path);
    debug!("serving {} -> {}", path, requested.display());

    let canonical_root = root
        .canonicalize()
        .map_err(|e| StaticServeError::Io(format!("failed to canonicalize root: {}", e)))?;
    let canonical_requested = match requested.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) => return Err(StaticServeError::NotFound(path)),
    };

    if !canonical_requested.starts_with(&canonical_root) {
        warn!("rejected path outside root: {}", requested.display());
        return Err(StaticServeError::Forbidden);
    }

    if canonical_requested.is_dir() {
        let index = canonical_requested.join("index.html");
        if index.exists() {
            return serve_file_from_path(&index).await;
        }
        return Err(StaticServeError::NotFound(path));
    }

    serve_file_from_path(&canonical_requested).await
}

async fn serve_file_from_path(file_path: &Path) -> Result<Response, StaticServeError> {
    let contents = tokio::fs::read(file_path)
        .await
        .map_err(|e| StaticServeError::Io(format!("failed to read file: {}", e)))?;

    let mut headers = HeaderMap::new();
    if let Ok(content_type) = content_type_for(file_path).parse() {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    if let Ok(nosniff) = "nosniff".parse() {
        headers.insert(header::HeaderName::from_static("x-content-type-options"), nosniff);
    }

    Ok((headers, contents).into_response())
}

fn content_type_for(file_path: &Path) -> &'static str {
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[derive(Debug)]
enum StaticServeError {
    NotFound(String),
    Forbidden,
    Io(String),
}

impl IntoResponse for StaticServeError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            StaticServeError::NotFound(path) => {
                (StatusCode::NOT_FOUND, format!("file not found: {}", path))
            }
            StaticServeError::Forbidden => (
                StatusCode::FORBIDDEN,
                "access denied: path outside served root".to_string(),
            ),
            StaticServeError::Io(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        error!("static server error: {} - {}", status, message);
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from(message))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
