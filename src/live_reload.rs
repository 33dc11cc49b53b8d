//! Development live reload.
//!
//! Browsers that load an HTML page get a small script that opens a WebSocket at
//! [`LiveReload::PATH`]. Any change under the public directory is broadcast to
//! every open socket as a `reload` text frame. The first browser to connect
//! after the server starts is told to reload shortly afterwards, so tabs left
//! open across a restart pick up the new build.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Text frame telling the browser to reload.
pub const RELOAD: &str = "reload";

/// Client side of the live reload channel. Reconnects when the server goes away.
pub const SCRIPT: &str = r#"<script>(function () {
  var url = (location.protocol === "https:" ? "wss://" : "ws://") + location.host + "/livereload";
  function connect() {
    var socket = new WebSocket(url);
    socket.onmessage = function (event) {
      if (event.data === "reload") location.reload();
    };
    socket.onclose = function () {
      setTimeout(connect, 1000);
    };
  }
  connect();
})();</script>"#;

const BROADCAST_CAPACITY: usize = 16;

/// Largest HTML body the script is injected into.
const MAX_HTML_BYTES: usize = 8 * 1024 * 1024;

/// Reload broadcaster shared by the file watcher and the WebSocket handlers.
#[derive(Debug, Clone)]
pub struct LiveReload {
    sender: broadcast::Sender<()>,
    first_connection: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl Default for LiveReload {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveReload {
    pub const PATH: &'static str = "/livereload";
    /// Delay before the first connected browser is told to reload.
    pub const RESTART_DELAY: Duration = Duration::from_millis(100);

    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            sender,
            first_connection: Arc::new(AtomicBool::new(true)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Open sockets are closed once `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Tells every connected browser to reload. Returns how many were reached.
    pub fn reload(&self) -> usize {
        // Sending with no subscribers is not an error here.
        let reached = self.sender.send(()).unwrap_or(0);
        tracing::debug!(reached, "Live reload broadcast");
        reached
    }

    /// Schedules the restart reload on the first connection only.
    pub fn on_connect(&self) {
        if self.first_connection.swap(false, Ordering::SeqCst) {
            let live_reload = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Self::RESTART_DELAY).await;
                live_reload.reload();
            });
        }
    }

    /// The WebSocket endpoint.
    pub fn routes<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .route(Self::PATH, get(get_livereload))
            .with_state(self.clone())
    }

    /// Watches `dir` recursively and broadcasts a reload on every change.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn watch(&self, dir: &Path) -> Result<RecommendedWatcher, notify::Error> {
        let live_reload = self.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            match event {
                Ok(event) if matches!(event.kind, EventKind::Access(_)) => {}
                Ok(event) => {
                    tracing::info!(paths = ?event.paths, "Public directory changed");
                    live_reload.reload();
                }
                Err(error) => tracing::warn!(error = %error, "File watcher error"),
            }
        })?;
        watcher.watch(dir, RecursiveMode::Recursive)?;
        tracing::info!(dir = %dir.display(), "Live reload watching");
        Ok(watcher)
    }
}

async fn get_livereload(
    State(live_reload): State<LiveReload>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let reloads = live_reload.subscribe();
    let shutdown = live_reload.shutdown.clone();
    live_reload.on_connect();
    ws.on_upgrade(move |socket| serve_client(socket, reloads, shutdown))
}

async fn serve_client(
    mut socket: WebSocket,
    mut reloads: broadcast::Receiver<()>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            },
            reload = reloads.recv() => match reload {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    if socket.send(Message::Text(RELOAD.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::debug!("Live reload client disconnected");
}

/// Places [`SCRIPT`] right before the last `</body>`, or at the end when there is none.
pub fn inject_into(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + SCRIPT.len());
    match html.rfind("</body>") {
        Some(at) => {
            out.push_str(&html[..at]);
            out.push_str(SCRIPT);
            out.push_str(&html[at..]);
        }
        None => {
            out.push_str(html);
            out.push_str(SCRIPT);
        }
    }
    out
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"))
}

/// Middleware injecting [`SCRIPT`] into successful HTML responses.
pub async fn inject_script(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    if response.status() != StatusCode::OK || !is_html(&response) {
        return response;
    }
    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_HTML_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(error = %error, "Failed to buffer HTML response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = match std::str::from_utf8(&bytes) {
        Ok(html) => Body::from(inject_into(html)),
        Err(_) => Body::from(bytes),
    };
    Response::from_parts(parts, body)
}
