//! Server assembly and startup.

use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::path::Path;
use tower_http::cors;

use crate::config::Config;
use crate::handlers;
use crate::live_reload::{self, LiveReload};
use crate::static_files;
use crate::util::{SigDown, Telemetry};

/// Routes of the checkout server, without the tracing and CORS layers.
///
/// API routes take precedence for `POST`; everything else is served from `public_dir`,
/// with `index.html` as the fallback. With `live_reload` set, the WebSocket
/// endpoint is mounted and HTML responses carry the reload script.
pub fn app(public_dir: &Path, live_reload: Option<&LiveReload>) -> Router {
    let router = Router::new()
        .merge(handlers::routes(public_dir))
        .merge(static_files::routes(public_dir));
    match live_reload {
        Some(live_reload) => router
            .merge(live_reload.routes())
            .layer(axum::middleware::from_fn(live_reload::inject_script)),
        None => router,
    }
}

/// Initializes and runs the checkout server until SIGINT or SIGTERM.
///
/// - Loads `.env` variables.
/// - Installs the tracing subscriber.
/// - Starts the public directory watcher when live reload is on.
/// - Serves the mock gateway and the static checkout page.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();

    let telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let config = Config::load()?;

    let sig_down = SigDown::try_new()?;

    let live_reload = config
        .live_reload()
        .then(|| LiveReload::new().with_shutdown(sig_down.cancellation_token()));
    // Held until shutdown; dropping it stops the watch.
    let _watcher = match &live_reload {
        Some(live_reload) => Some(live_reload.watch(config.public_dir())?),
        None => None,
    };

    let http_endpoints = app(config.public_dir(), live_reload.as_ref())
        .layer(telemetry.http_tracing())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))?;

    let axum_cancellation_token = sig_down.cancellation_token();
    let axum_graceful_shutdown = async move { axum_cancellation_token.cancelled().await };
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(axum_graceful_shutdown)
        .await?;
    sig_down.recv().await;

    Ok(())
}
