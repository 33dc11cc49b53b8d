//! The checkout page and its assets.

use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Page served for every `GET` that matches neither an API route nor a file.
pub const ENTRY_PAGE: &str = "index.html";

/// Serves `public_dir` verbatim, falling back to [`ENTRY_PAGE`] with status 200.
///
/// Meant as the router's fallback service, after the API routes.
pub fn service(public_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join(ENTRY_PAGE)))
}

/// Router that answers every unmatched request from `public_dir`.
pub fn routes<S>(public_dir: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().fallback_service(service(public_dir))
}
