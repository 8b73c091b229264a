// Static file server for the muxer output directory
//
// Serves manifests and segments as plain files:
// - GET /livestream.m3u8 (HLS) or /livestream.mpd (DASH)
// - GET /<segment>       segments written by ffmpeg

use crate::error::{StreamError, StreamResult};
use axum::Router;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing as log;

#[derive(Debug, Clone)]
pub struct FileServer {
    directory: PathBuf,
    address: String,
}

impl FileServer {
    pub fn new(directory: impl Into<PathBuf>, address: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            address: address.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Router serving the directory at `/`.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback_service(ServeDir::new(&self.directory))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until the server fails.
    pub async fn run(self) -> StreamResult<()> {
        let listener = TcpListener::bind(&self.address)
            .await
            .map_err(|e| StreamError::Server(format!("failed to bind {}: {e}", self.address)))?;

        log::info!(
            "Serving {} on http://{}",
            self.directory.display(),
            listener
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| self.address.clone())
        );

        axum::serve(listener, self.router())
            .await
            .map_err(|e| StreamError::Server(e.to_string()))
    }
}
