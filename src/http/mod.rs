//! HTTP API for the media library.
//!
//! Routes:
//! - `GET /health`
//! - `GET /api/cloudinary/folders`, `GET /api/cloudinary/files`,
//!   `GET /api/cloudinary/all-files`, `GET /api/cloudinary/all-images`
//! - `POST /api/cloudinary/create-folder`, `POST /api/cloudinary/rename-folder`,
//!   `DELETE /api/cloudinary/delete-folder`
//! - `POST /api/cloudinary/upload`, `POST /api/cloudinary/rename`,
//!   `DELETE /api/cloudinary/delete`
//!
//! Errors are returned as `{"error": "<message>"}` with a matching status.

mod handlers;
pub mod types;

use anyhow::{Context, bail};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;
use std::io;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::library::MediaLibrary;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub library: MediaLibrary,
}

/// Error type returned by handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    RateLimited(String),
    BadGateway(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::NotFound(m)
            | Self::PayloadTooLarge(m)
            | Self::RateLimited(m)
            | Self::BadGateway(m)
            | Self::ServiceUnavailable(m)
            | Self::Internal(m) => m,
        }
    }
}

impl From<crate::Error> for AppError {
    fn from(err: crate::Error) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::BadRequest(message),
            404 => Self::NotFound(message),
            429 => Self::RateLimited(message),
            502 => Self::BadGateway(message),
            503 => Self::ServiceUnavailable(message),
            _ => Self::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.message(), "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.message(), "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

/// Builds the CORS layer. No configured origins allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim_end_matches('/')).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Builds the API router.
pub fn router(library: MediaLibrary, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/cloudinary/folders", get(handlers::list_folders))
        .route("/api/cloudinary/files", get(handlers::list_files))
        .route("/api/cloudinary/all-files", get(handlers::list_all_files))
        .route("/api/cloudinary/all-images", get(handlers::list_all_images))
        .route("/api/cloudinary/upload", post(handlers::upload_file))
        .route("/api/cloudinary/create-folder", post(handlers::create_folder))
        .route("/api/cloudinary/rename-folder", post(handlers::rename_folder))
        .route("/api/cloudinary/delete-folder", delete(handlers::delete_folder))
        .route("/api/cloudinary/rename", post(handlers::rename_file))
        .route("/api/cloudinary/delete", delete(handlers::delete_file))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(cors_layer(&server.allowed_origins))
        .with_state(AppState { library })
}

/// Binds `port`, trying the next `attempts` ports while the address is taken.
///
/// # Errors
///
/// Returns an error if every candidate port is taken or binding fails for
/// another reason.
pub async fn bind_with_fallback(port: u16, attempts: u16) -> anyhow::Result<TcpListener> {
    for offset in 0..=attempts {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        match TcpListener::bind(("0.0.0.0", candidate)).await {
            Ok(listener) => {
                if offset > 0 {
                    warn!(requested = port, bound = candidate, "Configured port in use, using fallback");
                }
                return Ok(listener);
            },
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                warn!(port = candidate, "Port in use, trying next");
            },
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to bind port {candidate}"));
            },
        }
    }
    bail!("No free port in {port}..={}", port.saturating_add(attempts))
}

/// Serves the API until Ctrl-C.
///
/// # Errors
///
/// Returns an error if no port can be bound or the server fails.
pub async fn serve(library: MediaLibrary, server: &ServerConfig) -> anyhow::Result<()> {
    let listener = bind_with_fallback(server.port, server.port_fallback_attempts).await?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    info!(%addr, "mediafold listening");

    axum::serve(listener, router(library, server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (crate::Error::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (crate::Error::not_found("x"), StatusCode::NOT_FOUND),
            (crate::Error::RateLimited("x".into()), StatusCode::TOO_MANY_REQUESTS),
            (crate::Error::remote(400, "x"), StatusCode::BAD_GATEWAY),
            (crate::Error::RemoteUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (crate::Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn test_bind_falls_back_when_port_taken() {
        let taken = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let listener = bind_with_fallback(port, 10).await;
        // The next ports may also be taken on a busy host; only a successful
        // fallback is checked.
        if let Ok(listener) = listener {
            assert_ne!(listener.local_addr().unwrap().port(), port);
        }
    }
}
