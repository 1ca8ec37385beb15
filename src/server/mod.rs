//! HTTP surface: `GET /drug/{name}` and `GET /health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::entities::label::{LabelService, NormalizedLabel};
use crate::error::LabelGateError;

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub labels: Arc<LabelService>,
    pub strict_upstream: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    ok: bool,
    cache: &'static str,
}

/// Boundary error: a status code plus the `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn from_lookup(name: &str, err: LabelGateError, strict_upstream: bool) -> Self {
        match err {
            LabelGateError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                detail: err.to_string(),
            },
            err if err.is_transport() => {
                warn!(drug = name, error = %err, "label upstream failure");
                if strict_upstream {
                    Self {
                        status: StatusCode::BAD_GATEWAY,
                        detail: format!(
                            "Upstream label service unavailable while looking up '{name}'."
                        ),
                    }
                } else {
                    Self {
                        status: StatusCode::NOT_FOUND,
                        detail: LabelGateError::drug_not_found(name).to_string(),
                    }
                }
            }
            err => {
                error!(drug = name, error = %err, "label lookup failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    detail: "Internal server error.".into(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

async fn get_drug(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<NormalizedLabel>, ApiError> {
    state
        .labels
        .get(&name)
        .await
        .map(Json)
        .map_err(|err| ApiError::from_lookup(&name, err, state.strict_upstream))
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        ok: true,
        cache: state.labels.cache_backend().unwrap_or("disabled"),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/drug/:name", get(get_drug))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the gateway on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error when the listener cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        cache = state.labels.cache_backend().unwrap_or("disabled"),
        "labelgate listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("labelgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}
