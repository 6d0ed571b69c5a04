//! HTTP API for the admin editor
//!
//! - `POST /api/admin/save` `{locale, data, version?}` → `{ok, version}`
//! - `GET /api/admin/content/:locale` → `{locale, version, data}`
//!
//! Failures answer `{error, details?}` with the status of the underlying
//! [`PersistError`].

use crate::errors::PersistError;
use crate::gateway::PersistenceGateway;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use folio_common::Locale;
use folio_editor::{ContentDocument, VersionToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<PersistenceGateway>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/save", post(save_handler))
        .route("/api/admin/content/:locale", get(content_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    #[serde(default)]
    locale: Value,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    version: Option<VersionToken>,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    ok: bool,
    version: VersionToken,
}

#[derive(Debug, Serialize)]
struct ContentResponse {
    locale: Locale,
    version: VersionToken,
    data: ContentDocument,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Error answer of the admin API
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(error: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: error.to_string(),
                details: None,
            },
        }
    }
}

impl From<PersistError> for ApiError {
    fn from(e: PersistError) -> Self {
        let status = e.status_code();
        let body = match e {
            PersistError::Invalid(errors) => ErrorBody {
                error: "Invalid content".to_string(),
                details: serde_json::to_value(errors).ok(),
            },
            PersistError::Shape(shape) => ErrorBody {
                error: "Invalid content".to_string(),
                details: Some(Value::String(shape.0)),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };
        Self { status, body }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn parse_locale(raw: &Value) -> Result<Locale, ApiError> {
    raw.as_str()
        .and_then(|raw| raw.parse::<Locale>().ok())
        .ok_or_else(|| ApiError::bad_request("Unsupported locale"))
}

async fn save_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    let request: SaveRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Malformed save request");
        ApiError::bad_request("Invalid request")
    })?;
    let locale = parse_locale(&request.locale)?;
    tracing::info!(%locale, "Save requested");

    let key = state.gateway.config().rate_limit_key.clone();
    let receipt = state
        .gateway
        .commit(
            &key,
            locale,
            ContentDocument::from_value_unchecked(request.data),
            request.version.as_ref(),
        )
        .await
        .map_err(|e| {
            if e.status_code().is_server_error() {
                tracing::error!(%locale, error = %e, "Save failed");
            }
            ApiError::from(e)
        })?;

    Ok(Json(SaveResponse {
        ok: true,
        version: receipt.version,
    }))
}

async fn content_handler(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<Json<ContentResponse>, ApiError> {
    let locale = parse_locale(&Value::String(locale))?;
    let baseline = state.gateway.load(locale).await.map_err(|e| {
        tracing::error!(%locale, error = %e, "Loading content failed");
        let stored_invalid = matches!(e, PersistError::Invalid(_));
        let mut error = ApiError::from(e);
        // Invalid stored content answers as a server error
        if stored_invalid {
            error.status = StatusCode::INTERNAL_SERVER_ERROR;
            error.body.error = "Stored content is invalid".to_string();
        }
        error
    })?;

    Ok(Json(ContentResponse {
        locale,
        version: baseline.version,
        data: baseline.document,
    }))
}
