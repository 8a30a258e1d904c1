use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;

use prov_engine::{EngineError, ErrorClass, ProvenanceService};
use prov_types::RecordId;

use crate::api::{record_id_from_json, CommitResponse, ErrorBody, HealthResponse, VerifyResponse};

/// Shared handler state.
pub type AppState = Arc<ProvenanceService>;

/// Error half of every handler result.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was well-formed JSON but not a usable request.
    InvalidRequest(String),
    Engine(EngineError),
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Engine(e) => match e.kind() {
                ErrorClass::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorClass::Conflict => StatusCode::CONFLICT,
                ErrorClass::NotFound => StatusCode::NOT_FOUND,
                ErrorClass::Availability => StatusCode::BAD_GATEWAY,
                ErrorClass::Deadline => StatusCode::GATEWAY_TIMEOUT,
                ErrorClass::Construction | ErrorClass::Consistency => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::InvalidRequest(msg) => ErrorBody {
                error: msg.clone(),
                fatal: false,
                record_id: None,
            },
            Self::Engine(e) => {
                if e.is_fatal_inconsistency() {
                    tracing::error!(error = %e, "fatal inconsistency surfaced to client");
                } else if status.is_server_error() {
                    tracing::warn!(error = %e, status = status.as_u16(), "request failed");
                }
                ErrorBody {
                    error: e.to_string(),
                    fatal: e.is_fatal_inconsistency(),
                    record_id: e.record_id(),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Commit a record.
///
/// `record_id` is optional and defaults to `product_id`, so a bare product
/// record can be posted as-is.
pub async fn commit_handler(
    State(service): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CommitResponse>), ApiError> {
    let schema = service.schema();
    let fields = schema
        .fields_from_json(&body)
        .map_err(|e| ApiError::Engine(EngineError::InvalidField(e)))?;

    let record_id = match body.get("record_id") {
        Some(_) => record_id_from_json(&body, "record_id")
            .ok_or_else(|| ApiError::InvalidRequest("record_id must be an unsigned integer".into()))?,
        None => record_id_from_json(&body, schema.fields[0].name).ok_or_else(|| {
            ApiError::InvalidRequest(format!(
                "record_id is required when {} is not an unsigned integer",
                schema.fields[0].name
            ))
        })?,
    };

    let record = service.commit(record_id, fields).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Verify a record. Tampered records are a 200 with a tampered verdict.
pub async fn verify_handler(
    State(service): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let record_id: RecordId = record_id_from_json(&body, "record_id")
        .ok_or_else(|| ApiError::InvalidRequest("record_id must be an unsigned integer".into()))?;
    let report = service.verify(record_id).await?;
    Ok(Json(report.into()))
}
