//! API error type and the JSON error body shared by every endpoint
//!
//! All failures render as
//! `{"code": 422, "status": "Unprocessable Entity", "message": "...", "errors": {...}}`
//! where `errors` maps a request location (`query`, `json`) to field-level
//! messages.

use std::collections::BTreeMap;

use axum::extract::rejection::QueryRejection;
use axum::extract::Request;
use axum::http::header::{ALLOW, CONTENT_TYPE};
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::shared::types::{DomainError, PaginationError};

/// Field name -> messages, for one request location.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status code
    pub code: u16,
    /// HTTP status reason phrase
    pub status: String,
    /// Human readable summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-level details keyed by location, then field name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub errors: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: None,
            errors: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_errors(mut self, location: &str, fields: FieldErrors) -> Self {
        self.errors = Some(serde_json::json!({ location: fields }));
        self
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Invalid {location} parameters")]
    Validation {
        location: &'static str,
        fields: FieldErrors,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Precondition failed")]
    PreconditionFailed,

    #[error("Precondition required")]
    PreconditionRequired,

    #[error("No route for {0}")]
    RouteNotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Collect `validator` failures into field-level messages.
    pub fn from_validation(location: &'static str, errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::Validation { location, fields }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pagination(e) => match e {
                PaginationError::InvalidPage { .. } | PaginationError::InvalidPageSize { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PaginationError::PageOutOfRange { .. } => StatusCode::NOT_FOUND,
                PaginationError::ItemCountAlreadySet | PaginationError::Serialization(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(DomainError::NotFound { .. }) | ApiError::RouteNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Domain(DomainError::Modified { .. }) => StatusCode::PRECONDITION_FAILED,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            ApiError::PreconditionRequired => StatusCode::PRECONDITION_REQUIRED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn to_body(&self, status: StatusCode) -> ErrorResponse {
        let body = ErrorResponse::new(status);
        match self {
            ApiError::Pagination(e) if e.is_client_error() => {
                let mut fields = FieldErrors::new();
                if let Some(field) = e.field() {
                    fields.insert(field.to_string(), vec![e.to_string()]);
                }
                body.with_message(e.to_string()).with_errors("query", fields)
            }
            // Internal details stay in the logs.
            ApiError::Pagination(_) | ApiError::Internal(_) => body,
            ApiError::Validation { location, fields } => body
                .with_message(self.to_string())
                .with_errors(location, fields.clone()),
            other => body.with_message(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.to_body(status))).into_response()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert("_query".to_string(), vec![rejection.body_text()]);
        ApiError::Validation {
            location: "query",
            fields,
        }
    }
}

/// Router fallback for paths no route matches.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

/// Largest plain-text error body carried over into `message`.
const PLAIN_ERROR_BODY_LIMIT: usize = 16 * 1024;

/// Re-render error responses produced outside [`ApiError`] (405 from method
/// routing, path extraction rejections) as an [`ErrorResponse`].
pub async fn render_plain_errors(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !(status.is_client_error() || status.is_server_error()) || is_json {
        return response;
    }

    let (parts, body) = response.into_parts();
    let text = axum::body::to_bytes(body, PLAIN_ERROR_BODY_LIMIT)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .filter(|text| !text.is_empty());

    let mut error = ErrorResponse::new(status);
    if let Some(text) = text {
        error = error.with_message(text);
    }
    debug!(status = status.as_u16(), "Rendered plain error response as JSON");

    let mut rendered = (status, Json(error)).into_response();
    if let Some(allow) = parts.headers.get(ALLOW) {
        rendered.headers_mut().insert(ALLOW, allow.clone());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_page_is_422_with_field_errors() {
        let response = ApiError::from(PaginationError::InvalidPage { page: -42 }).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], 422);
        assert_eq!(body["status"], "Unprocessable Entity");
        assert!(body["errors"]["query"]["page"].is_array());
    }

    #[tokio::test]
    async fn test_page_out_of_range_is_404_with_errors() {
        let response = ApiError::from(PaginationError::PageOutOfRange {
            page: 120,
            last_page: 100,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], 404);
        assert!(body["errors"]["query"]["page"][0]
            .as_str()
            .unwrap()
            .contains("last page is 100"));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = ApiError::from(PaginationError::ItemCountAlreadySet).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(body.get("message").is_none());
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_modification_is_412() {
        let response = ApiError::from(DomainError::Modified {
            entity: "Item",
            field: "item_id",
            value: "3".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

        let body = body_json(response).await;
        assert_eq!(body["code"], 412);
        assert!(body["message"].as_str().unwrap().contains("modified"));
    }

    #[test]
    fn test_precondition_statuses() {
        assert_eq!(
            ApiError::PreconditionFailed.status_code(),
            StatusCode::PRECONDITION_FAILED
        );
        assert_eq!(
            ApiError::PreconditionRequired.status_code(),
            StatusCode::PRECONDITION_REQUIRED
        );
    }
}
