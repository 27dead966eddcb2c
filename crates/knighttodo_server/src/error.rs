//! HTTP error mapping.
//!
//! # Invariants
//! - Every failure answers with `{ "error": <kind>, "message": <text> }`.
//! - NotFound -> 404, validation and malformed body, path or query -> 400,
//!   experience failure -> 502, cascade/storage/internal -> 500.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use knighttodo_core::ServiceError;
use log::error;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by an aggregate service.
    Service(ServiceError),
    /// Request body or query rejected before reaching a service.
    BadRequest(String),
    /// Infrastructure failure inside the server (poisoned lock, joined task).
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Validation(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Service(ServiceError::ExternalService { .. }) => StatusCode::BAD_GATEWAY,
            Self::Service(ServiceError::Cascade { .. } | ServiceError::Repo(_))
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Service(err) => err.kind(),
            Self::BadRequest(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::BadRequest(message) | Self::Internal(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(message) = &self {
            error!("event=http_internal module=server status=error error={message}");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use knighttodo_core::{EntityKind, ExperienceError, RepoError, ServiceError};
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_distinct_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (
                ServiceError::NotFound {
                    entity: EntityKind::Day,
                    id,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Validation("dayName must not be blank".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::ExternalService {
                    id,
                    source: ExperienceError::Timeout,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                ServiceError::Cascade {
                    entity: EntityKind::Routine,
                    id,
                    source: RepoError::InvalidData("x".to_string()),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
        assert_eq!(
            ApiError::Internal("lock".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
