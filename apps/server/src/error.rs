use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use yieldfolio_core::errors::{Error as CoreError, ErrorKind, ErrorSurface};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    surface: Option<ErrorSurface>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, surface) = match &self {
            ApiError::Core(e) => {
                let status = match e {
                    CoreError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                    CoreError::TransactionInProgress => StatusCode::CONFLICT,
                    CoreError::TransactionRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    CoreError::NetworkError(_) => StatusCode::BAD_GATEWAY,
                    CoreError::ReadFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, Some(e.kind()), Some(e.surface()))
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None, None),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None, None),
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
            kind,
            surface,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        assert_eq!(
            status_of(CoreError::InvalidAmount("abc".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::TransactionInProgress),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::TransactionRejected("denied".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(CoreError::NetworkError("wrong chain".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(CoreError::ReadFailure("timeout".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
