//! Request-level error kinds and the JSON error envelope they render to.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthError;

/// ApiError
///
/// The coarse failure a handler reports to the client. Handlers decide which
/// variant a lower-level failure collapses to; the original cause is logged
/// before conversion and never exposed in the body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest,
    NotFound,
    Unprocessable,
    Auth(AuthError),
}

/// ErrorBody
///
/// `{ "success": false, "error": <status>, "message": <text> }`. Guard
/// failures also carry the classification `code`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(e) => e.status(),
        }
    }

    fn body(&self) -> ErrorBody {
        let (message, code) = match self {
            ApiError::BadRequest => ("bad request".to_string(), None),
            ApiError::NotFound => ("resource not found".to_string(), None),
            ApiError::Unprocessable => ("unprocessable".to_string(), None),
            ApiError::Auth(e) => (e.to_string(), Some(e.code().to_string())),
        };

        ErrorBody {
            success: false,
            error: self.status().as_u16(),
            message,
            code,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
