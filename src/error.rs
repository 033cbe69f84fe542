//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config parse: {0}")]
    Parse(String),
    #[error("config io: {path}: {message}")]
    Io { path: String, message: String },
    #[error("resource_name is required")]
    MissingResourceName,
    #[error("base_name is required")]
    MissingBaseName,
    #[error("invalid {key}: '{value}'")]
    InvalidName { key: &'static str, value: String },
    #[error("unknown action '{value}' in {key}")]
    UnknownAction { key: String, value: String },
    #[error("duplicate route name: {0}")]
    DuplicateRouteName(String),
    #[error("duplicate route path: {path} ({route} and {existing})")]
    DuplicateRoutePath { path: String, route: String, existing: String },
    #[error("route {route} redirects to {target}, which is not compiled")]
    UnknownRedirectTarget { route: String, target: String },
    #[error("controller already registered for {0}")]
    DuplicateController(String),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("route {0} requires an id")]
    MissingRouteParameter(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("unsupported filter type: {0}")]
    UnsupportedFilterType(String),
    #[error("unsupported filter kind: {0}")]
    UnsupportedFilterKind(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method {method} not allowed on {route}")]
    MethodNotAllowed { method: String, route: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Filter(_) => (StatusCode::BAD_REQUEST, "filter_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::MethodNotAllowed { .. } => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
