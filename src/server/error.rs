use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response}
};

use cardemo::error::ContractError;
use cardemo::gateway::GatewayError;

pub(crate) enum ServerError{
    BadRequest(String),
    Unauthenticated(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InternalError(anyhow::Error)
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) =>
                (StatusCode::BAD_REQUEST, format!("Bad request: {}", msg)).into_response(),
            Self::Unauthenticated(msg) =>
                (StatusCode::UNAUTHORIZED, format!("Unknown identity: {}", msg)).into_response(),
            Self::Forbidden(msg) =>
                (StatusCode::FORBIDDEN, format!("Forbidden: {}", msg)).into_response(),
            Self::NotFound(msg) =>
                (StatusCode::NOT_FOUND, format!("Resource not found: {}", msg)).into_response(),
            Self::Conflict(msg) =>
                (StatusCode::CONFLICT, format!("Conflict: {}", msg)).into_response(),
            Self::InternalError(err) =>
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", err)).into_response()
        }
    }
}

impl From<GatewayError> for ServerError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UnknownIdentity(label) => Self::Unauthenticated(label),
            GatewayError::Contract(err) => match err {
                ContractError::NotFound(_) => Self::NotFound(err.to_string()),
                ContractError::Unauthorized { .. } => Self::Forbidden(err.to_string()),
                ContractError::AlreadyExists(_) | ContractError::InvalidTransition { .. } =>
                    Self::Conflict(err.to_string()),
                ContractError::InvalidArgument(_) | ContractError::UnknownTransaction(_) =>
                    Self::BadRequest(err.to_string()),
                other => Self::InternalError(other.into())
            },
            other => Self::InternalError(other.into())
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::InternalError(err.into())
    }
}
