use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{dto::LoginView, services::INVALID_CREDENTIALS};
use crate::students::dto::FormView;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Login rejected; shown inline on the login view.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Form rejected; per-field messages, nothing was sent to the CRUD service.
    #[error("form has {} invalid field(s)", .0.errors.len())]
    Validation(Box<FormView>),
    /// The CRUD service failed; the client shows a blocking alert.
    #[error("{message}")]
    Alert {
        message: &'static str,
        redirect: Option<&'static str>,
    },
    #[error("not logged in")]
    NotAuthenticated,
    #[error("admin role required")]
    NotPermitted,
}

#[derive(Serialize)]
struct AlertBody {
    alert: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(LoginView {
                    error: Some(INVALID_CREDENTIALS),
                }),
            )
                .into_response(),
            AppError::Validation(view) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(*view)).into_response()
            }
            AppError::Alert { message, redirect } => (
                StatusCode::BAD_GATEWAY,
                Json(AlertBody {
                    alert: message,
                    redirect,
                }),
            )
                .into_response(),
            AppError::NotAuthenticated => Redirect::to("/").into_response(),
            AppError::NotPermitted => Redirect::to("/dashboard").into_response(),
        }
    }
}
