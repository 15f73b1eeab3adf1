use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use super::cookies::CookieStore;
use super::session::{Role, Session};
use crate::error::AppError;

/// The logged-in session. Requests without one are sent to the login view.
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let store = CookieStore::from_headers(&parts.headers);
        match Session::load(&store) {
            Some(session) => Ok(CurrentSession(session)),
            None => {
                debug!(uri = %parts.uri, "no session; redirecting to login");
                Err(AppError::NotAuthenticated)
            }
        }
    }
}

/// An admin session. Viewers are sent back to the dashboard.
pub struct AdminSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        if session.role != Role::Admin {
            debug!(uri = %parts.uri, user = %session.username, "admin view denied");
            return Err(AppError::NotPermitted);
        }
        Ok(AdminSession(session))
    }
}
