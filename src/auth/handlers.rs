use axum::{
    extract::State,
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookies::CookieStore,
        dto::{LoginRequest, LoginView},
        services::authenticate,
        session::Session,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page).post(login))
        .route("/logout", post(logout))
}

pub async fn login_page() -> Json<LoginView> {
    Json(LoginView::default())
}

#[instrument(skip(state, headers, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Redirect), AppError> {
    let Some(role) = authenticate(&payload.username, &payload.password) else {
        warn!("login rejected");
        return Err(AppError::InvalidCredentials);
    };

    let mut store = CookieStore::from_headers(&headers).secure(state.config.cookie_secure);
    Session::new(role, payload.username).persist(&mut store);

    let mut out = HeaderMap::new();
    store.apply(&mut out);
    info!(%role, "user logged in");
    Ok((out, Redirect::to("/dashboard")))
}

#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> (HeaderMap, Redirect) {
    let mut store = CookieStore::from_headers(&headers).secure(state.config.cookie_secure);
    if let Some(session) = Session::load(&store) {
        info!(user = %session.username, "user logged out");
    }
    Session::clear(&mut store);

    let mut out = HeaderMap::new();
    store.apply(&mut out);
    (out, Redirect::to("/"))
}
