use crate::state::AppState;
use axum::Router;

pub mod cookies;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod services;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
