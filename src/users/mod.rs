use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod model;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
