mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod reset;

pub use dto::MessageResponse;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
