use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod documents;
pub mod health;
pub mod packages;
pub mod users;

/// Body of every successful write.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn new(status: &'static str) -> Self {
        Self { status }
    }
}

pub fn create_router(state: AppState) -> Router<()> {
    let api_routes = Router::new()
        .route("/add_information", post(packages::add_information))
        .route("/get_personal_info", get(users::get_personal_info))
        .route("/get_users_data", get(users::get_users_data))
        .route("/delete_user_info", delete(users::delete_user_info))
        .route("/update_user", put(users::update_user))
        .route(
            "/delete_user_document",
            delete(documents::delete_user_document),
        )
        .route("/update_document", put(documents::update_document))
        .route("/health", get(health::health_check));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
