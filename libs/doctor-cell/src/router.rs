use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_doctor_middleware;

use crate::handlers;

/// Doctor-actor profile routes. The doctor's appointment and dashboard
/// routes are contributed by the appointment cell and merged under the same
/// prefix by the API crate.
pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/list", get(handlers::list_doctors));

    let protected_routes = Router::new()
        .route("/profile", get(handlers::get_profile))
        .route("/change-availability", post(handlers::change_availability))
        .route("/update-profile", put(handlers::update_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_doctor_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
