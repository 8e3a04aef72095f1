use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_patient_middleware;

use crate::handlers;

/// Patient-actor account routes. Booking and appointment routes are
/// contributed by the appointment cell and merged under the same prefix by
/// the API crate.
pub fn user_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/get-profile", get(handlers::get_profile))
        .route("/update-profile", post(handlers::update_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_patient_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
