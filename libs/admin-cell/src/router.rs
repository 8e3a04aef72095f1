use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_admin_middleware;

use crate::handlers;

pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new().route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/add-doctor", post(handlers::add_doctor))
        .route("/all-doctors", post(handlers::all_doctors))
        .route("/change-availability", post(handlers::change_availability))
        .route("/appointments", get(handlers::list_appointments))
        .route("/cancel-appointment", put(handlers::cancel_appointment))
        .route("/complete-appointment", put(handlers::complete_appointment))
        .route("/dashboard", get(handlers::dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_admin_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
