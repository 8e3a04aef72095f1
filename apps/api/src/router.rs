use std::sync::Arc;

use axum::{routing::get, Router};

use admin_cell::router::admin_routes;
use appointment_cell::router::{doctor_appointment_routes, user_appointment_routes};
use doctor_cell::router::doctor_routes;
use patient_cell::router::user_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // Each actor prefix merges its account routes with the appointment
    // routes the appointment cell contributes for that actor.
    let user_api = user_routes(state.clone()).merge(user_appointment_routes(state.clone()));
    let doctor_api = doctor_routes(state.clone()).merge(doctor_appointment_routes(state.clone()));
    let admin_api = admin_routes(state.clone());

    Router::new()
        .route("/", get(|| async { "Medibook API is running!" }))
        .nest("/api/user", user_api)
        .nest("/api/doctor", doctor_api)
        .nest("/api/admin", admin_api)
}
