use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::{auth_doctor_middleware, auth_patient_middleware};

use crate::handlers;

/// Booking routes merged under `/api/user` by the API crate.
pub fn user_appointment_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/available-slots", get(handlers::available_slots));

    let protected_routes = Router::new()
        .route("/book-appointment", post(handlers::book_appointment))
        .route("/appointments", get(handlers::list_user_appointments))
        .route("/cancel-appointment", post(handlers::cancel_user_appointment))
        .route("/complete-appointment", put(handlers::complete_user_appointment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_patient_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Appointment routes merged under `/api/doctor` by the API crate.
pub fn doctor_appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments", get(handlers::list_doctor_appointments))
        .route("/cancel-appointment", post(handlers::cancel_doctor_appointment))
        .route("/dashboard", get(handlers::doctor_dashboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_doctor_middleware,
        ))
        .with_state(state)
}
