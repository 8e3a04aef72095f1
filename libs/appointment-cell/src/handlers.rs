use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::Local;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthContext;
use shared_models::error::AppError;

use doctor_cell::services::availability::AvailabilityService;

use crate::models::{AppointmentActionRequest, AvailableSlotsQuery, BookAppointmentRequest};
use crate::services::booking::BookingService;
use crate::services::dashboard::DashboardService;
use crate::services::lifecycle::LifecycleService;

fn subject_id(identity: &AuthContext) -> Result<Uuid, AppError> {
    Uuid::parse_str(&identity.subject)
        .map_err(|_| AppError::Auth("Invalid token payload".to_string()))
}

// ==============================================================================
// PATIENT-FACING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn available_slots(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);

    let slots = service
        .get_available_slots(query.doc_id, Local::now().naive_local())
        .await?;

    Ok(Json(json!({ "success": true, "slots": slots })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = subject_id(&identity)?;

    let service = BookingService::new(&config);
    let appointment = service.book_appointment(user_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Booked",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn list_user_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let user_id = subject_id(&identity)?;

    let service = BookingService::new(&config);
    let appointments = service.list_for_user(user_id).await?;

    Ok(Json(json!({ "success": true, "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn cancel_user_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
    Json(request): Json<AppointmentActionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    service.cancel(request.appointment_id, &identity).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled"
    })))
}

#[axum::debug_handler]
pub async fn complete_user_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
    Json(request): Json<AppointmentActionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    service.complete(request.appointment_id, &identity).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment marked as completed"
    })))
}

// ==============================================================================
// DOCTOR-FACING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctor_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let doc_id = subject_id(&identity)?;

    let service = BookingService::new(&config);
    let appointments = service.list_for_doctor(doc_id).await?;

    Ok(Json(json!({ "success": true, "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn cancel_doctor_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
    Json(request): Json<AppointmentActionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    service.cancel(request.appointment_id, &identity).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment Cancelled"
    })))
}

#[axum::debug_handler]
pub async fn doctor_dashboard(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let doc_id = subject_id(&identity)?;

    let service = DashboardService::new(&config);
    let dashboard = service.doctor_dashboard(doc_id).await?;

    Ok(Json(json!({ "success": true, "data": dashboard })))
}
