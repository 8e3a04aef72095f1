use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::auth::{AuthContext, AuthRole};
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;
use shared_utils::validation::{validate_email, validate_password};

use appointment_cell::models::AppointmentActionRequest;
use appointment_cell::services::booking::BookingService;
use appointment_cell::services::dashboard::DashboardService;
use appointment_cell::services::lifecycle::LifecycleService;
use doctor_cell::models::{Address, CreateDoctorRequest};
use doctor_cell::services::doctor::DoctorService;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeAvailabilityRequest {
    pub doc_id: Uuid,
}

/// Static-credential login. The admin is not a stored record; the token
/// carries the configured email as its identity claim.
#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Admin login attempt");

    if !config.is_admin_configured()
        || request.email != config.admin_email
        || request.password != config.admin_password
    {
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let token = issue_token(
        None,
        Some(config.admin_email.clone()),
        AuthRole::Admin,
        &config.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let store = StoreClient::new(&config);
    let request = parse_doctor_form(multipart, &store).await?;

    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let service = DoctorService::new(&config);
    let doctor = service.create_doctor(request).await?;

    info!("Admin onboarded doctor {}", doctor.id);
    Ok(Json(json!({ "success": true, "message": "Doctor Added" })))
}

#[axum::debug_handler]
pub async fn all_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let doctors = service.list_all().await?;

    Ok(Json(json!({ "success": true, "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn change_availability(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<AuthContext>,
    Json(request): Json<ChangeAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let available = service.toggle_availability(request.doc_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Doctor availability updated to {}",
            if available { "Available" } else { "Unavailable" }
        ),
        "available": available
    })))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&config);
    let appointments = service.list_all().await?;

    Ok(Json(json!({ "success": true, "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
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
pub async fn complete_appointment(
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

#[axum::debug_handler]
pub async fn dashboard(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let service = DashboardService::new(&config);
    let data = service.admin_dashboard().await?;

    Ok(Json(json!({ "success": true, "data": data })))
}

/// Collect the onboarding multipart form. Every text field is required; the
/// portrait image is pushed to media storage when present.
async fn parse_doctor_form(
    mut multipart: Multipart,
    store: &StoreClient,
) -> Result<CreateDoctorRequest, AppError> {
    let mut name = None;
    let mut email = None;
    let mut password = None;
    let mut speciality = None;
    let mut degree = None;
    let mut experience = None;
    let mut about = None;
    let mut fees = None;
    let mut address = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => name = Some(field_text(field).await?),
            "email" => email = Some(field_text(field).await?),
            "password" => password = Some(field_text(field).await?),
            "speciality" => speciality = Some(field_text(field).await?),
            "degree" => degree = Some(field_text(field).await?),
            "about" => about = Some(field_text(field).await?),
            "experience" => {
                let text = field_text(field).await?;
                experience = Some(text.parse().map_err(|_| {
                    AppError::Validation("Invalid experience value".to_string())
                })?);
            }
            "fees" => {
                let text = field_text(field).await?;
                fees = Some(
                    text.parse()
                        .map_err(|_| AppError::Validation("Invalid fees value".to_string()))?,
                );
            }
            "address" => {
                let text = field_text(field).await?;
                let parsed: Address = serde_json::from_str(&text)
                    .map_err(|_| AppError::Validation("Invalid address format".to_string()))?;
                address = Some(parsed);
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("image/png")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                let url = store
                    .upload_media("doctors", &content_type, bytes.to_vec())
                    .await
                    .map_err(|e| AppError::Upstream(e.to_string()))?;
                image = Some(url);
            }
            _ => {}
        }
    }

    match (name, email, password, speciality, degree, experience, about, fees, address) {
        (
            Some(name),
            Some(email),
            Some(password),
            Some(speciality),
            Some(degree),
            Some(experience),
            Some(about),
            Some(fees),
            Some(address),
        ) => Ok(CreateDoctorRequest {
            name,
            email,
            password,
            speciality,
            degree,
            experience,
            about,
            fees,
            address,
            image,
        }),
        _ => Err(AppError::Validation("Missing Details".to_string())),
    }
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))
}
