use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::auth::{AuthContext, AuthRole};
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{Address, DoctorLoginRequest, UpdateDoctorProfileRequest};
use crate::services::doctor::DoctorService;

fn doctor_id_from(identity: &AuthContext) -> Result<Uuid, AppError> {
    Uuid::parse_str(&identity.subject)
        .map_err(|_| AppError::Auth("Invalid token payload".to_string()))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<DoctorLoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Doctor login attempt for {}", request.email);

    let service = DoctorService::new(&config);
    let doctor = service
        .authenticate(&request.email, &request.password)
        .await?;

    let token = issue_token(
        Some(doctor.id.to_string()),
        None,
        AuthRole::Doctor,
        &config.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let doctors = service.list_public().await?;

    Ok(Json(json!({ "success": true, "doctors": doctors })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = doctor_id_from(&identity)?;

    let service = DoctorService::new(&config);
    let doctor = service.get_doctor(doctor_id).await?;

    Ok(Json(json!({ "success": true, "doctor": doctor.profile() })))
}

#[axum::debug_handler]
pub async fn change_availability(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = doctor_id_from(&identity)?;

    let service = DoctorService::new(&config);
    let available = service.toggle_availability(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!(
            "Availability changed to {}",
            if available { "Available" } else { "Unavailable" }
        ),
        "available": available
    })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let doctor_id = doctor_id_from(&identity)?;

    let store = StoreClient::new(&config);
    let request = parse_profile_form(multipart, &store).await?;

    let service = DoctorService::new(&config);
    let doctor = service.update_profile(doctor_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor,
        "message": "Doctor profile updated successfully"
    })))
}

/// Collect the multipart profile form, pushing an attached image to media
/// storage and recording its public URL.
async fn parse_profile_form(
    mut multipart: Multipart,
    store: &StoreClient,
) -> Result<UpdateDoctorProfileRequest, AppError> {
    let mut request = UpdateDoctorProfileRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "name" => request.name = Some(field_text(field).await?),
            "speciality" => request.speciality = Some(field_text(field).await?),
            "degree" => request.degree = Some(field_text(field).await?),
            "about" => request.about = Some(field_text(field).await?),
            "experience" => {
                let text = field_text(field).await?;
                request.experience = Some(text.parse().map_err(|_| {
                    AppError::Validation("Invalid experience value".to_string())
                })?);
            }
            "fees" => {
                let text = field_text(field).await?;
                request.fees = Some(
                    text.parse()
                        .map_err(|_| AppError::Validation("Invalid fees value".to_string()))?,
                );
            }
            "address" => {
                let text = field_text(field).await?;
                let address: Address = serde_json::from_str(&text)
                    .map_err(|_| AppError::Validation("Invalid address format".to_string()))?;
                request.address = Some(address);
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
                request.image = Some(url);
            }
            _ => {}
        }
    }

    Ok(request)
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))
}
