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
use shared_utils::validation::{validate_email, validate_password};

use crate::models::{Address, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::patient::PatientService;

fn patient_id_from(identity: &AuthContext) -> Result<Uuid, AppError> {
    Uuid::parse_str(&identity.subject)
        .map_err(|_| AppError::Auth("Invalid token payload".to_string()))
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation("Missing Details".to_string()));
    }
    validate_email(&request.email)?;
    validate_password(&request.password)?;

    let service = PatientService::new(&config);
    let patient = service.register(request).await?;

    let token = issue_token(
        Some(patient.id.to_string()),
        None,
        AuthRole::Patient,
        &config.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("User login attempt for {}", request.email);

    let service = PatientService::new(&config);
    let patient = service
        .authenticate(&request.email, &request.password)
        .await?;

    let token = issue_token(
        Some(patient.id.to_string()),
        None,
        AuthRole::Patient,
        &config.jwt_secret,
    )
    .map_err(AppError::Internal)?;

    Ok(Json(json!({ "success": true, "token": token })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
) -> Result<Json<Value>, AppError> {
    let patient_id = patient_id_from(&identity)?;

    let service = PatientService::new(&config);
    let patient = service.get_patient(patient_id).await?;

    Ok(Json(json!({ "success": true, "userData": patient.profile() })))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<AuthContext>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let patient_id = patient_id_from(&identity)?;

    let store = StoreClient::new(&config);
    let request = parse_profile_form(multipart, &store).await?;

    if request.name.is_none()
        || request.phone.is_none()
        || request.dob.is_none()
        || request.gender.is_none()
        || request.address.is_none()
    {
        return Err(AppError::Validation("Data Missing".to_string()));
    }

    let service = PatientService::new(&config);
    service.update_profile(patient_id, request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile Updated Successfully"
    })))
}

async fn parse_profile_form(
    mut multipart: Multipart,
    store: &StoreClient,
) -> Result<UpdateProfileRequest, AppError> {
    let mut request = UpdateProfileRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "name" => request.name = Some(field_text(field).await?),
            "phone" => request.phone = Some(field_text(field).await?),
            "dob" => request.dob = Some(field_text(field).await?),
            "gender" => request.gender = Some(field_text(field).await?),
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
                    .upload_media("patients", &content_type, bytes.to_vec())
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
