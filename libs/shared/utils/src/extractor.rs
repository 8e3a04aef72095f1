use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthContext, AuthRole, JwtClaims};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Single identity-resolution core shared by every role adapter. The header
/// conventions differ per role (kept for client compatibility), but the
/// token checks do not.
pub fn resolve_identity(
    token: &str,
    config: &AppConfig,
    expected_role: AuthRole,
) -> Result<AuthContext, AppError> {
    let claims: JwtClaims =
        validate_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    if claims.role != expected_role {
        return Err(AppError::Auth("Token role mismatch".to_string()));
    }

    match expected_role {
        AuthRole::Admin => {
            let email = claims
                .email
                .ok_or_else(|| AppError::Auth("Invalid token payload".to_string()))?;
            if email != config.admin_email {
                return Err(AppError::Auth("Invalid token payload".to_string()));
            }
            Ok(AuthContext::admin(email))
        }
        AuthRole::Doctor => {
            let id = claims
                .id
                .ok_or_else(|| AppError::Auth("Invalid token payload".to_string()))?;
            Ok(AuthContext::doctor(id))
        }
        AuthRole::Patient => {
            let id = claims
                .id
                .ok_or_else(|| AppError::Auth("Invalid token payload".to_string()))?;
            Ok(AuthContext::patient(id))
        }
    }
}

fn bearer_token(request: &Request<Body>) -> Result<String, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Not Authorized. Login again.".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

/// Patients send the token as a bare `token` header rather than a bearer
/// header. Legacy convention preserved at the boundary only.
fn raw_token(request: &Request<Body>) -> Result<String, AppError> {
    let header = request
        .headers()
        .get("token")
        .ok_or_else(|| AppError::Auth("Not Authorized. Please log in again.".to_string()))?;

    header
        .to_str()
        .map(|t| t.to_string())
        .map_err(|_| AppError::Auth("Invalid token header".to_string()))
}

async fn run_with_identity(
    config: Arc<AppConfig>,
    mut request: Request<Body>,
    next: Next,
    token: String,
    expected_role: AuthRole,
) -> Result<Response, AppError> {
    let identity = resolve_identity(&token, &config, expected_role)?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn auth_admin_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    run_with_identity(config, request, next, token, AuthRole::Admin).await
}

pub async fn auth_doctor_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;
    run_with_identity(config, request, next, token, AuthRole::Doctor).await
}

pub async fn auth_patient_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = raw_token(&request)?;
    run_with_identity(config, request, next, token, AuthRole::Patient).await
}
