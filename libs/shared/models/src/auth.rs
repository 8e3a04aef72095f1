use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// Token payload. Admin tokens carry `email`, doctor and patient tokens
/// carry `id` (the record id in the respective collection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: AuthRole,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthRole {
    Admin,
    Doctor,
    Patient,
}

impl std::fmt::Display for AuthRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthRole::Admin => write!(f, "admin"),
            AuthRole::Doctor => write!(f, "doctor"),
            AuthRole::Patient => write!(f, "patient"),
        }
    }
}

/// Identity resolved from a verified token, attached to the request by the
/// auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub role: AuthRole,
    /// Record id for doctors and patients, email for the admin.
    pub subject: String,
}

impl AuthContext {
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            role: AuthRole::Admin,
            subject: email.into(),
        }
    }

    pub fn doctor(id: impl Into<String>) -> Self {
        Self {
            role: AuthRole::Doctor,
            subject: id.into(),
        }
    }

    pub fn patient(id: impl Into<String>) -> Self {
        Self {
            role: AuthRole::Patient,
            subject: id.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}
