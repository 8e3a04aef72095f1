use std::sync::Arc;

use shared_config::AppConfig;
use shared_models::auth::AuthRole;

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub store_url: String,
    pub store_service_key: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            store_url: "http://localhost:54321".to_string(),
            store_service_key: "test-service-key".to_string(),
            admin_email: "admin@medibook.dev".to_string(),
            admin_password: "super-secret-admin".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_store_url(store_url: &str) -> Self {
        Self {
            store_url: store_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_url: self.store_url.clone(),
            store_service_key: self.store_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            admin_email: self.admin_email.clone(),
            admin_password: self.admin_password.clone(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    pub fn admin_token(&self) -> String {
        issue_token(
            None,
            Some(self.admin_email.clone()),
            AuthRole::Admin,
            &self.jwt_secret,
        )
        .expect("sign admin token")
    }

    pub fn doctor_token(&self, doctor_id: &str) -> String {
        issue_token(
            Some(doctor_id.to_string()),
            None,
            AuthRole::Doctor,
            &self.jwt_secret,
        )
        .expect("sign doctor token")
    }

    pub fn patient_token(&self, user_id: &str) -> String {
        issue_token(
            Some(user_id.to_string()),
            None,
            AuthRole::Patient,
            &self.jwt_secret,
        )
        .expect("sign patient token")
    }
}
