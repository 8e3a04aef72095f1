use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::password::{hash_password, verify_password};
use shared_utils::validation::normalize_dob;

use crate::models::{Patient, PatientError, RegisterRequest, UpdateProfileRequest};

pub struct PatientService {
    store: StoreClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Patient, PatientError> {
        if self.find_by_email(&request.email).await?.is_some() {
            return Err(PatientError::EmailExists);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| PatientError::Database(e.to_string()))?;
        let now = Utc::now();

        let patient_data = json!({
            "id": Uuid::new_v4(),
            "name": request.name,
            "email": request.email,
            "password_hash": password_hash,
            "phone": null,
            "address": null,
            "dob": null,
            "gender": null,
            "image": null,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .store
            .write(Method::POST, "/rest/v1/patients", patient_data)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let value = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::Database("Failed to create user".to_string()))?;
        let patient: Patient = serde_json::from_value(value)
            .map_err(|e| PatientError::Database(format!("Failed to parse user: {}", e)))?;

        info!("Registered new user {}", patient.id);
        Ok(patient)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Patient, PatientError> {
        let patient = self
            .find_by_email(email)
            .await?
            .ok_or(PatientError::InvalidCredentials)?;

        let matches = verify_password(password, &patient.password_hash)
            .map_err(|e| PatientError::Database(e.to_string()))?;
        if !matches {
            return Err(PatientError::InvalidCredentials);
        }

        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching user: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let value = result.into_iter().next().ok_or(PatientError::NotFound)?;
        serde_json::from_value(value)
            .map_err(|e| PatientError::Database(format!("Failed to parse user: {}", e)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?email=eq.{}", urlencoding::encode(email));
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(value) => {
                let patient = serde_json::from_value(value)
                    .map_err(|e| PatientError::Database(format!("Failed to parse user: {}", e)))?;
                Ok(Some(patient))
            }
            None => Ok(None),
        }
    }

    pub async fn update_profile(
        &self,
        patient_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating profile for user: {}", patient_id);

        self.get_patient(patient_id).await?;

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(dob) = request.dob {
            update_data.insert("dob".to_string(), json!(normalize_dob(&dob)));
        }
        if let Some(gender) = request.gender {
            update_data.insert("gender".to_string(), json!(gender));
        }
        if let Some(image) = request.image {
            update_data.insert("image".to_string(), json!(image));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result = self
            .store
            .write(Method::PATCH, &path, Value::Object(update_data))
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let value = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::Database("Failed to update profile".to_string()))?;
        serde_json::from_value(value)
            .map_err(|e| PatientError::Database(format!("Failed to parse user: {}", e)))
    }

    pub async fn count(&self) -> Result<usize, PatientError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/patients?select=id", None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;
        Ok(result.len())
    }
}
