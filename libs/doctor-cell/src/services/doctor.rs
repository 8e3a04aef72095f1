use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_utils::password::{hash_password, verify_password};

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorError, DoctorListing, DoctorProfile,
    UpdateDoctorProfileRequest,
};

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let value = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(value)
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?email=eq.{}", urlencoding::encode(email));
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(value) => {
                let doctor = serde_json::from_value(value)
                    .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;
                Ok(Some(doctor))
            }
            None => Ok(None),
        }
    }

    /// Credential check for doctor login. The same error covers an unknown
    /// email and a wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Doctor, DoctorError> {
        let doctor = self
            .find_by_email(email)
            .await?
            .ok_or(DoctorError::InvalidCredentials)?;

        let matches = verify_password(password, &doctor.password_hash)
            .map_err(|e| DoctorError::Database(e.to_string()))?;
        if !matches {
            return Err(DoctorError::InvalidCredentials);
        }

        Ok(doctor)
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<DoctorProfile, DoctorError> {
        if self.find_by_email(&request.email).await?.is_some() {
            return Err(DoctorError::Validation("Email already exists".to_string()));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| DoctorError::Database(e.to_string()))?;
        let now = Utc::now();

        let doctor_data = json!({
            "id": Uuid::new_v4(),
            "name": request.name,
            "email": request.email,
            "password_hash": password_hash,
            "speciality": request.speciality,
            "degree": request.degree,
            "experience": request.experience,
            "about": request.about,
            "fees": request.fees,
            "image": request.image,
            "available": true,
            "address": request.address,
            "booked_slots": {},
            "slot_version": 0,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result = self
            .store
            .write(Method::POST, "/rest/v1/doctors", doctor_data)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let value = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::Database("Failed to create doctor".to_string()))?;
        let doctor: Doctor = serde_json::from_value(value)
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;

        info!("Doctor {} added to the directory", doctor.id);
        Ok(doctor.profile())
    }

    /// Public directory: available to anyone, strips email and credential.
    pub async fn list_public(&self) -> Result<Vec<DoctorListing>, DoctorError> {
        let doctors = self.fetch_all().await?;
        Ok(doctors.iter().map(Doctor::listing).collect())
    }

    /// Admin directory view: full profiles, still without credentials.
    pub async fn list_all(&self) -> Result<Vec<DoctorProfile>, DoctorError> {
        let doctors = self.fetch_all().await?;
        Ok(doctors.iter().map(Doctor::profile).collect())
    }

    pub async fn count(&self) -> Result<usize, DoctorError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/doctors?select=id", None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;
        Ok(result.len())
    }

    /// Flip the availability flag, returning the new value.
    pub async fn toggle_availability(&self, doctor_id: Uuid) -> Result<bool, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let available = !doctor.available;

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "available": available,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::Database(
                "Failed to update availability".to_string(),
            ));
        }

        info!(
            "Doctor {} availability toggled to {}",
            doctor_id, available
        );
        Ok(available)
    }

    pub async fn update_profile(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorProfileRequest,
    ) -> Result<DoctorProfile, DoctorError> {
        debug!("Updating profile for doctor: {}", doctor_id);

        // Ensure the doctor exists before patching
        self.get_doctor(doctor_id).await?;

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(speciality) = request.speciality {
            update_data.insert("speciality".to_string(), json!(speciality));
        }
        if let Some(degree) = request.degree {
            update_data.insert("degree".to_string(), json!(degree));
        }
        if let Some(experience) = request.experience {
            update_data.insert("experience".to_string(), json!(experience));
        }
        if let Some(about) = request.about {
            update_data.insert("about".to_string(), json!(about));
        }
        if let Some(fees) = request.fees {
            update_data.insert("fees".to_string(), json!(fees));
        }
        if let Some(address) = request.address {
            update_data.insert("address".to_string(), json!(address));
        }
        if let Some(image) = request.image {
            update_data.insert("image".to_string(), json!(image));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result = self
            .store
            .write(Method::PATCH, &path, Value::Object(update_data))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let value = result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::Database("Failed to update profile".to_string()))?;
        let doctor: Doctor = serde_json::from_value(value)
            .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;

        Ok(doctor.profile())
    }

    async fn fetch_all(&self) -> Result<Vec<Doctor>, DoctorError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, "/rest/v1/doctors?order=created_at.asc", None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))
            })
            .collect()
    }
}
