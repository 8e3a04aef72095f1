use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use shared_models::error::AppError;

/// Per-doctor reservation ledger: date key (`YYYY-MM-DD`) to the set of
/// reserved time-of-day labels (`"10:00 AM"`). A label appears at most once
/// per date, and a date with no reservations is not kept in the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookedSlots(BTreeMap<String, Vec<String>>);

impl BookedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_booked(&self, date: &str, time: &str) -> bool {
        self.0
            .get(date)
            .map(|times| times.iter().any(|t| t == time))
            .unwrap_or(false)
    }

    /// Add a reservation. Returns false without mutating when the slot is
    /// already taken.
    pub fn reserve(&mut self, date: &str, time: &str) -> bool {
        let times = self.0.entry(date.to_string()).or_default();
        if times.iter().any(|t| t == time) {
            return false;
        }
        times.push(time.to_string());
        true
    }

    /// Remove a reservation if present, dropping the date key once its set
    /// empties. Releasing an absent slot is a no-op.
    pub fn release(&mut self, date: &str, time: &str) {
        if let Some(times) = self.0.get_mut(date) {
            times.retain(|t| t != time);
            if times.is_empty() {
                self.0.remove(date);
            }
        }
    }

    pub fn contains_date(&self, date: &str) -> bool {
        self.0.contains_key(date)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub line1: String,
    pub line2: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub speciality: String,
    pub degree: String,
    pub experience: i32,
    pub about: String,
    pub fees: i64,
    pub image: Option<String>,
    pub available: bool,
    pub address: Address,
    pub booked_slots: BookedSlots,
    /// Optimistic-concurrency token covering `booked_slots`; bumped on every
    /// reserve/release via compare-and-swap.
    pub slot_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn profile(&self) -> DoctorProfile {
        DoctorProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            speciality: self.speciality.clone(),
            degree: self.degree.clone(),
            experience: self.experience,
            about: self.about.clone(),
            fees: self.fees,
            image: self.image.clone(),
            available: self.available,
            address: self.address.clone(),
            booked_slots: self.booked_slots.clone(),
        }
    }

    pub fn listing(&self) -> DoctorListing {
        DoctorListing {
            id: self.id,
            name: self.name.clone(),
            speciality: self.speciality.clone(),
            degree: self.degree.clone(),
            experience: self.experience,
            about: self.about.clone(),
            fees: self.fees,
            image: self.image.clone(),
            available: self.available,
            address: self.address.clone(),
            booked_slots: self.booked_slots.clone(),
        }
    }

    /// Point-in-time copy embedded into appointments. Excludes the
    /// booked-slot map and concurrency token: the snapshot is history, not
    /// live scheduling state.
    pub fn snapshot(&self) -> DoctorSnapshot {
        DoctorSnapshot {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            speciality: self.speciality.clone(),
            degree: self.degree.clone(),
            experience: self.experience,
            fees: self.fees,
            image: self.image.clone(),
            address: self.address.clone(),
        }
    }
}

/// Authenticated view of a doctor record (admin listings, the doctor's own
/// profile). Never carries the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub speciality: String,
    pub degree: String,
    pub experience: i32,
    pub about: String,
    pub fees: i64,
    pub image: Option<String>,
    pub available: bool,
    pub address: Address,
    pub booked_slots: BookedSlots,
}

/// Public directory entry: also strips the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListing {
    pub id: Uuid,
    pub name: String,
    pub speciality: String,
    pub degree: String,
    pub experience: i32,
    pub about: String,
    pub fees: i64,
    pub image: Option<String>,
    pub available: bool,
    pub address: Address,
    pub booked_slots: BookedSlots,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSnapshot {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub speciality: String,
    pub degree: String,
    pub experience: i32,
    pub fees: i64,
    pub image: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorLoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin onboarding payload, assembled from the multipart form after the
/// image (if any) has been pushed to media storage.
#[derive(Debug, Clone)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub speciality: String,
    pub degree: String,
    pub experience: i32,
    pub about: String,
    pub fees: i64,
    pub address: Address,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDoctorProfileRequest {
    pub name: Option<String>,
    pub speciality: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<i32>,
    pub about: Option<String>,
    pub fees: Option<i64>,
    pub address: Option<Address>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor not available")]
    NotAvailable,

    #[error("Slot already booked")]
    SlotTaken,

    #[error("Slot update conflicted, please retry")]
    SlotContention,

    #[error("Invalid Credentials")]
    InvalidCredentials,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::NotAvailable => AppError::Conflict("Doctor not available".to_string()),
            DoctorError::SlotTaken => AppError::Conflict("Slot already booked".to_string()),
            DoctorError::SlotContention => {
                AppError::Conflict("Slot update conflicted, please retry".to_string())
            }
            DoctorError::InvalidCredentials => AppError::Auth("Invalid Credentials".to_string()),
            DoctorError::Validation(msg) => AppError::Validation(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
