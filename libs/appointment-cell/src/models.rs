use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use doctor_cell::models::{DoctorError, DoctorSnapshot};
use patient_cell::models::{PatientError, PatientSnapshot};
use shared_models::auth::{AuthContext, AuthRole};
use shared_models::error::AppError;

/// A booked visit. `user_data` and `doc_data` are deliberate point-in-time
/// copies of the patient and doctor records: the appointment is a historical
/// document and does not follow later profile edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub doc_id: Uuid,
    /// `YYYY-MM-DD`, matching the doctor's booked-slot keys.
    pub slot_date: String,
    /// 12-hour label, e.g. `"10:00 AM"`.
    pub slot_time: String,
    pub user_data: PatientSnapshot,
    pub doc_data: DoctorSnapshot,
    /// Doctor fee at booking time.
    pub amount: i64,
    pub status: AppointmentStatus,
    pub payment: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether the given identity may cancel or complete this appointment:
    /// the owning patient, the assigned doctor, or the admin.
    pub fn is_actionable_by(&self, identity: &AuthContext) -> bool {
        match identity.role {
            AuthRole::Admin => true,
            AuthRole::Doctor => identity.subject == self.doc_id.to_string(),
            AuthRole::Patient => identity.subject == self.user_id.to_string(),
        }
    }
}

/// Lifecycle state. A single enumeration (rather than independent flags)
/// so a cancelled-and-completed record cannot exist. Both non-booked states
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doc_id: Uuid,
    pub slot_date: String,
    pub slot_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentActionRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doc_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub doctors: usize,
    pub appointments: usize,
    pub patients: usize,
    pub latest_appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDashboard {
    pub total: usize,
    pub active: usize,
    pub cancelled: usize,
    pub patients: usize,
    pub latest_appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor not available")]
    DoctorUnavailable,

    #[error("Slot already booked")]
    SlotAlreadyBooked,

    #[error("Slot update conflicted, please retry")]
    SlotContention,

    #[error("You already booked this slot")]
    DuplicateBooking,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Appointment already cancelled")]
    AlreadyCancelled,

    #[error("Appointment already completed")]
    AlreadyCompleted,

    #[error("Not allowed to modify this appointment")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for BookingError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => BookingError::DoctorNotFound,
            DoctorError::NotAvailable => BookingError::DoctorUnavailable,
            DoctorError::SlotTaken => BookingError::SlotAlreadyBooked,
            DoctorError::SlotContention => BookingError::SlotContention,
            other => BookingError::Database(other.to_string()),
        }
    }
}

impl From<PatientError> for BookingError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => BookingError::UserNotFound,
            other => BookingError::Database(other.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            BookingError::DoctorUnavailable => {
                AppError::Conflict("Doctor not available".to_string())
            }
            BookingError::SlotAlreadyBooked => {
                AppError::Conflict("Slot already booked".to_string())
            }
            BookingError::SlotContention => {
                AppError::Conflict("Slot update conflicted, please retry".to_string())
            }
            BookingError::DuplicateBooking => {
                AppError::Conflict("You already booked this slot".to_string())
            }
            BookingError::AppointmentNotFound => {
                AppError::NotFound("Appointment not found".to_string())
            }
            BookingError::AlreadyCancelled => {
                AppError::Conflict("Appointment already cancelled".to_string())
            }
            BookingError::AlreadyCompleted => {
                AppError::Conflict("Appointment already completed".to_string())
            }
            BookingError::Forbidden => {
                AppError::Forbidden("Not allowed to modify this appointment".to_string())
            }
            BookingError::UserNotFound => AppError::NotFound("User not found".to_string()),
            BookingError::Database(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_appointment(user: Uuid, doctor: Uuid) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            user_id: user,
            doc_id: doctor,
            slot_date: "2025-07-10".to_string(),
            slot_time: "10:00 AM".to_string(),
            user_data: PatientSnapshot {
                id: user,
                name: "Jane Doe".to_string(),
                email: "jane@example.com".to_string(),
                phone: None,
                address: None,
                dob: None,
                gender: None,
                image: None,
            },
            doc_data: DoctorSnapshot {
                id: doctor,
                name: "Dr. Smith".to_string(),
                email: "smith@example.com".to_string(),
                speciality: "Dermatology".to_string(),
                degree: "MBBS".to_string(),
                experience: 6,
                fees: 500,
                image: None,
                address: doctor_cell::models::Address::default(),
            },
            amount: 500,
            status: AppointmentStatus::Booked,
            payment: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&AppointmentStatus::Booked).unwrap();
        assert_eq!(json, "\"booked\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Cancelled);
    }

    #[test]
    fn terminal_states() {
        assert!(!AppointmentStatus::Booked.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
    }

    #[test]
    fn actionable_by_owner_doctor_and_admin_only() {
        let user = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let appointment = sample_appointment(user, doctor);

        assert!(appointment.is_actionable_by(&AuthContext::patient(user.to_string())));
        assert!(appointment.is_actionable_by(&AuthContext::doctor(doctor.to_string())));
        assert!(appointment.is_actionable_by(&AuthContext::admin("admin@medibook.dev")));

        assert!(!appointment.is_actionable_by(&AuthContext::patient(Uuid::new_v4().to_string())));
        assert!(!appointment.is_actionable_by(&AuthContext::doctor(user.to_string())));
    }
}
