use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;
use shared_models::auth::AuthContext;

use doctor_cell::services::availability::AvailabilityService;

use crate::models::{Appointment, AppointmentStatus, BookingError};
use crate::services::booking::BookingService;

/// Cancel/complete transitions. `Booked` is the only state with successors;
/// both transitions require the acting identity to own the appointment
/// (patient), be assigned to it (doctor), or be the admin.
pub struct LifecycleService {
    store: StoreClient,
    booking: BookingService,
    availability: AvailabilityService,
}

impl LifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            booking: BookingService::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    /// Cancel and free the slot in the doctor's ledger. The appointment
    /// document stays behind as history.
    pub async fn cancel(
        &self,
        appointment_id: Uuid,
        actor: &AuthContext,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.booking.get_appointment(appointment_id).await?;

        if !appointment.is_actionable_by(actor) {
            return Err(BookingError::Forbidden);
        }

        match appointment.status {
            AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
            AppointmentStatus::Completed => return Err(BookingError::AlreadyCompleted),
            AppointmentStatus::Booked => {}
        }

        let updated = self
            .write_status(appointment_id, AppointmentStatus::Cancelled)
            .await?;

        self.availability
            .release_slot(appointment.doc_id, &appointment.slot_date, &appointment.slot_time)
            .await?;

        info!(
            "Appointment {} cancelled by {} {}",
            appointment_id, actor.role, actor.subject
        );
        Ok(updated)
    }

    /// Mark completed. No slot side effect: the visit happened.
    pub async fn complete(
        &self,
        appointment_id: Uuid,
        actor: &AuthContext,
    ) -> Result<Appointment, BookingError> {
        let appointment = self.booking.get_appointment(appointment_id).await?;

        if !appointment.is_actionable_by(actor) {
            return Err(BookingError::Forbidden);
        }

        match appointment.status {
            AppointmentStatus::Completed => return Err(BookingError::AlreadyCompleted),
            AppointmentStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
            AppointmentStatus::Booked => {}
        }

        let updated = self
            .write_status(appointment_id, AppointmentStatus::Completed)
            .await?;

        info!(
            "Appointment {} completed by {} {}",
            appointment_id, actor.role, actor.subject
        );
        Ok(updated)
    }

    async fn write_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, BookingError> {
        debug!("Setting appointment {} status to {}", appointment_id, status);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "status": status.to_string(),
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let value = result
            .into_iter()
            .next()
            .ok_or(BookingError::AppointmentNotFound)?;
        serde_json::from_value(value)
            .map_err(|e| BookingError::Database(format!("Failed to parse appointment: {}", e)))
    }
}
