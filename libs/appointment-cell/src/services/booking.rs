use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use doctor_cell::services::availability::AvailabilityService;
use doctor_cell::services::doctor::DoctorService;
use patient_cell::services::patient::PatientService;

use crate::models::{Appointment, AppointmentStatus, BookAppointmentRequest, BookingError};

pub struct BookingService {
    store: StoreClient,
    availability: AvailabilityService,
    doctor_service: DoctorService,
    patient_service: PatientService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            availability: AvailabilityService::new(config),
            doctor_service: DoctorService::new(config),
            patient_service: PatientService::new(config),
        }
    }

    /// Reserve a slot and persist the appointment. Failure order: unknown
    /// doctor, unavailable doctor, occupied slot, duplicate booking by the
    /// same user. On success the slot lands in the doctor's ledger before
    /// the appointment document is written; a failed write releases the
    /// slot again before the error propagates.
    pub async fn book_appointment(
        &self,
        user_id: Uuid,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        info!(
            "Booking slot {} {} with doctor {} for user {}",
            request.slot_date, request.slot_time, request.doc_id, user_id
        );

        let doctor = self.doctor_service.get_doctor(request.doc_id).await?;

        if !doctor.available {
            return Err(BookingError::DoctorUnavailable);
        }

        if doctor
            .booked_slots
            .is_booked(&request.slot_date, &request.slot_time)
        {
            return Err(BookingError::SlotAlreadyBooked);
        }

        if self
            .has_duplicate_booking(user_id, request.doc_id, &request.slot_date, &request.slot_time)
            .await?
        {
            return Err(BookingError::DuplicateBooking);
        }

        let patient = self.patient_service.get_patient(user_id).await?;

        // Reserve first: the doctor record is the source of truth for slot
        // occupancy, and the CAS write rejects a concurrent taker.
        let reserved_doctor = self
            .availability
            .reserve_slot(request.doc_id, &request.slot_date, &request.slot_time)
            .await?;

        let now = Utc::now();
        let appointment_data = json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "doc_id": reserved_doctor.id,
            "slot_date": request.slot_date,
            "slot_time": request.slot_time,
            "user_data": patient.snapshot(),
            "doc_data": reserved_doctor.snapshot(),
            "amount": reserved_doctor.fees,
            "status": AppointmentStatus::Booked.to_string(),
            "payment": false,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let insert_result = self
            .store
            .write(Method::POST, "/rest/v1/appointments", appointment_data)
            .await;

        let result = match insert_result {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    "Appointment insert failed after slot reserve, releasing {} {}",
                    request.slot_date, request.slot_time
                );
                if let Err(release_err) = self
                    .availability
                    .release_slot(request.doc_id, &request.slot_date, &request.slot_time)
                    .await
                {
                    warn!("Slot release after failed insert also failed: {}", release_err);
                }
                return Err(BookingError::Database(e.to_string()));
            }
        };

        let value = result
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::Database("Failed to create appointment".to_string()))?;
        let appointment: Appointment = serde_json::from_value(value)
            .map_err(|e| BookingError::Database(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, BookingError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let value = result
            .into_iter()
            .next()
            .ok_or(BookingError::AppointmentNotFound)?;
        serde_json::from_value(value)
            .map_err(|e| BookingError::Database(format!("Failed to parse appointment: {}", e)))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?user_id=eq.{}&order=created_at.desc",
            user_id
        );
        self.fetch_appointments(&path).await
    }

    pub async fn list_for_doctor(&self, doc_id: Uuid) -> Result<Vec<Appointment>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?doc_id=eq.{}&order=created_at.desc",
            doc_id
        );
        self.fetch_appointments(&path).await
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, BookingError> {
        self.fetch_appointments("/rest/v1/appointments?order=created_at.desc")
            .await
    }

    async fn has_duplicate_booking(
        &self,
        user_id: Uuid,
        doc_id: Uuid,
        slot_date: &str,
        slot_time: &str,
    ) -> Result<bool, BookingError> {
        let path = format!(
            "/rest/v1/appointments?user_id=eq.{}&doc_id=eq.{}&slot_date=eq.{}&slot_time=eq.{}&status=neq.cancelled",
            user_id,
            doc_id,
            urlencoding::encode(slot_date),
            urlencoding::encode(slot_time)
        );

        let result: Vec<Value> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        Ok(!result.is_empty())
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, BookingError> {
        let result: Vec<Value> = self
            .store
            .request(Method::GET, path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        result
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|e| {
                    BookingError::Database(format!("Failed to parse appointment: {}", e))
                })
            })
            .collect()
    }
}
