use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;

use doctor_cell::services::doctor::DoctorService;
use patient_cell::services::patient::PatientService;

use crate::models::{AdminDashboard, AppointmentStatus, BookingError, DoctorDashboard};
use crate::services::booking::BookingService;

const LATEST_APPOINTMENTS_LIMIT: usize = 5;

/// Read-only aggregations for the admin and doctor consoles. Recomputed on
/// every call; the stores stay the single source of truth.
pub struct DashboardService {
    booking: BookingService,
    doctor_service: DoctorService,
    patient_service: PatientService,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            booking: BookingService::new(config),
            doctor_service: DoctorService::new(config),
            patient_service: PatientService::new(config),
        }
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, BookingError> {
        debug!("Computing admin dashboard");

        let doctors = self
            .doctor_service
            .count()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;
        let patients = self
            .patient_service
            .count()
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        // Already ordered created_at descending by the store query.
        let appointments = self.booking.list_all().await?;
        let total = appointments.len();
        let latest_appointments = appointments
            .into_iter()
            .take(LATEST_APPOINTMENTS_LIMIT)
            .collect();

        Ok(AdminDashboard {
            doctors,
            appointments: total,
            patients,
            latest_appointments,
        })
    }

    pub async fn doctor_dashboard(&self, doc_id: Uuid) -> Result<DoctorDashboard, BookingError> {
        debug!("Computing dashboard for doctor {}", doc_id);

        let appointments = self.booking.list_for_doctor(doc_id).await?;

        let total = appointments.len();
        let cancelled = appointments
            .iter()
            .filter(|a| a.status == AppointmentStatus::Cancelled)
            .count();
        let active = total - cancelled;

        let patients = appointments
            .iter()
            .map(|a| a.user_id)
            .collect::<HashSet<_>>()
            .len();

        let latest_appointments = appointments
            .into_iter()
            .take(LATEST_APPOINTMENTS_LIMIT)
            .collect();

        Ok(DoctorDashboard {
            total,
            active,
            cancelled,
            patients,
            latest_appointments,
        })
    }
}
