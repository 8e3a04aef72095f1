use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::store::StoreClient;

use crate::models::{BookedSlots, Doctor, DoctorError};
use crate::services::doctor::DoctorService;

/// Rolling booking window in calendar days; bucket 0 is today.
pub const BOOKING_WINDOW_DAYS: usize = 7;
/// First bookable hour of any day.
pub const OPENING_HOUR: u32 = 10;
/// Candidate generation stops strictly before this hour.
pub const CLOSING_HOUR: u32 = 21;
/// Slot granularity.
pub const SLOT_INTERVAL_MINUTES: i64 = 30;

const CAS_MAX_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCandidate {
    pub date: String,
    pub time: String,
}

/// Store key for a calendar day. Must match the keys of `BookedSlots`
/// byte-for-byte.
pub fn slot_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Display label for a time of day, e.g. `"10:00 AM"`, `"08:30 PM"`. The
/// exact format is load-bearing: reserved slots are matched by string
/// equality against these labels.
pub fn slot_time_label(time: NaiveTime) -> String {
    time.format("%I:%M %p").to_string()
}

/// Compute the open `{date, time}` candidates for the next seven days.
///
/// Pure read-side projection over the doctor's reservation ledger; performs
/// no I/O and may be recomputed at will.
///
/// Today's first candidate starts at `max(current hour + 1, 10)`, minutes
/// snapped to `:30` when the current minute has passed the half hour, so the
/// earliest offer is always half-hour aligned and at least an hour out.
/// Later days start at 10:00. Candidates advance in 30-minute steps while
/// strictly before 21:00; a day whose window has already closed yields an
/// empty bucket.
pub fn generate_available_slots(
    booked: &BookedSlots,
    now: NaiveDateTime,
) -> Vec<Vec<SlotCandidate>> {
    let mut days = Vec::with_capacity(BOOKING_WINDOW_DAYS);

    for offset in 0..BOOKING_WINDOW_DAYS {
        let date = now.date() + Duration::days(offset as i64);
        let day_end = date.and_hms_opt(CLOSING_HOUR, 0, 0).unwrap();

        let start = if offset == 0 {
            let hour = (now.hour() + 1).max(OPENING_HOUR);
            let minute = if now.minute() > 30 { 30 } else { 0 };
            if hour >= CLOSING_HOUR {
                None
            } else {
                date.and_hms_opt(hour, minute, 0)
            }
        } else {
            date.and_hms_opt(OPENING_HOUR, 0, 0)
        };

        let mut slots = Vec::new();
        if let Some(mut cursor) = start {
            let date_key = slot_date_key(date);
            while cursor < day_end {
                let time_label = slot_time_label(cursor.time());
                if !booked.is_booked(&date_key, &time_label) {
                    slots.push(SlotCandidate {
                        date: date_key.clone(),
                        time: time_label,
                    });
                }
                cursor += Duration::minutes(SLOT_INTERVAL_MINUTES);
            }
        }

        days.push(slots);
    }

    days
}

pub struct AvailabilityService {
    store: StoreClient,
    doctor_service: DoctorService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            doctor_service: DoctorService::new(config),
        }
    }

    /// Open slots for a doctor over the booking window.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<Vec<Vec<SlotCandidate>>, DoctorError> {
        let doctor = self.doctor_service.get_doctor(doctor_id).await?;

        if !doctor.available {
            debug!("Doctor {} is not taking appointments", doctor_id);
            return Ok(vec![Vec::new(); BOOKING_WINDOW_DAYS]);
        }

        Ok(generate_available_slots(&doctor.booked_slots, now))
    }

    /// Reserve a slot on the doctor record via compare-and-swap on
    /// `slot_version`. Contention re-reads and re-checks; a slot taken by a
    /// concurrent writer surfaces as `SlotTaken`, not a lost update.
    pub async fn reserve_slot(
        &self,
        doctor_id: Uuid,
        slot_date: &str,
        slot_time: &str,
    ) -> Result<Doctor, DoctorError> {
        for attempt in 1..=CAS_MAX_ATTEMPTS {
            let doctor = self.doctor_service.get_doctor(doctor_id).await?;

            if !doctor.available {
                return Err(DoctorError::NotAvailable);
            }

            let mut slots = doctor.booked_slots.clone();
            if !slots.reserve(slot_date, slot_time) {
                return Err(DoctorError::SlotTaken);
            }

            if let Some(updated) = self
                .write_slots_versioned(doctor_id, doctor.slot_version, &slots)
                .await?
            {
                debug!(
                    "Reserved slot {} {} for doctor {}",
                    slot_date, slot_time, doctor_id
                );
                return Ok(updated);
            }

            debug!(
                "Slot reservation contention for doctor {} (attempt {})",
                doctor_id, attempt
            );
        }

        Err(DoctorError::SlotContention)
    }

    /// Release a slot. Idempotent: releasing an absent slot succeeds without
    /// a write.
    pub async fn release_slot(
        &self,
        doctor_id: Uuid,
        slot_date: &str,
        slot_time: &str,
    ) -> Result<(), DoctorError> {
        for attempt in 1..=CAS_MAX_ATTEMPTS {
            let doctor = self.doctor_service.get_doctor(doctor_id).await?;

            if !doctor.booked_slots.is_booked(slot_date, slot_time) {
                return Ok(());
            }

            let mut slots = doctor.booked_slots.clone();
            slots.release(slot_date, slot_time);

            if self
                .write_slots_versioned(doctor_id, doctor.slot_version, &slots)
                .await?
                .is_some()
            {
                debug!(
                    "Released slot {} {} for doctor {}",
                    slot_date, slot_time, doctor_id
                );
                return Ok(());
            }

            debug!(
                "Slot release contention for doctor {} (attempt {})",
                doctor_id, attempt
            );
        }

        Err(DoctorError::SlotContention)
    }

    /// Conditional write: only applies when `slot_version` still matches the
    /// value read. An empty representation means another writer got there
    /// first.
    async fn write_slots_versioned(
        &self,
        doctor_id: Uuid,
        expected_version: i64,
        slots: &BookedSlots,
    ) -> Result<Option<Doctor>, DoctorError> {
        let path = format!(
            "/rest/v1/doctors?id=eq.{}&slot_version=eq.{}",
            doctor_id, expected_version
        );

        let result = self
            .store
            .write(
                Method::PATCH,
                &path,
                json!({
                    "booked_slots": slots,
                    "slot_version": expected_version + 1,
                    "updated_at": chrono::Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(value) => {
                let doctor: Doctor = serde_json::from_value(value)
                    .map_err(|e| DoctorError::Database(format!("Failed to parse doctor: {}", e)))?;
                Ok(Some(doctor))
            }
            None => Ok(None),
        }
    }
}
