mod common;

use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentStatus, BookAppointmentRequest, BookingError};
use appointment_cell::services::booking::BookingService;
use shared_utils::test_utils::TestConfig;

use common::{appointment_json, doctor_json, patient_json};

struct TestSetup {
    service: BookingService,
    server: MockServer,
    doc_id: Uuid,
    user_id: Uuid,
}

impl TestSetup {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let config = TestConfig::with_store_url(&server.uri()).to_app_config();

        Self {
            service: BookingService::new(&config),
            server,
            doc_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        }
    }

    fn request(&self) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doc_id: self.doc_id,
            slot_date: "2025-07-10".to_string(),
            slot_time: "10:00 AM".to_string(),
        }
    }

    async fn mock_doctor(&self, available: bool, booked_slots: serde_json::Value, version: i64) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/doctors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
                self.doc_id,
                available,
                booked_slots,
                version
            )])))
            .mount(&self.server)
            .await;
    }

    async fn mock_no_duplicates(&self) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&self.server)
            .await;
    }

    async fn mock_patient(&self) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/patients"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([patient_json(self.user_id)])),
            )
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn booking_reserves_slot_and_creates_appointment() {
    let setup = TestSetup::new().await;

    setup.mock_doctor(true, json!({}), 0).await;
    setup.mock_no_duplicates().await;
    setup.mock_patient().await;

    // CAS write must target the version that was read and bump it.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("slot_version", "eq.0"))
        .and(body_partial_json(json!({
            "booked_slots": { "2025-07-10": ["10:00 AM"] },
            "slot_version": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            setup.doc_id,
            true,
            json!({ "2025-07-10": ["10:00 AM"] }),
            1
        )])))
        .mount(&setup.server)
        .await;

    // The created appointment copies the fee and starts booked and unpaid.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "amount": 500,
            "status": "booked",
            "payment": false,
            "slot_date": "2025-07-10",
            "slot_time": "10:00 AM"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([appointment_json(
            Uuid::new_v4(),
            setup.user_id,
            setup.doc_id,
            "booked",
            "2025-07-10",
            "10:00 AM",
            "2025-07-09T09:00:00Z"
        )])))
        .mount(&setup.server)
        .await;

    let appointment = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .expect("booking should succeed");

    assert_eq!(appointment.amount, 500);
    assert_eq!(appointment.status, AppointmentStatus::Booked);
    assert!(!appointment.payment);
    assert_eq!(appointment.slot_time, "10:00 AM");
}

#[tokio::test]
async fn booking_unknown_doctor_fails() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&setup.server)
        .await;

    let err = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .unwrap_err();

    assert_matches!(err, BookingError::DoctorNotFound);
}

#[tokio::test]
async fn booking_unavailable_doctor_fails() {
    let setup = TestSetup::new().await;
    setup.mock_doctor(false, json!({}), 0).await;

    let err = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .unwrap_err();

    assert_matches!(err, BookingError::DoctorUnavailable);
}

#[tokio::test]
async fn booking_taken_slot_fails() {
    let setup = TestSetup::new().await;
    setup
        .mock_doctor(true, json!({ "2025-07-10": ["10:00 AM"] }), 3)
        .await;

    let err = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .unwrap_err();

    assert_matches!(err, BookingError::SlotAlreadyBooked);
}

#[tokio::test]
async fn booking_same_slot_twice_is_a_duplicate() {
    let setup = TestSetup::new().await;
    setup.mock_doctor(true, json!({}), 0).await;

    // An existing non-cancelled appointment for the same tuple.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([appointment_json(
            Uuid::new_v4(),
            setup.user_id,
            setup.doc_id,
            "booked",
            "2025-07-10",
            "10:00 AM",
            "2025-07-08T12:00:00Z"
        )])))
        .mount(&setup.server)
        .await;

    let err = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .unwrap_err();

    assert_matches!(err, BookingError::DuplicateBooking);
}

#[tokio::test]
async fn cas_contention_is_surfaced_after_retries() {
    let setup = TestSetup::new().await;

    setup.mock_doctor(true, json!({}), 0).await;
    setup.mock_no_duplicates().await;
    setup.mock_patient().await;

    // The conditional write never matches: another writer keeps winning.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&setup.server)
        .await;

    let err = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .unwrap_err();

    assert_matches!(err, BookingError::SlotContention);
}

#[tokio::test]
async fn failed_appointment_insert_releases_the_slot() {
    let setup = TestSetup::new().await;

    // First two doctor reads (booking check + reserve) see an open ledger;
    // the read inside the release path sees the reserved slot.
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            setup.doc_id,
            true,
            json!({}),
            0
        )])))
        .up_to_n_times(2)
        .mount(&setup.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            setup.doc_id,
            true,
            json!({ "2025-07-10": ["10:00 AM"] }),
            1
        )])))
        .mount(&setup.server)
        .await;

    setup.mock_no_duplicates().await;
    setup.mock_patient().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            setup.doc_id,
            true,
            json!({ "2025-07-10": ["10:00 AM"] }),
            1
        )])))
        .mount(&setup.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("insert failed"))
        .mount(&setup.server)
        .await;

    let err = setup
        .service
        .book_appointment(setup.user_id, setup.request())
        .await
        .unwrap_err();

    assert_matches!(err, BookingError::Database(_));

    // One reserve PATCH plus one release PATCH.
    let patches = setup
        .server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .count();
    assert!(patches >= 2, "expected a release write after the failed insert");
}
