use assert_matches::assert_matches;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::DoctorError;
use doctor_cell::services::doctor::DoctorService;
use shared_utils::password::hash_password;
use shared_utils::test_utils::TestConfig;

fn doctor_json(id: Uuid, email: &str, password_hash: &str, available: bool) -> Value {
    json!({
        "id": id,
        "name": "Dr. Asha Rao",
        "email": email,
        "password_hash": password_hash,
        "speciality": "Dermatology",
        "degree": "MBBS",
        "experience": 6,
        "about": "Skin specialist",
        "fees": 500,
        "image": null,
        "available": available,
        "address": { "line1": "12 Clinic Road", "line2": "Floor 2" },
        "booked_slots": {},
        "slot_version": 0,
        "created_at": "2025-01-15T09:00:00Z",
        "updated_at": "2025-01-15T09:00:00Z"
    })
}

async fn setup() -> (DoctorService, MockServer) {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    (DoctorService::new(&config), server)
}

#[tokio::test]
async fn authenticate_accepts_correct_password() {
    let (service, server) = setup().await;
    let id = Uuid::new_v4();
    let hash = hash_password("a-strong-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            id,
            "asha.rao@example.com",
            &hash,
            true
        )])))
        .mount(&server)
        .await;

    let doctor = service
        .authenticate("asha.rao@example.com", "a-strong-password")
        .await
        .expect("login should succeed");

    assert_eq!(doctor.id, id);
}

#[tokio::test]
async fn authenticate_rejects_wrong_password() {
    let (service, server) = setup().await;
    let hash = hash_password("a-strong-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            Uuid::new_v4(),
            "asha.rao@example.com",
            &hash,
            true
        )])))
        .mount(&server)
        .await;

    let err = service
        .authenticate("asha.rao@example.com", "not-the-password")
        .await
        .unwrap_err();

    assert_matches!(err, DoctorError::InvalidCredentials);
}

#[tokio::test]
async fn authenticate_rejects_unknown_email() {
    let (service, server) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = service
        .authenticate("nobody@example.com", "whatever1")
        .await
        .unwrap_err();

    assert_matches!(err, DoctorError::InvalidCredentials);
}

#[tokio::test]
async fn toggle_flips_availability() {
    let (service, server) = setup().await;
    let id = Uuid::new_v4();
    let hash = hash_password("a-strong-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            id,
            "asha.rao@example.com",
            &hash,
            true
        )])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(body_partial_json(json!({ "available": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            id,
            "asha.rao@example.com",
            &hash,
            false
        )])))
        .mount(&server)
        .await;

    let available = service.toggle_availability(id).await.unwrap();
    assert!(!available);
}

#[tokio::test]
async fn create_doctor_rejects_existing_email() {
    let (service, server) = setup().await;
    let hash = hash_password("a-strong-password").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([doctor_json(
            Uuid::new_v4(),
            "asha.rao@example.com",
            &hash,
            true
        )])))
        .mount(&server)
        .await;

    let request = doctor_cell::models::CreateDoctorRequest {
        name: "Dr. Asha Rao".to_string(),
        email: "asha.rao@example.com".to_string(),
        password: "a-strong-password".to_string(),
        speciality: "Dermatology".to_string(),
        degree: "MBBS".to_string(),
        experience: 6,
        about: "Skin specialist".to_string(),
        fees: 500,
        address: doctor_cell::models::Address::default(),
        image: None,
    };

    let err = service.create_doctor(request).await.unwrap_err();
    assert_matches!(err, DoctorError::Validation(_));
}

#[tokio::test]
async fn missing_doctor_is_not_found() {
    let (service, server) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = service.get_doctor(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, DoctorError::NotFound);
}
