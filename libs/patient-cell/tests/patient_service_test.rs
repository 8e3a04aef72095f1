use assert_matches::assert_matches;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{PatientError, RegisterRequest, UpdateProfileRequest};
use patient_cell::services::patient::PatientService;
use shared_utils::password::hash_password;
use shared_utils::test_utils::TestConfig;

fn patient_json(id: Uuid, email: &str, password_hash: &str) -> Value {
    json!({
        "id": id,
        "name": "Jane Doe",
        "email": email,
        "password_hash": password_hash,
        "phone": null,
        "address": null,
        "dob": null,
        "gender": null,
        "image": null,
        "created_at": "2025-02-01T10:00:00Z",
        "updated_at": "2025-02-01T10:00:00Z"
    })
}

async fn setup() -> (PatientService, MockServer) {
    let server = MockServer::start().await;
    let config = TestConfig::with_store_url(&server.uri()).to_app_config();
    (PatientService::new(&config), server)
}

#[tokio::test]
async fn register_creates_user() {
    let (service, server) = setup().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!({
            "name": "Jane Doe",
            "email": "jane.doe@example.com"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([patient_json(
            id,
            "jane.doe@example.com",
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g"
        )])))
        .mount(&server)
        .await;

    let patient = service
        .register(RegisterRequest {
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            password: "longenough".to_string(),
        })
        .await
        .expect("registration should succeed");

    assert_eq!(patient.id, id);
}

#[tokio::test]
async fn register_rejects_existing_email() {
    let (service, server) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([patient_json(
            Uuid::new_v4(),
            "jane.doe@example.com",
            "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g"
        )])))
        .mount(&server)
        .await;

    let err = service
        .register(RegisterRequest {
            name: "Jane Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            password: "longenough".to_string(),
        })
        .await
        .unwrap_err();

    assert_matches!(err, PatientError::EmailExists);
}

#[tokio::test]
async fn authenticate_round_trip() {
    let (service, server) = setup().await;
    let hash = hash_password("longenough").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([patient_json(
            Uuid::new_v4(),
            "jane.doe@example.com",
            &hash
        )])))
        .mount(&server)
        .await;

    assert!(service
        .authenticate("jane.doe@example.com", "longenough")
        .await
        .is_ok());

    let err = service
        .authenticate("jane.doe@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert_matches!(err, PatientError::InvalidCredentials);
}

#[tokio::test]
async fn update_profile_normalizes_dob() {
    let (service, server) = setup().await;
    let id = Uuid::new_v4();
    let hash = hash_password("longenough").unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([patient_json(
            id,
            "jane.doe@example.com",
            &hash
        )])))
        .mount(&server)
        .await;

    // The legacy DD-MM-YYYY form value must be stored as YYYY-MM-DD.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!({ "dob": "1990-07-21" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([patient_json(
            id,
            "jane.doe@example.com",
            &hash
        )])))
        .mount(&server)
        .await;

    let result = service
        .update_profile(
            id,
            UpdateProfileRequest {
                name: Some("Jane Doe".to_string()),
                phone: Some("5551234567".to_string()),
                address: None,
                dob: Some("21-07-1990".to_string()),
                gender: Some("female".to_string()),
                image: None,
            },
        )
        .await;

    assert!(result.is_ok());
}
