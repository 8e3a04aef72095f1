use axum::extract::{Json, State};

use admin_cell::handlers::{login, AdminLoginRequest};
use shared_models::auth::AuthRole;
use shared_utils::extractor::resolve_identity;
use shared_utils::test_utils::TestConfig;

#[tokio::test]
async fn login_with_configured_credentials_issues_admin_token() {
    let test_config = TestConfig::default();
    let state = test_config.to_arc();

    let response = login(
        State(state.clone()),
        Json(AdminLoginRequest {
            email: test_config.admin_email.clone(),
            password: test_config.admin_password.clone(),
        }),
    )
    .await
    .expect("login should succeed");

    let body = response.0;
    assert_eq!(body["success"], true);

    let token = body["token"].as_str().expect("token present");
    let identity = resolve_identity(token, &state, AuthRole::Admin).expect("token resolves");
    assert_eq!(identity.subject, test_config.admin_email);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let test_config = TestConfig::default();
    let state = test_config.to_arc();

    let result = login(
        State(state),
        Json(AdminLoginRequest {
            email: test_config.admin_email.clone(),
            password: "not-the-password".to_string(),
        }),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn login_with_unknown_email_fails() {
    let test_config = TestConfig::default();
    let state = test_config.to_arc();

    let result = login(
        State(state),
        Json(AdminLoginRequest {
            email: "intruder@example.com".to_string(),
            password: test_config.admin_password.clone(),
        }),
    )
    .await;

    assert!(result.is_err());
}
