//! Typed endpoint surface and error normalization, over real HTTP.

use secrecy::SecretString;

use eventaic_client::auth::RegisterRequest;
use eventaic_client::{ApiError, EventaicClient};
use eventaic_core::AdStatus;
use eventaic_integration_tests::{MockBackend, USER_EMAIL, VALID_PASSWORD, client_for};

async fn logged_in_client(backend: &MockBackend) -> EventaicClient {
    let client = client_for(backend);
    client
        .login(USER_EMAIL, &SecretString::from(VALID_PASSWORD))
        .await
        .expect("login succeeds");
    client
}

#[tokio::test]
async fn list_ads_deserializes_page() {
    let backend = MockBackend::start().await;
    let client = logged_in_client(&backend).await;

    let page = client.list_ads(&Default::default()).await.expect("list ads");
    assert_eq!(page.total, 1);
    assert_eq!(page.ads.len(), 1);

    let ad = page.ads.first().expect("one ad");
    assert_eq!(ad.event_name, "Black Friday");
    assert_eq!(ad.status, AdStatus::Generated);
    assert_eq!(ad.content.headline, "Half Price Everything");
    assert!(ad.evaluation_score.is_none());
}

#[tokio::test]
async fn delete_ad_accepts_no_content() {
    let backend = MockBackend::start().await;
    let client = logged_in_client(&backend).await;

    let ad_id = "770e8400-e29b-41d4-a716-446655440000"
        .parse()
        .expect("valid id");
    client.delete_ad(ad_id).await.expect("delete succeeds");
}

#[tokio::test]
async fn invalid_credentials_surface_server_detail() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);

    let err = client
        .login(USER_EMAIL, &SecretString::from("wrong"))
        .await
        .expect_err("bad password");
    match err {
        ApiError::RequestFailed { status: 401, message } => {
            assert_eq!(message, "Incorrect username/email or password");
        }
        other => panic!("expected RequestFailed(401), got {other:?}"),
    }
    // A failed login stores nothing.
    assert!(client.token().is_none());
}

#[tokio::test]
async fn field_errors_join_into_validation_message() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);

    let err = client
        .register(&RegisterRequest {
            email: "new@b.com".to_string(),
            username: "newbie".to_string(),
            password: SecretString::from("weakpass"),
            full_name: None,
            company_name: None,
            phone: None,
        })
        .await
        .expect_err("weak password");
    match err {
        ApiError::Validation(message) => {
            assert_eq!(message, "password: Password must contain at least one digit");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_email_surfaces_as_request_failed() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);

    let err = client
        .register(&RegisterRequest {
            email: "taken@b.com".to_string(),
            username: "newbie".to_string(),
            password: SecretString::from(VALID_PASSWORD),
            full_name: None,
            company_name: None,
            phone: None,
        })
        .await
        .expect_err("email taken");
    match err {
        ApiError::RequestFailed { status: 400, message } => {
            assert_eq!(message, "Email already registered");
        }
        other => panic!("expected RequestFailed(400), got {other:?}"),
    }
}

#[tokio::test]
async fn register_persists_grant() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);

    client
        .register(&RegisterRequest {
            email: "new@b.com".to_string(),
            username: "newbie".to_string(),
            password: SecretString::from(VALID_PASSWORD),
            full_name: Some("New User".to_string()),
            company_name: Some("Initech".to_string()),
            phone: None,
        })
        .await
        .expect("registration succeeds");
    assert!(client.token().is_some());
    assert!(client.user().is_some());
}

#[tokio::test]
async fn me_syncs_stored_user_summary() {
    let backend = MockBackend::start().await;
    let client = logged_in_client(&backend).await;

    let profile = client.me().await.expect("me succeeds");
    assert_eq!(profile.email, USER_EMAIL);

    let stored = client.user().expect("summary synced");
    assert_eq!(stored.email, profile.email);
    assert_eq!(stored.username, profile.username);
}

#[tokio::test]
async fn logout_clears_locally_even_when_server_fails() {
    let backend = MockBackend::start().await;
    let client = logged_in_client(&backend).await;

    backend.state.fail_logout();
    client.logout().await;

    assert!(client.token().is_none());
    assert!(client.session().refresh_token().is_none());
    assert!(client.user().is_none());
}

#[tokio::test]
async fn logout_clears_session() {
    let backend = MockBackend::start().await;
    let client = logged_in_client(&backend).await;

    client.logout().await;
    assert!(client.token().is_none());
    assert!(client.user().is_none());

    // Idempotent: logging out again changes nothing.
    client.logout().await;
    assert!(client.token().is_none());
}
