use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockStoreResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config))
}

fn documents_path() -> String {
    "/v1/databases/test-db/collections/appointments/documents".to_string()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

fn admin_token(config: &TestConfig) -> String {
    let admin = TestUser::admin("admin@clinic.test");
    JwtTestUtils::create_test_token(&admin, &config.jwt_secret, Some(1))
}

fn transition_request(to: &str) -> Body {
    Body::from(json!({ "status": to }).to_string())
}

#[tokio::test]
async fn test_create_appointment_lands_pending() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&mock_server.uri(), "http://localhost:0");

    Mock::given(method("POST"))
        .and(path(documents_path()))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "pending"),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config.to_app_config());

    let request_body = json!({
        "patient_name": "Test Patient",
        "email": "patient@example.com",
        "scheduled_at": "2025-06-02T10:30:00Z",
        "notes": "Toothache"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Content-Type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["appointment"]["status"], "pending");
    assert_eq!(body["appointment"]["patient_name"], "Test Patient");
}

#[tokio::test]
async fn test_create_appointment_rejects_bad_email_without_writing() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&mock_server.uri(), "http://localhost:0");

    Mock::given(method("POST"))
        .and(path(documents_path()))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config.to_app_config());

    let request_body = json!({
        "patient_name": "Test Patient",
        "email": "not-an-email",
        "scheduled_at": "2025-06-02T10:30:00Z"
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("Content-Type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transition_confirms_and_notifies() {
    let store_server = MockServer::start().await;
    let mail_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), &mail_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "pending"),
        ))
        .mount(&store_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "confirmed"),
        ))
        .expect(1)
        .mount(&store_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&mail_server)
        .await;

    let app = create_test_app(config.to_app_config());
    let token = admin_token(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/apt-1/transition")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(transition_request("confirmed"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["appointment"]["status"], "confirmed");
    assert_eq!(body["notified"], true);
    assert_eq!(body["notification_error"], Value::Null);
}

#[tokio::test]
async fn test_transition_reports_partial_success_when_notifier_fails() {
    let store_server = MockServer::start().await;
    let mail_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), &mail_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "pending"),
        ))
        .mount(&store_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "confirmed"),
        ))
        .expect(1)
        .mount(&store_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "SMTP relay down" })),
        )
        .mount(&mail_server)
        .await;

    let app = create_test_app(config.to_app_config());
    let token = admin_token(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/apt-1/transition")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(transition_request("confirmed"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Status change stands; the failed notification is reported, not raised.
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["appointment"]["status"], "confirmed");
    assert_eq!(body["notified"], false);
    assert!(body["notification_error"]
        .as_str()
        .unwrap()
        .contains("SMTP relay down"));
}

#[tokio::test]
async fn test_transition_rejects_already_confirmed() {
    let store_server = MockServer::start().await;
    let mail_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), &mail_server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "confirmed"),
        ))
        .mount(&store_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&store_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mail_server)
        .await;

    let app = create_test_app(config.to_app_config());
    let token = admin_token(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/apt-1/transition")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(transition_request("confirmed"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_transition_to_pending_is_rejected() {
    let store_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), "http://localhost:0");

    Mock::given(method("GET"))
        .and(path(format!("{}/apt-1", documents_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::appointment_document("apt-1", "pending"),
        ))
        .mount(&store_server)
        .await;

    let app = create_test_app(config.to_app_config());
    let token = admin_token(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/apt-1/transition")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(transition_request("pending"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transition_unknown_appointment_returns_not_found() {
    let store_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), "http://localhost:0");

    Mock::given(method("GET"))
        .and(path(format!("{}/missing", documents_path())))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            MockStoreResponses::error_response("Document not found", 404),
        ))
        .mount(&store_server)
        .await;

    let app = create_test_app(config.to_app_config());
    let token = admin_token(&config);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/missing/transition")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(transition_request("confirmed"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_transition_requires_admin_role() {
    let store_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), "http://localhost:0");

    let patient = TestUser::patient("patient@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));

    let app = create_test_app(config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/apt-1/transition")
                .header("Authorization", format!("Bearer {}", token))
                .header("Content-Type", "application/json")
                .body(transition_request("confirmed"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_appointments_with_status_filter() {
    let store_server = MockServer::start().await;
    let config = TestConfig::with_mock_servers(&store_server.uri(), "http://localhost:0");

    Mock::given(method("GET"))
        .and(path(documents_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockStoreResponses::document_list(vec![
                MockStoreResponses::appointment_document("apt-1", "pending"),
            ]),
        ))
        .mount(&store_server)
        .await;

    let app = create_test_app(config.to_app_config());
    let token = admin_token(&config);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/?status=pending")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["appointments"][0]["status"], "pending");
}
