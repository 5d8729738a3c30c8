use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub appwrite_endpoint: String,
    pub appwrite_project_id: String,
    pub appwrite_api_key: String,
    pub appwrite_database_id: String,
    pub mail_endpoint: String,
    pub mail_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            appwrite_endpoint: "http://localhost:48080/v1".to_string(),
            appwrite_project_id: "test-project".to_string(),
            appwrite_api_key: "test-api-key".to_string(),
            appwrite_database_id: "test-db".to_string(),
            mail_endpoint: "http://localhost:48081/notify".to_string(),
            mail_api_key: "test-mail-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the store and mailer at wiremock servers.
    pub fn with_mock_servers(store_url: &str, mail_url: &str) -> Self {
        Self {
            appwrite_endpoint: format!("{}/v1", store_url),
            mail_endpoint: format!("{}/notify", mail_url),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            appwrite_endpoint: self.appwrite_endpoint.clone(),
            appwrite_project_id: self.appwrite_project_id.clone(),
            appwrite_api_key: self.appwrite_api_key.clone(),
            appwrite_database_id: self.appwrite_database_id.clone(),
            session_jwt_secret: self.jwt_secret.clone(),
            mail_endpoint: self.mail_endpoint.clone(),
            mail_api_key: self.mail_api_key.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "admin".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            name: None,
            role: Some(self.role.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    /// Wrap documents in the store's listing envelope.
    pub fn document_list(documents: Vec<serde_json::Value>) -> serde_json::Value {
        json!({
            "total": documents.len(),
            "documents": documents
        })
    }

    pub fn appointment_document(id: &str, status: &str) -> serde_json::Value {
        json!({
            "$id": id,
            "$createdAt": "2025-01-01T00:00:00.000+00:00",
            "$updatedAt": "2025-01-01T00:00:00.000+00:00",
            "title": "Test Patient",
            "email": "patient@example.com",
            "date": "2025-06-02T10:30:00.000+00:00",
            "notes": "Toothache",
            "status": status
        })
    }

    pub fn schedule_document(id: &str, name: &str, priority: i32) -> serde_json::Value {
        json!({
            "$id": id,
            "$createdAt": "2025-01-01T00:00:00.000+00:00",
            "$updatedAt": "2025-01-01T00:00:00.000+00:00",
            "name": name,
            "startDate": "2025-12-24T00:00:00.000+00:00",
            "endDate": "2026-01-01T00:00:00.000+00:00",
            "config": serde_json::to_string(&json!({
                "Monday":    { "open": "10:00", "close": "14:00", "active": true },
                "Tuesday":   { "open": "10:00", "close": "14:00", "active": true },
                "Wednesday": { "open": "10:00", "close": "14:00", "active": true },
                "Thursday":  { "open": "10:00", "close": "14:00", "active": true },
                "Friday":    { "open": "10:00", "close": "14:00", "active": true },
                "Saturday":  { "open": "00:00", "close": "00:00", "active": false },
                "Sunday":    { "open": "10:00", "close": "14:00", "active": true }
            })).unwrap(),
            "priority": priority
        })
    }

    pub fn error_response(message: &str, code: u16) -> serde_json::Value {
        json!({
            "message": message,
            "code": code,
            "type": "general_error"
        })
    }
}
