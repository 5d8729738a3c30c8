use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub appwrite_endpoint: String,
    pub appwrite_project_id: String,
    pub appwrite_api_key: String,
    pub appwrite_database_id: String,
    pub session_jwt_secret: String,
    pub mail_endpoint: String,
    pub mail_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            appwrite_endpoint: env::var("APPWRITE_ENDPOINT")
                .unwrap_or_else(|_| {
                    warn!("APPWRITE_ENDPOINT not set, using default");
                    "https://cloud.appwrite.io/v1".to_string()
                }),
            appwrite_project_id: env::var("APPWRITE_PROJECT_ID")
                .unwrap_or_else(|_| {
                    warn!("APPWRITE_PROJECT_ID not set, using empty value");
                    String::new()
                }),
            appwrite_api_key: env::var("APPWRITE_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("APPWRITE_API_KEY not set, using empty value");
                    String::new()
                }),
            appwrite_database_id: env::var("APPWRITE_DATABASE_ID")
                .unwrap_or_else(|_| {
                    warn!("APPWRITE_DATABASE_ID not set, using empty value");
                    String::new()
                }),
            session_jwt_secret: env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            mail_endpoint: env::var("MAIL_ENDPOINT")
                .unwrap_or_else(|_| {
                    warn!("MAIL_ENDPOINT not set, using empty value");
                    String::new()
                }),
            mail_api_key: env::var("MAIL_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("MAIL_API_KEY not set, using empty value");
                    String::new()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.appwrite_endpoint.is_empty()
            && !self.appwrite_project_id.is_empty()
            && !self.appwrite_api_key.is_empty()
            && !self.appwrite_database_id.is_empty()
            && !self.session_jwt_secret.is_empty()
    }

    pub fn is_mailer_configured(&self) -> bool {
        !self.mail_endpoint.is_empty() && !self.mail_api_key.is_empty()
    }
}
