use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

pub struct AppwriteClient {
    client: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct DocumentList {
    pub total: i64,
    pub documents: Vec<Value>,
}

impl AppwriteClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.appwrite_endpoint.clone(),
            project_id: config.appwrite_project_id.clone(),
            api_key: config.appwrite_api_key.clone(),
            database_id: config.appwrite_database_id.clone(),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("X-Appwrite-Project", HeaderValue::from_str(&self.project_id).unwrap());
        headers.insert("X-Appwrite-Key", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        headers
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
        let url = format!("{}{}", self.endpoint, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        Ok(req.send().await?)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T>
    where T: DeserializeOwned {
        let response = self.send(method, path, body).await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Appwrite error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Appwrite error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn documents_path(&self, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.database_id, collection_id
        )
    }

    pub async fn list_documents(&self, collection_id: &str, queries: &[String]) -> Result<Vec<Value>> {
        let mut path = self.documents_path(collection_id);

        for (i, query) in queries.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            path.push_str(&format!("{}queries[]={}", sep, urlencoding::encode(query)));
        }

        let list: DocumentList = self.request(Method::GET, &path, None).await?;
        Ok(list.documents)
    }

    /// Fetch a single document; a missing id is `None`, not an error.
    pub async fn get_document(&self, collection_id: &str, document_id: &str) -> Result<Option<Value>> {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        let response = self.send(Method::GET, &path, None).await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Appwrite error ({}): {}", status, error_text);
            return Err(anyhow!("Appwrite error ({}): {}", status, error_text));
        }

        Ok(Some(response.json::<Value>().await?))
    }

    pub async fn create_document(&self, collection_id: &str, data: Value) -> Result<Value> {
        let body = json!({
            "documentId": "unique()",
            "data": data
        });

        self.request(Method::POST, &self.documents_path(collection_id), Some(body)).await
    }

    pub async fn update_document(&self, collection_id: &str, document_id: &str, data: Value) -> Result<Value> {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        let body = json!({ "data": data });

        self.request(Method::PATCH, &path, Some(body)).await
    }

    pub async fn delete_document(&self, collection_id: &str, document_id: &str) -> Result<()> {
        let path = format!("{}/{}", self.documents_path(collection_id), document_id);
        let response = self.send(Method::DELETE, &path, None).await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Appwrite error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("Appwrite error ({}): {}", status, error_text),
            });
        }

        Ok(())
    }
}

/// Query-string builders for the document listing endpoint.
pub mod queries {
    use serde_json::json;

    pub fn order_asc(attribute: &str) -> String {
        json!({ "method": "orderAsc", "attribute": attribute, "values": [] }).to_string()
    }

    pub fn order_desc(attribute: &str) -> String {
        json!({ "method": "orderDesc", "attribute": attribute, "values": [] }).to_string()
    }

    pub fn equal(attribute: &str, value: &str) -> String {
        json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
    }
}
