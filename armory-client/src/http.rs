use armory_core::{EntityId, Resource};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::backend::{Backend, PhotoFile};
use crate::convert::{extract_detail, parse_upload_path};
use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "admin/api/v1";

/// Backend reached over HTTP.
///
/// Resource URLs are `<base_url>/<api_prefix>/<resource>`; photo URLs are
/// `<base_url>/<stored path>`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    api_prefix: String,
}

impl HttpBackend {
    /// Creates a backend for the given origin with the default API prefix.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_prefix(base_url, DEFAULT_API_PREFIX)
    }

    /// Creates a backend with a custom API prefix.
    pub fn with_prefix(base_url: impl Into<String>, api_prefix: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_prefix: api_prefix.into().trim_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, tail: &str) -> String {
        if self.api_prefix.is_empty() {
            format!("{}/{}", self.base_url, tail)
        } else {
            format!("{}/{}/{}", self.base_url, self.api_prefix, tail)
        }
    }

    pub fn collection_url(&self, resource: Resource) -> String {
        self.api_url(resource.path())
    }

    pub fn entity_url(&self, resource: Resource, id: EntityId) -> String {
        self.api_url(&format!("{}/{}", resource.path(), id))
    }

    pub fn upload_url(&self) -> String {
        self.api_url("upload")
    }

    /// Sends a request and returns the JSON body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| extract_detail(&body));
            debug!(status = status.as_u16(), ?detail, "Request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Backend for HttpBackend {
    #[instrument(skip(self), fields(url = %self.collection_url(resource)))]
    async fn list(&self, resource: Resource) -> Result<Vec<Value>, ClientError> {
        debug!("Fetching collection");
        let body = self.send(self.http.get(self.collection_url(resource))).await?;
        match body {
            Value::Array(entities) => Ok(entities),
            other => Err(ClientError::MalformedResponse(format!(
                "expected an array of {}, got {}",
                resource,
                json_kind(&other)
            ))),
        }
    }

    #[instrument(skip(self, payload), fields(url = %self.collection_url(resource)))]
    async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, ClientError> {
        debug!("Creating entity");
        self.send(self.http.post(self.collection_url(resource)).json(payload))
            .await
    }

    #[instrument(skip(self, payload), fields(url = %self.entity_url(resource, id)))]
    async fn update(
        &self,
        resource: Resource,
        id: EntityId,
        payload: &Value,
    ) -> Result<Value, ClientError> {
        debug!("Updating entity");
        self.send(self.http.put(self.entity_url(resource, id)).json(payload))
            .await
    }

    #[instrument(skip(self), fields(url = %self.entity_url(resource, id)))]
    async fn delete(&self, resource: Resource, id: EntityId) -> Result<(), ClientError> {
        debug!("Deleting entity");
        self.send(self.http.delete(self.entity_url(resource, id)))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, photo), fields(file = %photo.file_name, size = photo.bytes.len()))]
    async fn upload(&self, photo: PhotoFile) -> Result<String, ClientError> {
        debug!("Uploading photo");
        let part = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(photo.mime_type)?;
        let form = Form::new().part("file", part);

        let body = self.send(self.http.post(self.upload_url()).multipart(form)).await?;
        parse_upload_path(&body)
            .ok_or_else(|| ClientError::MalformedResponse("upload response has no path".to_string()))
    }

    fn photo_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        let backend = HttpBackend::default();
        assert_eq!(backend.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            backend.collection_url(Resource::Categories),
            "http://localhost:8000/admin/api/v1/categories"
        );
    }

    #[test]
    fn test_urls_normalize_slashes() {
        let backend = HttpBackend::with_prefix("http://194.87.102.3/api/", "/admin/api/v1/");
        assert_eq!(
            backend.entity_url(Resource::Weapons, 12),
            "http://194.87.102.3/api/admin/api/v1/weapons/12"
        );
        assert_eq!(
            backend.upload_url(),
            "http://194.87.102.3/api/admin/api/v1/upload"
        );
        assert_eq!(
            backend.photo_url("/uploads/awp.png"),
            "http://194.87.102.3/api/uploads/awp.png"
        );
    }

    #[test]
    fn test_empty_prefix() {
        let backend = HttpBackend::with_prefix("http://localhost:9000", "");
        assert_eq!(backend.collection_url(Resource::Types), "http://localhost:9000/types");
    }

    #[tokio::test]
    #[ignore = "requires a running backend at ARMORY_BASE_URL"]
    async fn test_live_list() {
        let base_url = std::env::var("ARMORY_BASE_URL").expect("ARMORY_BASE_URL not set");
        let backend = HttpBackend::new(base_url);
        let categories = backend.list(Resource::Categories).await;
        assert!(categories.is_ok());
    }
}
