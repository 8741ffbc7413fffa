use crate::models::Pantry;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Documents requested per page when listing pantries
const PAGE_SIZE: usize = 100;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or project")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client for the pantries collection
///
/// Pantry records are owned by the administrative tools that write them;
/// this client only reads.
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    pantries_collection: String,
    client: Client,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        pantries_collection: String,
    ) -> Result<Self, AppwriteError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            pantries_collection,
            client,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.pantries_collection
        )
    }

    /// Fetch every pantry, paging through the collection
    ///
    /// Documents that do not parse as pantries are skipped and logged.
    pub async fn list_pantries(&self) -> Result<Vec<Pantry>, AppwriteError> {
        let mut pantries = Vec::new();
        let mut offset = 0usize;

        loop {
            let queries = [format!("limit({})", PAGE_SIZE), format!("offset({})", offset)];
            let query_string = queries
                .iter()
                .map(|q| format!("queries[]={}", urlencoding::encode(q)))
                .collect::<Vec<_>>()
                .join("&");
            let url = format!("{}?{}", self.documents_url(), query_string);

            tracing::debug!("Fetching pantries from: {}", url);

            let json = self.get_json(&url).await?;

            let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0) as usize;
            let documents = json
                .get("documents")
                .and_then(|d| d.as_array())
                .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

            let page_len = documents.len();
            pantries.extend(documents.iter().filter_map(|doc| match parse_document(doc) {
                Ok(pantry) => Some(pantry),
                Err(e) => {
                    tracing::warn!("Skipping malformed pantry document: {}", e);
                    None
                }
            }));

            offset += page_len;
            if page_len < PAGE_SIZE || offset >= total {
                break;
            }
        }

        tracing::debug!("Fetched {} pantries", pantries.len());

        Ok(pantries)
    }

    /// Get a single pantry by document ID
    pub async fn get_pantry(&self, pantry_id: &str) -> Result<Option<Pantry>, AppwriteError> {
        let url = format!("{}/{}", self.documents_url(), urlencoding::encode(pantry_id));

        tracing::debug!("Fetching pantry: {}", pantry_id);

        let response = self.send(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let json = Self::check(response).await?;
        parse_document(&json).map(Some)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, AppwriteError> {
        let response = self
            .client
            .get(url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;
        Ok(response)
    }

    async fn get_json(&self, url: &str) -> Result<Value, AppwriteError> {
        let response = self.send(url).await?;
        Self::check(response).await
    }

    async fn check(response: reqwest::Response) -> Result<Value, AppwriteError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppwriteError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Appwrite request failed: {} - {}", status, body);
            return Err(AppwriteError::ApiError(format!("Request failed: {}", status)));
        }

        Ok(response.json().await?)
    }
}

/// Convert an Appwrite document into a pantry
///
/// The record id falls back to the document's `$id`, and a schedule stored
/// as a JSON string attribute is decoded in place.
pub fn parse_document(doc: &Value) -> Result<Pantry, AppwriteError> {
    let mut data = doc.get("data").unwrap_or(doc).clone();

    let object = data
        .as_object_mut()
        .ok_or_else(|| AppwriteError::InvalidResponse("Document is not an object".into()))?;

    if !object.contains_key("id") {
        if let Some(id) = doc.get("$id").cloned() {
            object.insert("id".to_string(), id);
        }
    }

    if let Some(Value::String(raw)) = object.get("schedule") {
        let schedule: Value = serde_json::from_str(raw)
            .map_err(|e| AppwriteError::InvalidResponse(format!("Invalid schedule attribute: {}", e)))?;
        object.insert("schedule".to_string(), schedule);
    }

    serde_json::from_value(data)
        .map_err(|e| AppwriteError::InvalidResponse(format!("Failed to parse pantry: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use serde_json::json;

    #[test]
    fn test_documents_url() {
        let client = AppwriteClient::new(
            "https://appwrite.test/v1/".to_string(),
            "test_key".to_string(),
            "test_project".to_string(),
            "test_db".to_string(),
            "pantries".to_string(),
        )
        .unwrap();

        assert_eq!(
            client.documents_url(),
            "https://appwrite.test/v1/databases/test_db/collections/pantries/documents"
        );
    }

    #[test]
    fn test_parse_document_with_string_schedule() {
        let doc = json!({
            "$id": "doc-1",
            "name": "Eastside Pantry",
            "latitude": 40.0,
            "longitude": -74.0,
            "schedule": "{\"tuesday\": {\"open\": \"10:00\", \"close\": \"14:00\"}}",
            "categories": ["Produce"]
        });

        let pantry = parse_document(&doc).unwrap();

        assert_eq!(pantry.id, "doc-1");
        assert!(pantry.schedule.has_hours_on(Weekday::Tue));
    }

    #[test]
    fn test_parse_document_rejects_missing_location() {
        let doc = json!({ "$id": "doc-2", "name": "Nowhere" });
        assert!(matches!(parse_document(&doc), Err(AppwriteError::InvalidResponse(_))));
    }
}
