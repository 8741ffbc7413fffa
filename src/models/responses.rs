use serde::{Deserialize, Serialize};

use crate::models::domain::Pantry;
use crate::models::status::{PantryStatus, StatusBadge};

/// Pantry enriched with its current status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryView {
    #[serde(flatten)]
    pub pantry: Pantry,
    pub status: PantryStatus,
    pub status_text: String,
}

impl PantryView {
    pub fn new(pantry: Pantry, status: PantryStatus) -> Self {
        let status_text = status.status_text();
        Self {
            pantry,
            status,
            status_text,
        }
    }
}

/// Response for the pantry search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPantriesResponse {
    pub pantries: Vec<PantryView>,
    pub total_results: usize,
    pub total_candidates: usize,
    pub schedule_errors: usize,
}

/// Response for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryStatusResponse {
    pub pantry_id: String,
    pub status: PantryStatus,
    pub status_text: String,
    pub badge: StatusBadge,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub cached_entries: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Submit review response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewResponse {
    pub success: bool,
    pub review_id: String,
}
