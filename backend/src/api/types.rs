//! Review payload types.
//!
//! The review front end receives the annotated records as they come out of
//! the diff pass; flags are already bit-encoded on every field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{Food, Reference};
use crate::transform::pipeline::{BatchResult, BatchStats};

/// Batch status shown to the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Every record is valid
    Ready,
    /// Some fields need correcting before the batch can be committed
    Warning,
    Error,
}

/// Response sent to the review front end after a batch check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Unique job identifier
    pub job_id: String,

    pub status: ReviewStatus,

    /// RFC 3339 timestamp of the check
    pub generated_at: DateTime<Utc>,

    pub foods: Vec<Food>,

    pub references: Vec<Reference>,

    pub stats: BatchStats,
}

impl From<BatchResult> for ReviewResponse {
    fn from(result: BatchResult) -> Self {
        let status = if result.stats.all_valid() {
            ReviewStatus::Ready
        } else {
            ReviewStatus::Warning
        };

        ReviewResponse {
            job_id: Uuid::new_v4().to_string(),
            status,
            generated_at: Utc::now(),
            foods: result.foods,
            references: result.references,
            stats: result.stats,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": ReviewStatus::Error,
        "generatedAt": Utc::now().to_rfc3339(),
        "error": error,
        "foods": [],
        "references": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_result() -> BatchResult {
        BatchResult {
            foods: Vec::new(),
            references: Vec::new(),
            stats: BatchStats::default(),
        }
    }

    #[test]
    fn test_ready_response() {
        let response = ReviewResponse::from(empty_result());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "ready");
        assert!(Uuid::parse_str(value["jobId"].as_str().unwrap()).is_ok());
        assert!(DateTime::parse_from_rfc3339(value["generatedAt"].as_str().unwrap()).is_ok());
        assert_eq!(value["stats"]["skippedBlocks"], 0);
        assert_eq!(value["stats"]["foods"]["total"], 0);
    }

    #[test]
    fn test_warning_when_invalid() {
        let mut result = empty_result();
        result.stats.references.invalid = 2;

        let response = ReviewResponse::from(result);
        assert_eq!(response.status, ReviewStatus::Warning);
    }

    #[test]
    fn test_error_response() {
        let value = error_response("foods sheet has 12 columns, 64 required");

        assert_eq!(value["status"], "error");
        assert_eq!(value["foods"], json!([]));
        assert!(value["error"].as_str().unwrap().contains("64"));
    }
}
