use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::{AppError, EntityId};

// ==============================================================================
// QUERIES
// ==============================================================================

/// Identifies one consultation's recording: who, with whom, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingQuery {
    pub user_id: EntityId,
    pub doctor_id: EntityId,
    pub date: NaiveDate,
}

impl RecordingQuery {
    pub fn new(user_id: EntityId, doctor_id: EntityId, date: NaiveDate) -> Self {
        Self {
            user_id,
            doctor_id,
            date,
        }
    }

    pub fn to_query_string(&self) -> String {
        format!(
            "user_id={}&doctor_id={}&date={}",
            urlencoding::encode(self.user_id.as_str()),
            urlencoding::encode(self.doctor_id.as_str()),
            self.date.format("%Y-%m-%d")
        )
    }
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AudioExistsResponse {
    #[serde(default)]
    pub exists: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatestSummaryResponse {
    pub url: String,
}

// ==============================================================================
// ERROR HANDLING
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Transcript service not configured")]
    NotConfigured,

    #[error("Transcript not found")]
    NotFound,

    #[error("Transcript service returned an empty file")]
    EmptyFile,

    #[error("Transcript service error: {0}")]
    Api(AppError),
}

impl From<AppError> for TranscriptError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound(_) => TranscriptError::NotFound,
            other => TranscriptError::Api(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_query_string_encodes_ids() {
        let query = RecordingQuery::new(
            EntityId::from("user 1"),
            EntityId::from("42"),
            NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
        );
        assert_eq!(
            query.to_query_string(),
            "user_id=user%201&doctor_id=42&date=2026-10-05"
        );
    }

    #[test]
    fn test_not_found_is_mapped() {
        let err = TranscriptError::from(AppError::NotFound("missing".into()));
        assert_matches!(err, TranscriptError::NotFound);

        let err = TranscriptError::from(AppError::Auth("nope".into()));
        assert_matches!(err, TranscriptError::Api(AppError::Auth(_)));
    }
}
