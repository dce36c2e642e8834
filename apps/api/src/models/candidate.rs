use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NO_REMARKS: &str = "No remarks provided.";
pub const PROCESSING_ERROR_REMARKS: &str = "Error processing AI response.";
pub const MISSING_SKILLS_PLACEHOLDER: &str = "N/A";

/// Whether the score came from the model or stands in for a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CandidateStatus {
    Evaluated,
    Failed { reason: String },
}

/// The evaluation record for one submitted resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub filename: String,
    pub score: i64,
    pub missing_skills: Vec<String>,
    pub remarks: String,
    pub status: CandidateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Candidate {
    pub fn evaluated(
        filename: impl Into<String>,
        score: i64,
        missing_skills: Vec<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            score,
            missing_skills,
            remarks: remarks.into(),
            status: CandidateStatus::Evaluated,
            email: None,
        }
    }

    /// Zero-score placeholder for a resume the model could not evaluate.
    pub fn failed(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            score: 0,
            missing_skills: vec![MISSING_SKILLS_PLACEHOLDER.to_string()],
            remarks: PROCESSING_ERROR_REMARKS.to_string(),
            status: CandidateStatus::Failed {
                reason: reason.into(),
            },
            email: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, CandidateStatus::Failed { .. })
    }
}
