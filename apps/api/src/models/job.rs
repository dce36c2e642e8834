use serde::{Deserialize, Serialize};

/// Structured fields used to generate a job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionInput {
    pub job_title: String,
    pub experience: String,
    pub skills: String,
    pub company_name: String,
    pub employment_type: String,
    pub industry: String,
    pub location: String,
}

impl JobDescriptionInput {
    /// Generation needs at least a title and skills; the rest may be blank.
    pub fn has_required_fields(&self) -> bool {
        !self.job_title.trim().is_empty() && !self.skills.trim().is_empty()
    }
}

/// Where the session's job description came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobDescriptionSource {
    Upload,
    Text,
    Generated,
}
