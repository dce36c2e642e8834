//! Job description generation from structured role fields.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{Generation, GenerationClient};
use crate::models::job::JobDescriptionInput;
use crate::screening::prompts::{fill_template, JD_GENERATION_PROMPT_TEMPLATE};

pub fn job_description_prompt(input: &JobDescriptionInput) -> String {
    fill_template(
        JD_GENERATION_PROMPT_TEMPLATE,
        &[
            ("job_title", input.job_title.as_str()),
            ("experience", input.experience.as_str()),
            ("skills", input.skills.as_str()),
            ("company_name", input.company_name.as_str()),
            ("employment_type", input.employment_type.as_str()),
            ("industry", input.industry.as_str()),
            ("location", input.location.as_str()),
        ],
    )
}

/// Generates a job description. A failed call is an error here: there is no
/// sensible text to store in its place.
pub async fn write_job_description(
    input: &JobDescriptionInput,
    llm: &GenerationClient,
) -> Result<String, AppError> {
    info!("Generating job description for '{}'", input.job_title);
    match llm.generate_text(&job_description_prompt(input)).await {
        Generation::Ready(text) if !text.trim().is_empty() => Ok(text),
        Generation::Ready(_) => Err(AppError::Llm(
            "Job description generation returned empty text".to_string(),
        )),
        Generation::Failed { reason } => Err(AppError::Llm(format!(
            "Job description generation failed: {reason}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::testing::FakeModel;
    use crate::llm_client::LlmError;

    fn sample_input() -> JobDescriptionInput {
        JobDescriptionInput {
            job_title: "Platform Engineer".into(),
            experience: "5+".into(),
            skills: "Rust, Kubernetes".into(),
            company_name: "Acme".into(),
            employment_type: "Full-time".into(),
            industry: "Fintech".into(),
            location: "Remote".into(),
        }
    }

    #[test]
    fn test_prompt_lists_every_field() {
        let prompt = job_description_prompt(&sample_input());
        for expected in [
            "Job Title: Platform Engineer",
            "Years of Experience: 5+",
            "Must-have Skills: Rust, Kubernetes",
            "Company Name: Acme",
            "Employment Type: Full-time",
            "Industry: Fintech",
            "Location: Remote",
        ] {
            assert!(prompt.contains(expected), "missing '{expected}'");
        }
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_placeholder_in_field_is_not_expanded() {
        let input = JobDescriptionInput {
            job_title: "Writer of {skills} docs".into(),
            ..sample_input()
        };
        let prompt = job_description_prompt(&input);
        assert!(prompt.contains("Job Title: Writer of {skills} docs\n"));
        assert!(prompt.contains("Must-have Skills: Rust, Kubernetes\n"));
    }

    #[tokio::test]
    async fn test_generated_text_is_returned() {
        let model = Arc::new(FakeModel::new(|_| Ok("We are hiring...".to_string())));
        let llm = GenerationClient::new(model.clone());
        let jd = write_job_description(&sample_input(), &llm).await.unwrap();
        assert_eq!(jd, "We are hiring...");
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_surfaces_as_llm_error() {
        let llm = GenerationClient::new(Arc::new(FakeModel::new(|_| Err(LlmError::EmptyContent))));
        let err = write_job_description(&sample_input(), &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
