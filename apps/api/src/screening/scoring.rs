//! Scoring pipeline: one evaluation call per resume, then a stable rank by score.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::llm_client::{Generation, GenerationClient};
use crate::models::candidate::{Candidate, NO_REMARKS};
use crate::screening::map_bounded;
use crate::screening::prompts::evaluation_prompt;

/// A resume reduced to its filename and extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeText {
    pub filename: String,
    pub text: String,
}

/// Scores every resume against `jd_text` and returns the candidates ranked by
/// score, highest first. Always returns one candidate per resume.
pub async fn score_resumes(
    jd_text: &str,
    resumes: Vec<ResumeText>,
    llm: &GenerationClient,
    concurrency: usize,
) -> Vec<Candidate> {
    let jd_text: Arc<str> = Arc::from(jd_text);
    let filenames: Vec<String> = resumes.iter().map(|r| r.filename.clone()).collect();

    let results = map_bounded(resumes, concurrency, |resume| {
        let llm = llm.clone();
        let jd_text = jd_text.clone();
        async move {
            let prompt = evaluation_prompt(&jd_text, &resume.text);
            let reply = llm.generate_json(&prompt).await;
            candidate_from_reply(resume.filename, reply)
        }
    })
    .await;

    let mut candidates: Vec<Candidate> = results
        .into_iter()
        .zip(filenames)
        .map(|(candidate, filename)| {
            candidate.unwrap_or_else(|| Candidate::failed(filename, "evaluation task aborted"))
        })
        .collect();

    rank(&mut candidates);

    let failed = candidates.iter().filter(|c| c.is_failed()).count();
    info!(
        "Scored {} resumes ({} failed evaluation)",
        candidates.len(),
        failed
    );

    candidates
}

/// Sorts by score descending. `sort_by` is stable, so ties keep submission order.
pub fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Maps one model reply onto a candidate record.
pub fn candidate_from_reply(filename: String, reply: Generation<Value>) -> Candidate {
    match reply {
        Generation::Ready(Value::Object(fields)) if !fields.is_empty() => {
            candidate_from_fields(filename, &fields)
        }
        Generation::Ready(Value::Object(_)) => {
            warn!("Empty evaluation object for {filename}");
            Candidate::failed(filename, "model returned an empty evaluation")
        }
        Generation::Ready(other) => {
            warn!("Evaluation for {filename} was not a JSON object: {other}");
            Candidate::failed(filename, "model reply was not a JSON object")
        }
        Generation::Failed { reason } => Candidate::failed(filename, reason),
    }
}

fn candidate_from_fields(filename: String, fields: &Map<String, Value>) -> Candidate {
    let score = fields.get("score").and_then(score_from_value).unwrap_or(0);

    let missing_skills = match fields.get("missing_skills") {
        Some(Value::Array(items)) => items.iter().filter_map(skill_from_value).collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    };

    let remarks = match fields.get("remarks") {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => NO_REMARKS.to_string(),
        Some(other) => other.to_string(),
    };

    Candidate::evaluated(filename, score, missing_skills, remarks)
}

/// Accepts integers, floats (truncated) and numeric strings.
fn score_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn skill_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
