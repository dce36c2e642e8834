//! Outcome emails: an interview invitation for the top-ranked candidate and a
//! rejection for everyone else. Texts are keyed by candidate id.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::llm_client::GenerationClient;
use crate::models::candidate::Candidate;
use crate::screening::map_bounded;
use crate::screening::prompts::{interview_prompt, rejection_prompt};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub candidate_id: Uuid,
    pub filename: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Notifications {
    pub interview: Option<Notification>,
    pub rejections: Vec<Notification>,
}

impl Notifications {
    pub fn interview_text(&self) -> Option<&str> {
        self.interview.as_ref().map(|n| n.text.as_str())
    }

    /// Rejection texts in ranked order, top candidate excluded.
    pub fn rejection_texts(&self) -> Vec<&str> {
        self.rejections.iter().map(|n| n.text.as_str()).collect()
    }
}

/// Composes one interview email for `ranked[0]` and one rejection per other
/// candidate. Failed generations carry an inline error notice as their text.
pub async fn compose(
    jd_text: &str,
    ranked: &[Candidate],
    llm: &GenerationClient,
    concurrency: usize,
) -> Notifications {
    let Some((top, rest)) = ranked.split_first() else {
        return Notifications::default();
    };

    let interview_text = llm
        .generate_text(&interview_prompt(jd_text, &top.filename))
        .await
        .into_text_or_notice();

    let jd_text: Arc<str> = Arc::from(jd_text);
    let targets: Vec<(Uuid, String)> = rest
        .iter()
        .map(|c| (c.id, c.filename.clone()))
        .collect();
    let fallback = targets.clone();

    let rejections = map_bounded(targets, concurrency, |(candidate_id, filename)| {
        let llm = llm.clone();
        let jd_text = jd_text.clone();
        async move {
            let text = llm
                .generate_text(&rejection_prompt(&jd_text, &filename))
                .await
                .into_text_or_notice();
            Notification {
                candidate_id,
                filename,
                text,
            }
        }
    })
    .await
    .into_iter()
    .zip(fallback)
    .map(|(notification, (candidate_id, filename))| {
        notification.unwrap_or_else(|| Notification {
            candidate_id,
            filename,
            text: "Error generating content: rejection task aborted".to_string(),
        })
    })
    .collect::<Vec<_>>();

    let notifications = Notifications {
        interview: Some(Notification {
            candidate_id: top.id,
            filename: top.filename.clone(),
            text: interview_text,
        }),
        rejections,
    };

    info!(
        "Composed interview email for {} and {} rejection emails",
        top.filename,
        notifications.rejection_texts().len()
    );
    debug!(
        "Interview email is {} chars",
        notifications.interview_text().map_or(0, str::len)
    );

    notifications
}

/// Sets each candidate's `email` from the notification carrying its id.
pub fn attach(candidates: &mut [Candidate], notifications: Notifications) {
    let mut by_id: HashMap<Uuid, String> = notifications
        .rejections
        .into_iter()
        .chain(notifications.interview)
        .map(|n| (n.candidate_id, n.text))
        .collect();

    for candidate in candidates.iter_mut() {
        if let Some(text) = by_id.remove(&candidate.id) {
            candidate.email = Some(text);
        }
    }
}
