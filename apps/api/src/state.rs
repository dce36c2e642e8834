use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationClient;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: GenerationClient,
    /// Job description and candidate list per session id.
    pub sessions: Arc<SessionStore>,
    pub config: Config,
}
