// Screening workflow: job description intake, resume scoring, outcome emails.
// All generative calls go through llm_client::GenerationClient.

pub mod handlers;
pub mod jd_writer;
pub mod notifications;
pub mod prompts;
pub mod scoring;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

/// Runs `f` over `inputs` with at most `limit` futures in flight and returns
/// the outputs in input order. A slot is `None` if its task panicked.
pub(crate) async fn map_bounded<I, T, F, Fut>(inputs: Vec<I>, limit: usize, f: F) -> Vec<Option<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut slots: Vec<Option<T>> = inputs.iter().map(|_| None).collect();
    let mut set = JoinSet::new();

    for (index, input) in inputs.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let task = f(input);
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, task.await)
        });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, output)) => slots[index] = Some(output),
            Err(e) => error!("Screening task failed: {e}"),
        }
    }

    slots
}
