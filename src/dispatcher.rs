//! # Bounded dispatcher
//!
//! Fans a batch of [`WordTask`]s out to a [`MachineTranslator`] and gathers one
//! [`TaskOutcome`] per task, in submission order.
//!
//! ## Rules
//! - An empty batch returns an empty list without touching the backend.
//! - A cohort larger than the policy's `queue_ceiling` is rejected whole with
//!   [`RelayError::Overloaded`] before any call starts.
//! - At most `max_concurrent` calls are in flight; starts are spaced at least
//!   `min_inter_service_gap` apart.
//! - A task that times out or fails resolves to an [`ErrorMarker`]; its
//!   siblings keep running.
//! - If the shutdown signal fires while tasks are still waiting to start, every
//!   running task is aborted and the cohort fails with `Overloaded`.
//!
//! All admission state (permits, pacing clock) belongs to one dispatcher
//! instance. Build a fresh dispatcher per request. Only the shutdown signal is
//! shared, see [`crate::TranslationRelay::shutdown`].

use crate::data::{ErrorMarker, TaskOutcome, WordTask};
use crate::error::{RelayError, RelayResult};
use crate::policy::AdmissionPolicy;
use crate::translator::MachineTranslator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Source language of every word handed to the backend
pub const SOURCE_LANGUAGE: &str = "en";

pub struct BoundedDispatcher {
    translator: Arc<dyn MachineTranslator>,
    policy: AdmissionPolicy,
    call_timeout: Duration,
    source_language: String,
    permits: Arc<Semaphore>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl BoundedDispatcher {
    pub fn new(
        translator: Arc<dyn MachineTranslator>,
        policy: AdmissionPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            translator,
            permits: Arc::new(Semaphore::new(policy.max_concurrent.max(1))),
            policy,
            call_timeout,
            source_language: SOURCE_LANGUAGE.to_string(),
            shutdown: None,
        }
    }

    pub fn with_source_language(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Fail a cohort that is still scheduling once `signal` turns `true`
    pub fn with_shutdown(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Resolves once shutdown was requested; never resolves without a signal
    async fn shutdown_requested(&self) {
        if let Some(signal) = &self.shutdown {
            let mut signal = signal.clone();
            let stopping = signal.wait_for(|stopping| *stopping).await.is_ok();
            if stopping {
                return;
            }
        }
        std::future::pending::<()>().await
    }

    /// Translate every task under the admission policy
    pub async fn dispatch(&self, tasks: Vec<WordTask>) -> RelayResult<Vec<TaskOutcome>> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let requested = tasks.len();
        let overloaded = RelayError::Overloaded {
            requested,
            ceiling: self.policy.queue_ceiling,
        };
        if !self.policy.admits(requested) {
            warn!(
                requested,
                ceiling = self.policy.queue_ceiling,
                "Cohort rejected by admission control"
            );
            return Err(overloaded);
        }

        let mut running = JoinSet::new();
        let mut outcomes: Vec<Option<TaskOutcome>> = vec![None; requested];
        let mut next_start = Instant::now();

        for (index, task) in tasks.into_iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.shutdown_requested() => None,
                permit = Arc::clone(&self.permits).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                warn!(
                    requested,
                    started = index,
                    "Shutting down while scheduling, aborting cohort"
                );
                running.abort_all();
                return Err(overloaded);
            };

            tokio::time::sleep_until(next_start).await;
            next_start = Instant::now() + self.policy.min_inter_service_gap;

            let translator = Arc::clone(&self.translator);
            let source_language = self.source_language.clone();
            let call_timeout = self.call_timeout;
            running.spawn(async move {
                let outcome =
                    run_task(translator.as_ref(), &task, &source_language, call_timeout).await;
                drop(permit);
                (index, outcome)
            });
        }

        while let Some(joined) = running.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(err) => {
                    running.abort_all();
                    return Err(RelayError::Internal(format!(
                        "translation task ended without an outcome: {}",
                        err
                    )));
                }
            }
        }

        outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                outcome.ok_or_else(|| {
                    RelayError::Internal(format!("no outcome recorded for task {}", index))
                })
            })
            .collect()
    }
}

/// Run one call and fold every failure into an error marker
async fn run_task(
    translator: &dyn MachineTranslator,
    task: &WordTask,
    source_language: &str,
    call_timeout: Duration,
) -> TaskOutcome {
    let word = &task.original_word;
    debug!(word = %word, language = %task.target_language, "Translating word");

    let call = translator.translate(word, source_language, &task.target_language);
    match tokio::time::timeout(call_timeout, call).await {
        Ok(Ok(translated)) => {
            debug!(word = %word, translated = %translated, "Translated word");
            TaskOutcome::translated(word.as_str(), translated)
        }
        Ok(Err(err)) if err.is_timeout() => {
            warn!(word = %word, "Request timed out for word");
            TaskOutcome::failed(word.as_str(), ErrorMarker::Timeout)
        }
        Ok(Err(err)) => {
            warn!(word = %word, error = %err, "Error translating word");
            TaskOutcome::failed(word.as_str(), ErrorMarker::TranslationError)
        }
        Err(_) => {
            let timeout_ms = call_timeout.as_millis() as u64;
            warn!(word = %word, timeout_ms, "Request timed out for word");
            TaskOutcome::failed(word.as_str(), ErrorMarker::Timeout)
        }
    }
}
