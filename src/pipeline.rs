//! Request-level pipeline: normalize, build the batch, dispatch, aggregate
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use word_relay::{DispatchConfig, MockMode, MockTranslator, TranslationRelay, WordNormalizer};
//!
//! let relay = TranslationRelay::new(
//!     Arc::new(MockTranslator::new(MockMode::Suffix)),
//!     Arc::new(WordNormalizer::bundled()),
//!     DispatchConfig::default(),
//! );
//! let response = relay.translate_words(&["Helo".to_string()], "es").await?;
//! assert_eq!(response.words[0].original_word, "hello");
//! ```

use crate::data::{TranslationResponse, tasks_for};
use crate::dispatcher::BoundedDispatcher;
use crate::error::RelayResult;
use crate::normalizer::WordNormalizer;
use crate::policy::{AdmissionPolicy, DispatchConfig};
use crate::translator::MachineTranslator;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared, immutable pieces needed to serve translation requests
#[derive(Clone)]
pub struct TranslationRelay {
    translator: Arc<dyn MachineTranslator>,
    normalizer: Arc<WordNormalizer>,
    config: DispatchConfig,
    shutdown: Arc<watch::Sender<bool>>,
}

impl TranslationRelay {
    pub fn new(
        translator: Arc<dyn MachineTranslator>,
        normalizer: Arc<WordNormalizer>,
        config: DispatchConfig,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            translator,
            normalizer,
            config,
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.translator.provider_name()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &WordNormalizer {
        &self.normalizer
    }

    /// Stop granting capacity. Requests still scheduling fail with
    /// `Overloaded`, and so does every later request with words to translate.
    /// Shared by all clones of this relay.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!("Relay shutting down, no new translation calls will start");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// A fresh dispatcher for a batch of `batch_size` words
    pub fn dispatcher_for(&self, batch_size: usize) -> BoundedDispatcher {
        let policy = AdmissionPolicy::for_batch(batch_size, &self.config);
        BoundedDispatcher::new(Arc::clone(&self.translator), policy, self.config.call_timeout)
            .with_shutdown(self.shutdown.subscribe())
    }

    /// Translate a request's raw words into `target_language`
    ///
    /// The language code is passed to the backend as given. Fails with
    /// `Overloaded` if the batch is not admitted or the relay is shutting down.
    /// Per-word failures are reported inside the response.
    pub async fn translate_words(
        &self,
        words: &[String],
        target_language: &str,
    ) -> RelayResult<TranslationResponse> {
        let clean_words = self.normalizer.normalize(words);
        info!(
            received = words.len(),
            valid = clean_words.len(),
            "Received {} words, {} words are valid",
            words.len(),
            clean_words.len()
        );

        let dispatcher = self.dispatcher_for(clean_words.len());
        let outcomes = dispatcher
            .dispatch(tasks_for(&clean_words, target_language))
            .await?;

        let failed = outcomes.iter().filter(|o| !o.is_translated()).count();
        info!(
            translated = outcomes.len() - failed,
            failed,
            language = %target_language,
            "Translated {} words to {}",
            outcomes.len(),
            target_language
        );

        Ok(TranslationResponse {
            words: outcomes,
            target_language: target_language.to_string(),
        })
    }
}
