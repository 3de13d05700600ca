//! Mock translator for testing
//!
//! A deterministic, network-free [`MachineTranslator`]. Besides the translation
//! mode it can simulate slow calls, calls that never finish, and failing words,
//! and it records how many calls were made and how many overlapped.
//!
//! # Example
//!
//! ```ignore
//! use word_relay::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "es").await.unwrap();
//!     assert_eq!(result, "hello_es");
//! }
//! ```

use crate::error::{RelayError, RelayResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_es"
    Suffix,

    /// Predefined (text, target_locale) → translation, falling back to suffix
    Mappings(HashMap<(String, String), String>),

    /// Every call fails with a translation error
    Error(String),

    /// Return input unchanged
    NoOp,
}

/// Call counters shared by all clones of a [`MockTranslator`]
#[derive(Debug, Default)]
pub struct MockStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockStats {
    /// Number of `translate` calls started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls currently awaiting their result
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of calls ever observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlightGuard<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlightGuard { stats: self }
    }
}

/// Decrements the in-flight count even when the call future is dropped
struct InFlightGuard<'a> {
    stats: &'a MockStats,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock translator that simulates various backend behaviors
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Simulated network delay per call (in milliseconds)
    delay_ms: u64,
    /// Words whose calls never complete
    stalled: HashSet<String>,
    /// Words whose calls fail with a translation error
    failing: HashSet<String>,
    stats: Arc<MockStats>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            stalled: HashSet::new(),
            failing: HashSet::new(),
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Make calls for `word` hang until the caller gives up on them
    pub fn stall_on(mut self, word: impl Into<String>) -> Self {
        self.stalled.insert(word.into());
        self
    }

    /// Make calls for `word` fail with a translation error
    pub fn fail_on(mut self, word: impl Into<String>) -> Self {
        self.failing.insert(word.into());
        self
    }

    /// Shared call statistics
    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, target: &str) -> RelayResult<String> {
        if self.failing.contains(text) {
            return Err(RelayError::TranslationError(format!(
                "mock failure for '{}'",
                text
            )));
        }

        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(RelayError::TranslationError(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> RelayResult<String> {
        let _guard = self.stats.enter();

        if self.stalled.contains(text) {
            std::future::pending::<()>().await;
        }

        self.apply_delay().await;
        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
