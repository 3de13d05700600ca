//! Batch word translation relay
//!
//! Takes the raw words of a request, cleans, spell-corrects and deduplicates
//! them, then translates every word through a backend such as LibreTranslate
//! under a bounded-concurrency policy.
//!
//! # Workflow Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use word_relay::{DispatchConfig, LibreTranslateProvider, TranslationRelay, WordNormalizer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let relay = TranslationRelay::new(
//!         Arc::new(LibreTranslateProvider::from_env()?),
//!         Arc::new(WordNormalizer::system_or_bundled()),
//!         DispatchConfig::from_env()?,
//!     );
//!
//!     let words = vec!["Helo".to_string(), "wrold".to_string()];
//!     let response = relay.translate_words(&words, "es").await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod dictionary;
pub mod dispatcher;
pub mod error;
pub mod libretranslate;
pub mod mock;
pub mod normalizer;
pub mod pipeline;
pub mod policy;
pub mod translator;


// Re-export main types for convenient access
pub use data::{ErrorMarker, TaskOutcome, TranslateRequest, TranslationResponse, WordTask};
pub use dictionary::Dictionary;
pub use dispatcher::BoundedDispatcher;
pub use error::{RelayError, RelayResult};
pub use libretranslate::LibreTranslateProvider;
pub use mock::{MockMode, MockStats, MockTranslator};
pub use normalizer::WordNormalizer;
pub use pipeline::TranslationRelay;
pub use policy::{AdmissionPolicy, CeilingMode, DispatchConfig};
pub use translator::MachineTranslator;
