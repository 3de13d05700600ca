//! Machine translation trait
//!
//! The relay only ever talks to a translation backend through
//! [`MachineTranslator`], so the dispatcher can run against LibreTranslate in
//! production and against [`crate::MockTranslator`] in tests.
//!
//! # Example
//!
//! ```ignore
//! use word_relay::{LibreTranslateProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = LibreTranslateProvider::from_env()?;
//!     let result = provider.translate("hello", "en", "es").await?;
//!     println!("{}", result); // "hola"
//!     Ok(())
//! }
//! ```

use crate::error::RelayResult;
use async_trait::async_trait;

/// Generic trait for translation backends
///
/// One call translates one word. Implementations report failures as typed
/// errors: [`RelayError::Timeout`] when the call timed out, and any other
/// variant for every other failure. They must not panic.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en")
    /// * `target_locale` - Target language code (e.g., "es", "pt-BR"), passed
    ///   through exactly as the client sent it
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(RelayError::Timeout)` - The backend did not answer in time
    /// * `Err(RelayError)` - Any other failure
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> RelayResult<String>;

    /// Name of this provider, for logging
    fn provider_name(&self) -> &str;
}
