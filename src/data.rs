//! Core data structures for the translation relay
//!
//! A request is turned into one [`WordTask`] per normalized word. Each task ends
//! in exactly one [`TaskOutcome`], and the outcomes of a request are returned
//! together as a [`TranslationResponse`].

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// One word waiting to be translated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordTask {
    /// The normalized source word
    pub original_word: String,
    /// Target language code as given by the client
    pub target_language: String,
}

impl WordTask {
    pub fn new(original_word: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            original_word: original_word.into(),
            target_language: target_language.into(),
        }
    }
}

/// Build the tasks for a batch of normalized words, preserving order
pub fn tasks_for(words: &[String], target_language: &str) -> Vec<WordTask> {
    words
        .iter()
        .map(|word| WordTask::new(word.as_str(), target_language))
        .collect()
}

/// Why a single word could not be translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMarker {
    /// The backend did not answer within the call timeout
    Timeout,
    /// Any other backend or transport failure
    TranslationError,
}

impl ErrorMarker {
    /// Text placed in `translatedWord` for a failed word
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorMarker::Timeout => "Timeout error",
            ErrorMarker::TranslationError => "Translation error",
        }
    }
}

impl std::fmt::Display for ErrorMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of one [`WordTask`]
///
/// Serializes as `{"originalWord": ..., "translatedWord": ...}` where a failed
/// translation carries the marker text, e.g. `"Timeout error"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub original_word: String,
    pub translated_word: Result<String, ErrorMarker>,
}

impl TaskOutcome {
    pub fn translated(original_word: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            original_word: original_word.into(),
            translated_word: Ok(translated.into()),
        }
    }

    pub fn failed(original_word: impl Into<String>, marker: ErrorMarker) -> Self {
        Self {
            original_word: original_word.into(),
            translated_word: Err(marker),
        }
    }

    pub fn is_translated(&self) -> bool {
        self.translated_word.is_ok()
    }

    /// The text sent back to clients: either the translation or the marker text
    pub fn translated_text(&self) -> &str {
        match &self.translated_word {
            Ok(text) => text,
            Err(marker) => marker.as_str(),
        }
    }
}

impl Serialize for TaskOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TaskOutcome", 2)?;
        state.serialize_field("originalWord", &self.original_word)?;
        state.serialize_field("translatedWord", self.translated_text())?;
        state.end()
    }
}

/// Aggregated result for one request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    pub words: Vec<TaskOutcome>,
    pub target_language: String,
}

/// Request body accepted by `POST /translate`
///
/// Both fields are optional here so that a missing field can be reported with
/// the same error body as any other malformed request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub words: Option<Vec<String>>,
    pub target_language: Option<String>,
}

impl TranslateRequest {
    /// Check the request shape and return its words and target language
    pub fn into_parts(self) -> crate::RelayResult<(Vec<String>, String)> {
        use crate::RelayError;

        let words = self
            .words
            .ok_or_else(|| RelayError::InvalidRequest("missing 'words' array".to_string()))?;
        let target_language = self
            .target_language
            .filter(|lang| !lang.trim().is_empty())
            .ok_or_else(|| {
                RelayError::InvalidRequest("missing 'targetLanguage' string".to_string())
            })?;
        Ok((words, target_language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tasks_for_preserves_order() {
        let words = vec!["hello".to_string(), "world".to_string()];
        let tasks = tasks_for(&words, "es");
        assert_eq!(
            tasks,
            vec![WordTask::new("hello", "es"), WordTask::new("world", "es")]
        );
    }

    #[test]
    fn test_outcome_serializes_translation() {
        let outcome = TaskOutcome::translated("hello", "hola");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"originalWord": "hello", "translatedWord": "hola"})
        );
    }

    #[test]
    fn test_outcome_serializes_markers() {
        let timeout = TaskOutcome::failed("world", ErrorMarker::Timeout);
        let failed = TaskOutcome::failed("world", ErrorMarker::TranslationError);
        assert_eq!(
            serde_json::to_value(&timeout).unwrap()["translatedWord"],
            "Timeout error"
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap()["translatedWord"],
            "Translation error"
        );
        assert!(!timeout.is_translated());
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = TranslationResponse {
            words: vec![TaskOutcome::translated("hello", "hola")],
            target_language: "es".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "words": [{"originalWord": "hello", "translatedWord": "hola"}],
                "targetLanguage": "es"
            })
        );
    }

    #[test]
    fn test_request_into_parts() {
        let request: TranslateRequest =
            serde_json::from_value(json!({"words": ["Helo"], "targetLanguage": "es"})).unwrap();
        let (words, lang) = request.into_parts().unwrap();
        assert_eq!(words, vec!["Helo"]);
        assert_eq!(lang, "es");
    }

    #[test]
    fn test_request_missing_fields() {
        let missing_lang: TranslateRequest =
            serde_json::from_value(json!({"words": ["hello"]})).unwrap();
        assert!(missing_lang.into_parts().is_err());

        let blank_lang: TranslateRequest =
            serde_json::from_value(json!({"words": ["hello"], "targetLanguage": "  "})).unwrap();
        assert!(blank_lang.into_parts().is_err());

        let missing_words: TranslateRequest =
            serde_json::from_value(json!({"targetLanguage": "es"})).unwrap();
        assert!(missing_words.into_parts().is_err());
    }

    #[test]
    fn test_request_rejects_non_string_words() {
        let result: Result<TranslateRequest, _> =
            serde_json::from_value(json!({"words": [1, 2], "targetLanguage": "es"}));
        assert!(result.is_err());
    }
}
