use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use word_relay::{RelayError, TranslateRequest, TranslationRelay, TranslationResponse};

pub const INVALID_REQUEST: &str = "Invalid request format.";
pub const TOO_MANY_REQUESTS: &str = "Too many requests, please try again later.";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<TranslationRelay>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate_words))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.relay.provider_name(),
    }))
}

async fn translate_words(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        error_response(RelayError::InvalidRequest(rejection.body_text()))
    })?;
    let (words, target_language) = request.into_parts().map_err(error_response)?;

    info!("Translating {} words to {}", words.len(), target_language);

    state
        .relay
        .translate_words(&words, &target_language)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Map a relay failure to its status code and public error body
pub fn error_response(err: RelayError) -> ApiError {
    let (status, message) = match &err {
        RelayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, INVALID_REQUEST),
        RelayError::Overloaded { .. } => {
            warn!("{}", err);
            (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_REQUESTS)
        }
        _ => {
            error!("Unexpected error: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use std::collections::HashMap;
    use tower::ServiceExt;
    use word_relay::{CeilingMode, DispatchConfig, MockMode, MockTranslator, WordNormalizer};

    fn relay(mock: &MockTranslator, config: DispatchConfig) -> Arc<TranslationRelay> {
        Arc::new(TranslationRelay::new(
            Arc::new(mock.clone()),
            Arc::new(WordNormalizer::bundled()),
            config,
        ))
    }

    fn app(mock: &MockTranslator, config: DispatchConfig) -> Router {
        router(AppState {
            relay: relay(mock, config),
        })
    }

    fn spanish_mock() -> MockTranslator {
        let mut map = HashMap::new();
        map.insert(("hello".to_string(), "es".to_string()), "hola".to_string());
        map.insert(("world".to_string(), "es".to_string()), "mundo".to_string());
        MockTranslator::new(MockMode::Mappings(map))
    }

    async fn post_translate(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/translate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_translate_success() {
        let mock = spanish_mock();
        let (status, body) = post_translate(
            app(&mock, DispatchConfig::default()),
            r#"{"words": ["Helo", "wrold", "wrold"], "targetLanguage": "es"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "words": [
                    {"originalWord": "hello", "translatedWord": "hola"},
                    {"originalWord": "world", "translatedWord": "mundo"}
                ],
                "targetLanguage": "es"
            })
        );
        assert_eq!(mock.stats().calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_target_language_is_bad_request() {
        let mock = spanish_mock();
        let (status, body) = post_translate(
            app(&mock, DispatchConfig::default()),
            r#"{"words": ["hello"]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid request format."}));
        assert_eq!(mock.stats().calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_request() {
        let mock = spanish_mock();
        for body in [
            r#"{"words": "hello", "targetLanguage": "es"}"#,
            r#"{"words": [1, 2], "targetLanguage": "es"}"#,
            r#"{"targetLanguage": "es"}"#,
            r#"{"words": ["hello"], "targetLanguage": ""}"#,
            "not json",
        ] {
            let (status, response) =
                post_translate(app(&mock, DispatchConfig::default()), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(response["error"], INVALID_REQUEST);
        }
        assert_eq!(mock.stats().calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_ok() {
        let mock = spanish_mock();
        let (status, body) = post_translate(
            app(&mock, DispatchConfig::default()),
            r#"{"words": [], "targetLanguage": "es"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"words": [], "targetLanguage": "es"}));
    }

    #[tokio::test]
    async fn test_unusual_language_code_is_forwarded() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let (status, body) = post_translate(
            app(&mock, DispatchConfig::default()),
            r#"{"words": ["hello"], "targetLanguage": "es@@"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"][0]["translatedWord"], "hello_es@@");

        let (status, body) = post_translate(
            app(&mock, DispatchConfig::default()),
            r#"{"words": [], "targetLanguage": "es@@"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"words": [], "targetLanguage": "es@@"}));
    }

    #[tokio::test]
    async fn test_shut_down_relay_is_too_many_requests() {
        let mock = spanish_mock();
        let relay = relay(&mock, DispatchConfig::default());
        relay.shutdown();

        let (status, body) = post_translate(
            router(AppState { relay }),
            r#"{"words": ["hello", "world"], "targetLanguage": "es"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], TOO_MANY_REQUESTS);
        assert_eq!(mock.stats().calls(), 0);
    }

    #[tokio::test]
    async fn test_overload_is_too_many_requests() {
        let mock = spanish_mock();
        let config = DispatchConfig {
            ceiling: CeilingMode::Fixed(1),
            ..DispatchConfig::default()
        };
        let (status, body) = post_translate(
            app(&mock, config),
            r#"{"words": ["hello", "world"], "targetLanguage": "es"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!({"error": "Too many requests, please try again later."}));
        assert_eq!(mock.stats().calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_timeout_is_still_ok() {
        let mock = spanish_mock().stall_on("world");
        let (status, body) = post_translate(
            app(&mock, DispatchConfig::default()),
            r#"{"words": ["hello", "world"], "targetLanguage": "es"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["words"][0]["translatedWord"], "hola");
        assert_eq!(body["words"][1]["translatedWord"], "Timeout error");
    }

    #[tokio::test]
    async fn test_health() {
        let mock = spanish_mock();
        let response = app(&mock, DispatchConfig::default())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_unexpected_errors_are_internal() {
        let (status, Json(body)) =
            error_response(RelayError::Internal("task panicked".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, INTERNAL_ERROR);
    }
}
