use async_trait::async_trait;
use compass_config::{AnswerServiceSettings, CompassConfig};
use compass_core::{AnswerClient, AnswerError, AnswerResult, CompassError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

pub mod ui;
pub use ui::{display_source, format_citations};

/// Request body posted to the answer service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub query: String,
}

/// Response body returned by the answer service.
///
/// `context` lists the source identifiers the answer was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default)]
    pub context: Vec<String>,
}

impl From<AnswerResponse> for AnswerResult {
    fn from(response: AnswerResponse) -> Self {
        AnswerResult {
            text: response.answer,
            citations: response.context,
        }
    }
}

/// Answer service client speaking JSON over HTTP.
pub struct HttpAnswerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAnswerClient {
    pub fn new(settings: &AnswerServiceSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| CompassError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let endpoint = settings.endpoint();
        debug!("Answer service endpoint: {}", endpoint);

        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &CompassConfig) -> Result<Self> {
        Self::new(&config.answer_service)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerClient for HttpAnswerClient {
    #[instrument(skip(self, query), fields(endpoint = %self.endpoint))]
    async fn ask(&self, query: &str) -> std::result::Result<AnswerResult, AnswerError> {
        let request = AnswerRequest {
            query: query.to_string(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Answer service responded with {}", status);
            return Err(AnswerError::Status {
                code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let result = decode_answer(&body)?;

        debug!("Received answer with {} citations", result.citations.len());
        Ok(result)
    }
}

/// Decode an answer service response body.
pub fn decode_answer(body: &str) -> std::result::Result<AnswerResult, AnswerError> {
    serde_json::from_str::<AnswerResponse>(body)
        .map(AnswerResult::from)
        .map_err(|e| AnswerError::Decode(e.to_string()))
}

fn map_transport_error(err: reqwest::Error) -> AnswerError {
    if err.is_timeout() {
        AnswerError::Timeout
    } else if err.is_decode() {
        AnswerError::Decode(err.to_string())
    } else {
        AnswerError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_answer_keeps_citation_order() {
        let body = json!({
            "answer": "42",
            "context": ["docs/a.pdf", "docs/b.pdf"]
        })
        .to_string();

        let result = decode_answer(&body).unwrap();
        assert_eq!(result.text, "42");
        assert_eq!(result.citations, vec!["docs/a.pdf", "docs/b.pdf"]);
    }

    #[test]
    fn test_decode_answer_without_context() {
        let result = decode_answer(r#"{"answer": "not within the scope"}"#).unwrap();
        assert!(result.citations.is_empty());
    }

    #[test]
    fn test_decode_answer_rejects_garbage() {
        let err = decode_answer("<p>Internal Server Error</p>").unwrap_err();
        assert!(matches!(err, AnswerError::Decode(_)));

        let err = decode_answer(r#"{"Status": "Failure --- some error occured"}"#).unwrap_err();
        assert!(matches!(err, AnswerError::Decode(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(AnswerRequest {
            query: "What is X?".into(),
        })
        .unwrap();
        assert_eq!(body, json!({"query": "What is X?"}));
    }

    #[test]
    fn test_client_uses_configured_endpoint() {
        let settings = AnswerServiceSettings {
            base_url: "http://localhost:5000/".into(),
            path: "/ask".into(),
            timeout_secs: 5,
        };
        let client = HttpAnswerClient::new(&settings).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:5000/ask");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_answer_error() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let settings = AnswerServiceSettings {
            base_url: "http://127.0.0.1:9".into(),
            path: "/".into(),
            timeout_secs: 2,
        };
        let client = HttpAnswerClient::new(&settings).unwrap();

        let err = client.ask("What is X?").await.unwrap_err();
        assert!(matches!(err, AnswerError::Transport(_) | AnswerError::Timeout));
    }
}
