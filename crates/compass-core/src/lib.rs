use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Ok,
    Failed,
}

/// One utterance in a conversation.
///
/// `index` is assigned by the conversation store when the turn is appended;
/// the value a turn carries before that is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub index: usize,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TurnStatus>,
    /// Index of the user turn this system turn answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to: Option<usize>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            index: 0,
            role: Role::User,
            text: text.into(),
            citations: Vec::new(),
            status: None,
            in_reply_to: None,
            created_at: Utc::now(),
        }
    }

    pub fn answered(in_reply_to: usize, result: AnswerResult) -> Self {
        Self {
            index: 0,
            role: Role::System,
            text: result.text,
            citations: result.citations,
            status: Some(TurnStatus::Ok),
            in_reply_to: Some(in_reply_to),
            created_at: Utc::now(),
        }
    }

    pub fn failed(in_reply_to: usize) -> Self {
        Self {
            index: 0,
            role: Role::System,
            text: String::new(),
            citations: Vec::new(),
            status: Some(TurnStatus::Failed),
            in_reply_to: Some(in_reply_to),
            created_at: Utc::now(),
        }
    }

    /// True for system turns whose answer came back successfully.
    pub fn is_answer(&self) -> bool {
        self.role == Role::System && self.status == Some(TurnStatus::Ok)
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(TurnStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub turn_index: usize,
    pub verdict: Verdict,
}

/// A successful reply from the answer service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub text: String,
    pub citations: Vec<String>,
}

impl AnswerResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations<I, S>(mut self, citations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.citations = citations.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("answer service unreachable: {0}")]
    Transport(String),

    #[error("answer service timed out")]
    Timeout,

    #[error("answer service returned status {code}")]
    Status { code: u16 },

    #[error("malformed answer payload: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum CompassError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("turn {index} cannot take feedback: {reason}")]
    InvalidTurn { index: usize, reason: String },

    #[error("no turn at index {0}")]
    NotFound(usize),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Project error: {0}")]
    ProjectError(String),

    #[error("project {0} not found")]
    ProjectNotFound(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CompassError {
    pub fn invalid_turn(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTurn {
            index,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompassError>;

/// Boundary to the external retrieval and answer service.
///
/// Implementations report every failure through [`AnswerError`]; they must
/// not panic on network or service errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerClient: Send + Sync {
    async fn ask(&self, query: &str) -> std::result::Result<AnswerResult, AnswerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_turn_shape() {
        let turn = Turn::failed(3);
        assert_eq!(turn.role, Role::System);
        assert_eq!(turn.status, Some(TurnStatus::Failed));
        assert!(turn.text.is_empty());
        assert!(turn.citations.is_empty());
        assert_eq!(turn.in_reply_to, Some(3));
        assert!(!turn.is_answer());
    }

    #[test]
    fn test_answered_turn_keeps_citations() {
        let result = AnswerResult::new("42").with_citations(["docs/a.pdf", "docs/b.pdf"]);
        let turn = Turn::answered(0, result);
        assert!(turn.is_answer());
        assert_eq!(turn.citations, vec!["docs/a.pdf", "docs/b.pdf"]);
    }

    #[test]
    fn test_user_turn_serialization_omits_system_fields() {
        let json = serde_json::to_value(Turn::user("What is X?")).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("status").is_none());
        assert!(json.get("citations").is_none());
        assert!(json.get("in_reply_to").is_none());
    }

    #[tokio::test]
    async fn test_mock_answer_client() {
        let mut client = MockAnswerClient::new();
        client
            .expect_ask()
            .returning(|_| Err(AnswerError::Timeout));

        let err = client.ask("anything").await.unwrap_err();
        assert_eq!(err, AnswerError::Timeout);
        assert_eq!(err.to_string(), "answer service timed out");
    }
}
