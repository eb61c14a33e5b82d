use openai_client::OpenAIError;
use thiserror::Error;

/// Why model-assisted ranking could not be used. Never fatal to a run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("no ranking credential supplied")]
    MissingCredential,

    #[error("ranking request failed: {0}")]
    Network(String),

    #[error("ranking service returned HTTP {status}")]
    Status { status: u16, message: String },

    #[error("unparsable ranking response: {0}")]
    Parse(String),
}

impl From<OpenAIError> for RankingError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Api { status, message } => RankingError::Status { status, message },
            OpenAIError::Parse(msg) => RankingError::Parse(msg),
            OpenAIError::Network(msg) => RankingError::Network(msg),
        }
    }
}
