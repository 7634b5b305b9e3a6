use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("LLM API error ({status}): {message}")]
    LlmApi { status: StatusCode, message: String },

    #[error("LLM response error: {0}")]
    LlmResponse(String),

    #[error("Error: Empty response")]
    EmptyResponse,

    #[error("LLM request timed out")]
    Timeout,

    #[error("HTTP request error: {0}")]
    Reqwest(reqwest::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BotError::Timeout
        } else {
            BotError::Reqwest(err)
        }
    }
}

impl<E, R> From<SdkError<E, R>> for BotError
where
    E: StdError + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    fn from(err: SdkError<E, R>) -> Self {
        BotError::Store(DisplayErrorContext(&err).to_string())
    }
}

impl BotError {
    /// Whether this error came from talking to the model backend.
    ///
    /// Generation failures reset the channel's conversation; everything else
    /// is handed back to the host untouched.
    #[must_use]
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            BotError::LlmApi { .. }
                | BotError::LlmResponse(_)
                | BotError::EmptyResponse
                | BotError::Timeout
                | BotError::Reqwest(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_are_generation_failures() {
        assert!(BotError::EmptyResponse.is_generation_failure());
        assert!(BotError::Timeout.is_generation_failure());
        assert!(
            BotError::LlmApi {
                status: StatusCode::BAD_GATEWAY,
                message: "upstream".to_string(),
            }
            .is_generation_failure()
        );
    }

    #[test]
    fn store_errors_are_not_generation_failures() {
        let store = BotError::Store("bucket gone".to_string());
        let config = BotError::Config("bad".to_string());
        assert!(!store.is_generation_failure());
        assert!(!config.is_generation_failure());
    }

    #[test]
    fn empty_response_reads_like_a_thrown_error() {
        assert_eq!(BotError::EmptyResponse.to_string(), "Error: Empty response");
    }
}
