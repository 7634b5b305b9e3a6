//! Result of handling one inbound message.

use crate::error::BotError;
use crate::text::{DISCORD_MESSAGE_LIMIT, truncate_chars};

const APOLOGY: &str = " にゃーん";

/// What happened to the channel's stored conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Keep,
    Reset,
}

/// Whether the host should log or alert on this event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotify {
    Ok,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text to post in the channel, if any.
    pub reply: Option<String>,
    pub state_action: StateAction,
    pub host_notify: HostNotify,
}

impl Outcome {
    #[must_use]
    pub fn ignored() -> Self {
        Self {
            reply: None,
            state_action: StateAction::Keep,
            host_notify: HostNotify::Ok,
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            state_action: StateAction::Keep,
            host_notify: HostNotify::Ok,
        }
    }

    /// Conversation was cleared on request.
    pub fn reset(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            state_action: StateAction::Reset,
            host_notify: HostNotify::Ok,
        }
    }

    /// Generation failed; the conversation was dropped and the user gets the
    /// error text followed by an apology.
    ///
    /// The reply fits in one Discord message; the host still gets the full
    /// description.
    #[must_use]
    pub fn failure(error: &BotError) -> Self {
        let detail = error.to_string();
        let budget = DISCORD_MESSAGE_LIMIT - APOLOGY.chars().count();
        Self {
            reply: Some(format!("{}{APOLOGY}", truncate_chars(&detail, budget))),
            state_action: StateAction::Reset,
            host_notify: HostNotify::Failure(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn failure_embeds_error_description() {
        let outcome = Outcome::failure(&BotError::Timeout);

        assert_eq!(outcome.reply.as_deref(), Some("LLM request timed out にゃーん"));
        assert_eq!(outcome.state_action, StateAction::Reset);
        assert_eq!(
            outcome.host_notify,
            HostNotify::Failure("LLM request timed out".to_string())
        );
    }

    #[test]
    fn failure_reply_fits_one_message() {
        let body = "<html>".repeat(600);
        let outcome = Outcome::failure(&BotError::LlmApi {
            status: StatusCode::BAD_GATEWAY,
            message: body.clone(),
        });

        let reply = outcome.reply.unwrap_or_default();
        assert_eq!(reply.chars().count(), DISCORD_MESSAGE_LIMIT);
        assert!(reply.ends_with("… にゃーん"));
        assert!(matches!(
            outcome.host_notify,
            HostNotify::Failure(detail) if detail.contains(&body)
        ));
    }

    #[test]
    fn ignored_has_no_reply() {
        let outcome = Outcome::ignored();
        assert!(outcome.reply.is_none());
        assert_eq!(outcome.host_notify, HostNotify::Ok);
    }
}
