//! Common types used throughout the darazbot bot.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation.
///
/// Maps to chat completion message roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from a channel member
    User,
    /// Message from the AI assistant
    Assistant,
    /// System prompt or instructions
    System,
}

/// One piece of a user prompt after segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ContentPart", into = "ContentPart")]
pub enum ContentSegment {
    Text(String),
    Image(String),
}

impl ContentSegment {
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, ContentSegment::Image(_))
    }

    /// Plain text rendering; images render as their URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ContentSegment::Text(text) => text,
            ContentSegment::Image(url) => url,
        }
    }
}

/// Wire shape of a segment in the chat completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImageUrl {
    url: String,
}

impl From<ContentPart> for ContentSegment {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => ContentSegment::Text(text),
            ContentPart::ImageUrl { image_url } => ContentSegment::Image(image_url.url),
        }
    }
}

impl From<ContentSegment> for ContentPart {
    fn from(segment: ContentSegment) -> Self {
        match segment {
            ContentSegment::Text(text) => ContentPart::Text { text },
            ContentSegment::Image(url) => ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Segments(Vec<ContentSegment>),
}

impl MessageContent {
    /// Flatten to plain text for backends without multi-part support.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Segments(segments) => segments
                .iter()
                .map(ContentSegment::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(content: MessageContent) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }
}

/// Normalized chat message handed to the conversation controller by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel_id: String,
    pub text: String,
    /// The bot's mention token on this platform, e.g. `<@1234>` on Discord.
    pub mention: String,
}

impl InboundMessage {
    pub fn new(
        channel_id: impl Into<String>,
        text: impl Into<String>,
        mention: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            text: text.into(),
            mention: mention.into(),
        }
    }

    #[must_use]
    pub fn mentions_bot(&self) -> bool {
        !self.mention.is_empty() && self.text.contains(&self.mention)
    }

    /// Message text with one mention token removed, trimmed.
    #[must_use]
    pub fn prompt(&self) -> String {
        if self.mention.is_empty() {
            return self.text.trim().to_string();
        }
        self.text.replacen(&self.mention, "", 1).trim().to_string()
    }
}
