//! Model backend abstraction and request building.
//!
//! Two request shapes exist: a text chat carrying recent history behind a
//! system turn, and a single-shot vision chat where the system prompt is
//! folded into the user turn because vision models reject a system role.

use std::future::Future;

use log::debug;

use crate::error::Result;
use crate::types::{ContentSegment, Message, MessageContent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    Text { messages: Vec<Message> },
    Vision { message: Message },
}

impl ChatRequest {
    /// Build a text chat request from the windowed history.
    ///
    /// Every turn is flattened to plain text; the system prompt goes first.
    #[must_use]
    pub fn text(system_prompt: &str, history: &[Message]) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend(history.iter().map(|message| Message {
            role: message.role,
            content: MessageContent::Text(message.content.to_text()),
        }));
        ChatRequest::Text { messages }
    }

    /// Build a vision request from the current prompt's segments.
    ///
    /// Only the first image is kept. The system prompt prefixes the first text
    /// segment, or becomes a leading text segment when there is none.
    #[must_use]
    pub fn vision(system_prompt: &str, segments: &[ContentSegment]) -> Self {
        let mut content = Vec::with_capacity(segments.len() + 1);
        let mut seen_image = false;
        let mut prompt_inlined = false;

        for segment in segments {
            match segment {
                ContentSegment::Image(url) => {
                    if seen_image {
                        debug!("Dropping extra image for vision request: {url}");
                        continue;
                    }
                    seen_image = true;
                    content.push(segment.clone());
                }
                ContentSegment::Text(text) if !prompt_inlined => {
                    prompt_inlined = true;
                    content.push(ContentSegment::Text(format!("{system_prompt}\n{text}")));
                }
                ContentSegment::Text(_) => content.push(segment.clone()),
            }
        }

        if !prompt_inlined {
            content.insert(0, ContentSegment::Text(system_prompt.to_string()));
        }

        ChatRequest::Vision {
            message: Message::user(MessageContent::Segments(content)),
        }
    }

    #[must_use]
    pub fn is_vision(&self) -> bool {
        matches!(self, ChatRequest::Vision { .. })
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        match self {
            ChatRequest::Text { messages } => messages,
            ChatRequest::Vision { message } => std::slice::from_ref(message),
        }
    }
}

/// Last `window` messages of a history, in order.
#[must_use]
pub fn window(history: &[Message], window: usize) -> &[Message] {
    &history[history.len().saturating_sub(window)..]
}

/// Backend able to answer chat requests.
///
/// `Ok(None)` means the backend answered without usable text.
pub trait ModelGateway: Send + Sync {
    fn chat(&self, request: &ChatRequest) -> impl Future<Output = Result<Option<String>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageRole;

    fn user(text: &str) -> Message {
        Message::user(MessageContent::Text(text.to_string()))
    }

    fn text(value: &str) -> ContentSegment {
        ContentSegment::Text(value.to_string())
    }

    fn image(value: &str) -> ContentSegment {
        ContentSegment::Image(value.to_string())
    }

    #[test]
    fn window_keeps_most_recent_in_order() {
        let history: Vec<Message> = (0..15).map(|i| user(&i.to_string())).collect();
        let recent = window(&history, 10);

        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], user("5"));
        assert_eq!(recent[9], user("14"));
    }

    #[test]
    fn window_of_short_history_is_whole_history() {
        let history = vec![user("a"), user("b")];
        assert_eq!(window(&history, 10), history.as_slice());
    }

    #[test]
    fn text_request_prepends_system_turn() {
        let request = ChatRequest::text("be a cat", &[user("hi")]);

        assert!(!request.is_vision());
        assert_eq!(request.messages()[0].role, MessageRole::System);
        assert_eq!(
            request.messages(),
            &[Message::system("be a cat"), user("hi")]
        );
    }

    #[test]
    fn text_request_flattens_segment_content() {
        let earlier = Message::user(MessageContent::Segments(vec![
            text("see"),
            image("https://x.com/a.png"),
        ]));
        let request = ChatRequest::text("sys", &[earlier]);

        assert_eq!(request.messages()[1], user("see https://x.com/a.png"));
    }

    #[test]
    fn vision_request_inlines_system_prompt() {
        let request = ChatRequest::vision(
            "sys",
            &[text("what"), image("https://x.com/a.png"), text("is it")],
        );

        assert!(request.is_vision());
        assert_eq!(request.messages()[0].role, MessageRole::User);
        assert_eq!(
            request.messages()[0].content,
            MessageContent::Segments(vec![
                text("sys\nwhat"),
                image("https://x.com/a.png"),
                text("is it"),
            ])
        );
    }

    #[test]
    fn vision_request_without_text_leads_with_system_prompt() {
        let request = ChatRequest::vision("sys", &[image("https://x.com/a.png")]);

        assert_eq!(
            request.messages()[0].content,
            MessageContent::Segments(vec![text("sys"), image("https://x.com/a.png")])
        );
    }

    #[test]
    fn vision_request_keeps_first_image_only() {
        let request = ChatRequest::vision(
            "sys",
            &[image("https://x.com/a.png"), image("https://x.com/b.png")],
        );

        assert_eq!(
            request.messages()[0].content,
            MessageContent::Segments(vec![text("sys"), image("https://x.com/a.png")])
        );
    }
}
