//! Shared text utilities for Discord-bound content.

/// Discord's message content limit, in characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

const ELLIPSIS: char = '…';

/// Cut `text` to at most `max_chars` characters, ending in an ellipsis when
/// anything was dropped.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// Split `text` into chunks of at most `max_chars` characters, preferring to
/// break after a newline.
#[must_use]
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest: Vec<char> = text.chars().collect();

    while rest.len() > max_chars {
        let cut = rest[..max_chars]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(max_chars, |newline| newline + 1);
        chunks.push(rest.drain(..cut).collect());
    }
    if !rest.is_empty() {
        chunks.push(rest.into_iter().collect());
    }

    chunks
}
