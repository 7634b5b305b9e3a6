//! Splits a prompt into text and image-reference segments.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::types::ContentSegment;

/// Path extensions treated as images by the vision backend.
const IMAGE_EXTENSIONS: [&str; 5] = ["gif", "png", "jpg", "jpeg", "webp"];

/// Angle brackets (mention and link syntax), or any run of characters that are
/// not letters, numbers, punctuation or symbols.
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[<>]|[^\p{L}\p{N}\p{P}\p{S}]+").expect("hardcoded regex"));

/// Segment a prompt, preserving fragment order.
#[must_use]
pub fn segment(prompt: &str) -> Vec<ContentSegment> {
    SEPARATOR
        .split(prompt)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| {
            if is_image_url(fragment) {
                ContentSegment::Image(fragment.to_string())
            } else {
                ContentSegment::Text(fragment.to_string())
            }
        })
        .collect()
}

/// True when the fragment is an absolute URL with a host whose path ends in an
/// image extension.
#[must_use]
pub fn is_image_url(fragment: &str) -> bool {
    let Ok(url) = Url::parse(fragment) else {
        return false;
    };
    if url.host_str().is_none() {
        return false;
    }

    Path::new(url.path())
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[must_use]
pub fn has_image(segments: &[ContentSegment]) -> bool {
    segments.iter().any(ContentSegment::is_image)
}
