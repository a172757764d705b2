//! Video id extraction

use regex::Regex;
use std::sync::OnceLock;

use super::YouTubeError;

fn video_id_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?:v=|be/|embed/)([a-zA-Z0-9_-]{11})").expect("video id regex is valid"))
}

fn bare_id_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("bare id regex is valid"))
}

/// Extract the 11-character video id from a `v=`, `youtu.be/` or `embed/` URL
pub fn extract_video_id(url: &str) -> Result<String, YouTubeError> {
    video_id_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| YouTubeError::InvalidUrl(url.to_string()))
}

/// Accept either a URL or a bare 11-character id
pub fn resolve_video_id(url_or_id: &str) -> Result<String, YouTubeError> {
    let trimmed = url_or_id.trim();
    if bare_id_regex().is_match(trimmed) {
        return Ok(trimmed.to_string());
    }
    extract_video_id(trimmed)
}
