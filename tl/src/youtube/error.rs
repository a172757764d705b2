//! YouTube error types

use thiserror::Error;

/// Errors raised while talking to YouTube
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("Invalid YouTube URL format: {0}")]
    InvalidUrl(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("No transcripts were found for video {video_id} in language '{language}'")]
    TranscriptNotFound { video_id: String, language: String },

    #[error("YouTube returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse YouTube response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for YouTubeError {
    fn from(err: serde_json::Error) -> Self {
        YouTubeError::Parse(err.to_string())
    }
}
