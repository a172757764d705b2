//! YouTube capabilities invoked by the tools
//!
//! `YouTubeSource` is the seam between tool bodies and the network. The
//! production implementation is [`WebYouTube`], which reads the public web
//! frontend; tests substitute an in-memory source.

use async_trait::async_trait;

mod error;
pub mod page;
mod types;
mod video_id;
mod web;

pub use error::YouTubeError;
pub use types::{
    Chapter, ChannelInfo, Thumbnail, TranscriptLanguage, TranscriptSnippet, VideoMetadata, VideoStub, transcript_text,
};
pub use video_id::{extract_video_id, resolve_video_id};
pub use web::WebYouTube;

/// Read-only YouTube data access
///
/// Video arguments are already-resolved 11-character ids.
#[async_trait]
pub trait YouTubeSource: Send + Sync {
    /// Search videos, returning at most `limit` stubs
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoStub>, YouTubeError>;

    /// Transcript snippets in the requested language
    async fn transcript(&self, video_id: &str, language: &str) -> Result<Vec<TranscriptSnippet>, YouTubeError>;

    /// Caption tracks available for a video
    async fn transcript_languages(&self, video_id: &str) -> Result<Vec<TranscriptLanguage>, YouTubeError>;

    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata, YouTubeError>;

    async fn thumbnails(&self, video_id: &str) -> Result<Vec<Thumbnail>, YouTubeError>;

    /// Channel details from a channel URL, `@handle`, channel id, or any video URL
    async fn channel(&self, target: &str) -> Result<ChannelInfo, YouTubeError>;
}
