//! Shared helpers for unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::youtube::{
    ChannelInfo, Thumbnail, TranscriptLanguage, TranscriptSnippet, VideoMetadata, VideoStub, YouTubeError,
    YouTubeSource,
};

pub fn should_skip_httpmock() -> bool {
    if can_bind_localhost() {
        return false;
    }
    eprintln!("skipping httpmock test: sandbox forbids binding to localhost");
    true
}

fn can_bind_localhost() -> bool {
    match std::net::TcpListener::bind(("127.0.0.1", 0)) {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(err) => panic!("failed to bind localhost for httpmock tests: {err}"),
    }
}

pub const KNOWN_VIDEO: &str = "dQw4w9WgXcQ";

const SEARCH_POOL: &[(&str, &str)] = &[
    ("catvideo001", "Funny cats compilation"),
    ("catvideo002", "Cats vs cucumbers"),
    ("catvideo003", "Kitten learns to jump"),
    ("catvideo004", "Cat documentary"),
    ("catvideo005", "Sleepy cats for 10 hours"),
];

/// In-memory YouTube with one known video
#[derive(Default)]
pub struct FakeYouTube {
    calls: AtomicUsize,
    searches: Mutex<Vec<(String, usize)>>,
}

impl FakeYouTube {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total calls across every method
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(query, limit)` of every search, in order
    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn known(&self, video_id: &str) -> Result<(), YouTubeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if video_id == KNOWN_VIDEO {
            Ok(())
        } else {
            Err(YouTubeError::VideoNotFound(video_id.to_string()))
        }
    }
}

#[async_trait]
impl YouTubeSource for FakeYouTube {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoStub>, YouTubeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut searches) = self.searches.lock() {
            searches.push((query.to_string(), limit));
        }
        Ok(SEARCH_POOL
            .iter()
            .take(limit)
            .map(|(id, title)| VideoStub::new(*id, *title))
            .collect())
    }

    async fn transcript(&self, video_id: &str, language: &str) -> Result<Vec<TranscriptSnippet>, YouTubeError> {
        self.known(video_id)?;
        if language != "en" {
            return Err(YouTubeError::TranscriptNotFound {
                video_id: video_id.to_string(),
                language: language.to_string(),
            });
        }
        Ok(vec![
            TranscriptSnippet {
                text: "never gonna".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            TranscriptSnippet {
                text: "give you up".to_string(),
                start: 1.5,
                duration: 2.0,
            },
        ])
    }

    async fn transcript_languages(&self, video_id: &str) -> Result<Vec<TranscriptLanguage>, YouTubeError> {
        self.known(video_id)?;
        Ok(vec![
            TranscriptLanguage {
                language: "English".to_string(),
                language_code: "en".to_string(),
                is_generated: false,
            },
            TranscriptLanguage {
                language: "Spanish (auto-generated)".to_string(),
                language_code: "es".to_string(),
                is_generated: true,
            },
        ])
    }

    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata, YouTubeError> {
        self.known(video_id)?;
        Ok(VideoMetadata {
            title: Some("Never Gonna Give You Up".to_string()),
            views: Some(1_500_000_000),
            duration: Some(213),
            channel: Some("Rick Astley".to_string()),
            likes: Some(17_000_000),
            comments: None,
            chapters: vec![],
        })
    }

    async fn thumbnails(&self, video_id: &str) -> Result<Vec<Thumbnail>, YouTubeError> {
        self.known(video_id)?;
        Ok(vec![
            Thumbnail::new("https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg", Some(120), Some(90)),
            Thumbnail::new("https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg", Some(1280), Some(720)),
        ])
    }

    async fn channel(&self, target: &str) -> Result<ChannelInfo, YouTubeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if target.trim().is_empty() {
            return Err(YouTubeError::InvalidUrl(target.to_string()));
        }
        Ok(ChannelInfo {
            channel_id: "UCuAXFkgsw1L7xaCfnd5JJOw".to_string(),
            title: "Rick Astley".to_string(),
            description: "Official channel".to_string(),
            url: "https://www.youtube.com/@RickAstleyYT".to_string(),
            subscribers: Some("4.2M subscribers".to_string()),
            video_count: Some("300 videos".to_string()),
        })
    }
}
