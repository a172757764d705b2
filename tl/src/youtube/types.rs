//! Shapes returned to the model by the YouTube tools

use serde::Serialize;

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStub {
    pub title: String,
    pub video_id: String,
    pub url: String,
}

impl VideoStub {
    /// Build a stub with the short `youtu.be` link
    pub fn new(video_id: impl Into<String>, title: impl Into<String>) -> Self {
        let video_id = video_id.into();
        Self {
            title: title.into(),
            url: format!("https://youtu.be/{}", video_id),
            video_id,
        }
    }
}

/// One caption line with its timing in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSnippet {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Join snippets into plain transcript text
pub fn transcript_text(snippets: &[TranscriptSnippet]) -> String {
    snippets.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// A caption track available for a video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptLanguage {
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
}

/// A chapter marker, times in seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    pub title: String,
    pub start_time: f64,
    pub end_time: Option<f64>,
}

/// Video metadata; fields YouTube does not expose stay `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub views: Option<u64>,
    /// Duration in seconds
    pub duration: Option<u64>,
    pub channel: Option<String>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resolution: String,
}

impl Thumbnail {
    /// Build a thumbnail; resolution is `<w>x<h>` with missing parts trimmed
    pub fn new(url: impl Into<String>, width: Option<u32>, height: Option<u32>) -> Self {
        let w = width.map(|w| w.to_string()).unwrap_or_default();
        let h = height.map(|h| h.to_string()).unwrap_or_default();
        Self {
            url: url.into(),
            width,
            height,
            resolution: format!("{}x{}", w, h).trim_matches('x').to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub subscribers: Option<String>,
    pub video_count: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_uses_short_link() {
        let stub = VideoStub::new("dQw4w9WgXcQ", "Never Gonna Give You Up");
        assert_eq!(stub.url, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_thumbnail_resolution_trims_missing_parts() {
        assert_eq!(Thumbnail::new("u", Some(120), Some(90)).resolution, "120x90");
        assert_eq!(Thumbnail::new("u", Some(120), None).resolution, "120");
        assert_eq!(Thumbnail::new("u", None, Some(90)).resolution, "90");
        assert_eq!(Thumbnail::new("u", None, None).resolution, "");
    }

    #[test]
    fn test_transcript_text_joins_with_spaces() {
        let snippets = vec![
            TranscriptSnippet {
                text: "hello".to_string(),
                start: 0.0,
                duration: 1.0,
            },
            TranscriptSnippet {
                text: "world".to_string(),
                start: 1.0,
                duration: 1.0,
            },
        ];
        assert_eq!(transcript_text(&snippets), "hello world");
    }
}
