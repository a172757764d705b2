//! YouTube source backed by the public web frontend

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, warn};

use super::page::{self, WatchPage};
use super::{
    ChannelInfo, Thumbnail, TranscriptLanguage, TranscriptSnippet, VideoMetadata, VideoStub, YouTubeError,
    YouTubeSource, resolve_video_id,
};
use crate::config::YouTubeConfig;

/// Where a channel lookup should go
#[derive(Debug, PartialEq)]
enum ChannelTarget {
    /// Path on the frontend, e.g. `/@handle` or `/channel/UC...`
    Path(String),
    /// Video whose uploader should be looked up
    Video(String),
}

fn channel_target(target: &str) -> Result<ChannelTarget, YouTubeError> {
    let t = target.trim();
    if t.starts_with('@') {
        return Ok(ChannelTarget::Path(format!("/{}", t)));
    }
    if t.starts_with("UC") && t.len() == 24 && !t.contains('/') {
        return Ok(ChannelTarget::Path(format!("/channel/{}", t)));
    }
    for marker in ["/channel/", "/@", "/c/", "/user/"] {
        if let Some(idx) = t.find(marker) {
            let path = t[idx..].split(['?', '#']).next().unwrap_or_default();
            return Ok(ChannelTarget::Path(path.to_string()));
        }
    }
    resolve_video_id(t).map(ChannelTarget::Video)
}

/// Scrapes www.youtube.com (or a configured mirror)
pub struct WebYouTube {
    http: Client,
    base_url: String,
}

impl WebYouTube {
    pub fn from_config(config: &YouTubeConfig) -> Result<Self, YouTubeError> {
        debug!(base_url = %config.base_url, "WebYouTube::from_config: called");
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        // Skips the EU consent interstitial
        headers.insert(COOKIE, HeaderValue::from_static("CONSENT=YES+1"));

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, YouTubeError> {
        debug!(%url, "get_text: called");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = %status.as_u16(), "get_text: non-success status");
            return Err(YouTubeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    async fn watch_page(&self, video_id: &str) -> Result<WatchPage, YouTubeError> {
        let url = format!("{}/watch", self.base_url);
        let html = match self.get_text(&url, &[("v", video_id)]).await {
            Err(YouTubeError::Status { status: 404, .. }) => {
                return Err(YouTubeError::VideoNotFound(video_id.to_string()));
            }
            other => other?,
        };
        WatchPage::parse(&html, video_id)
    }

    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl YouTubeSource for WebYouTube {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoStub>, YouTubeError> {
        debug!(%query, %limit, "WebYouTube::search: called");
        let url = format!("{}/results", self.base_url);
        let html = self.get_text(&url, &[("search_query", query)]).await?;
        page::parse_search_results(&html, limit)
    }

    async fn transcript(&self, video_id: &str, language: &str) -> Result<Vec<TranscriptSnippet>, YouTubeError> {
        debug!(%video_id, %language, "WebYouTube::transcript: called");
        let watch = self.watch_page(video_id).await?;
        let tracks = watch.caption_tracks();
        let not_found = || YouTubeError::TranscriptNotFound {
            video_id: video_id.to_string(),
            language: language.to_string(),
        };
        let track = page::select_track(&tracks, language).ok_or_else(not_found)?;

        let url = self.absolute(&track.base_url);
        let body = self.get_text(&url, &[("fmt", "json3")]).await?;
        let snippets = page::parse_json3(&body)?;
        if snippets.is_empty() {
            warn!(%video_id, %language, "WebYouTube::transcript: caption track is empty");
            return Err(not_found());
        }
        Ok(snippets)
    }

    async fn transcript_languages(&self, video_id: &str) -> Result<Vec<TranscriptLanguage>, YouTubeError> {
        debug!(%video_id, "WebYouTube::transcript_languages: called");
        let watch = self.watch_page(video_id).await?;
        Ok(watch.caption_tracks().iter().map(|t| t.to_language()).collect())
    }

    async fn metadata(&self, video_id: &str) -> Result<VideoMetadata, YouTubeError> {
        debug!(%video_id, "WebYouTube::metadata: called");
        Ok(self.watch_page(video_id).await?.metadata())
    }

    async fn thumbnails(&self, video_id: &str) -> Result<Vec<Thumbnail>, YouTubeError> {
        debug!(%video_id, "WebYouTube::thumbnails: called");
        Ok(self.watch_page(video_id).await?.thumbnails())
    }

    async fn channel(&self, target: &str) -> Result<ChannelInfo, YouTubeError> {
        debug!(%target, "WebYouTube::channel: called");
        let path = match channel_target(target)? {
            ChannelTarget::Path(path) => path,
            ChannelTarget::Video(video_id) => {
                let watch = self.watch_page(&video_id).await?;
                let channel_id = watch
                    .channel_id()
                    .ok_or_else(|| YouTubeError::Parse(format!("no channel id for video {}", watch.video_id())))?;
                format!("/channel/{}", channel_id)
            }
        };

        let url = format!("{}{}", self.base_url, path);
        let html = self.get_text(&url, &[]).await?;
        page::parse_channel_page(&html)
    }
}
