//! Parsing of YouTube web pages
//!
//! Watch, search and channel pages embed their state as JSON assigned to
//! `ytInitialPlayerResponse` and `ytInitialData`. Everything here works on
//! those blobs and never touches the network.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    Chapter, ChannelInfo, Thumbnail, TranscriptLanguage, TranscriptSnippet, VideoMetadata, VideoStub, YouTubeError,
};

const PLAYER_MARKERS: &[&str] = &["var ytInitialPlayerResponse = ", "ytInitialPlayerResponse = "];
const DATA_MARKERS: &[&str] = &["var ytInitialData = ", "window[\"ytInitialData\"] = ", "ytInitialData = "];

/// Extract the JSON object assigned right after `marker`
///
/// Scans balanced braces, skipping over string literals, so trailing script
/// text after the object is ignored.
pub(crate) fn extract_json_after(html: &str, marker: &str) -> Option<Value> {
    let start = html.find(marker)? + marker.len();
    let body = html[start..].trim_start();
    if !body.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return serde_json::from_str(&body[..=i]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn extract_first(html: &str, markers: &[&str]) -> Option<Value> {
    markers.iter().find_map(|m| extract_json_after(html, m))
}

/// Depth-first search for the first value stored under `key`
pub(crate) fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// Every value stored under `key`, in document order
pub(crate) fn collect_key<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                } else {
                    collect_key(v, key, out);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_key(v, key, out)),
        _ => {}
    }
}

/// Text of a YouTube text node: `simpleText`, `runs[].text`, `content` or a plain string
pub(crate) fn text_of(value: &Value) -> Option<String> {
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    if let Some(s) = value.get("simpleText").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    if let Some(runs) = value.get("runs").and_then(Value::as_array) {
        let text: String = runs.iter().filter_map(|r| r.get("text").and_then(Value::as_str)).collect();
        return Some(text);
    }
    value.get("content").and_then(Value::as_str).map(str::to_string)
}

/// First string anywhere in the tree that ends with `suffix`
fn find_string_with_suffix(value: &Value, suffix: &str) -> Option<String> {
    match value {
        Value::String(s) if s.ends_with(suffix) => Some(s.clone()),
        Value::Object(map) => map.values().find_map(|v| find_string_with_suffix(v, suffix)),
        Value::Array(items) => items.iter().find_map(|v| find_string_with_suffix(v, suffix)),
        _ => None,
    }
}

/// Parse counts like `12,345`, `1.2K` or `3M views`
pub(crate) fn parse_count(text: &str) -> Option<u64> {
    let token = text.split_whitespace().next()?.replace(',', "");
    let (number, multiplier) = match token.chars().last()? {
        'K' | 'k' => (&token[..token.len() - 1], 1_000.0),
        'M' | 'm' => (&token[..token.len() - 1], 1_000_000.0),
        'B' | 'b' => (&token[..token.len() - 1], 1_000_000_000.0),
        _ => (token.as_str(), 1.0),
    };
    let value: f64 = number.parse().ok()?;
    Some((value * multiplier).round() as u64)
}

/// Caption track listed in the player response
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language: String,
    pub language_code: String,
    pub is_generated: bool,
}

impl CaptionTrack {
    pub fn to_language(&self) -> TranscriptLanguage {
        TranscriptLanguage {
            language: self.language.clone(),
            language_code: self.language_code.clone(),
            is_generated: self.is_generated,
        }
    }
}

/// Pick the track for `language`, preferring a manual track over auto-generated
pub fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| !t.is_generated && t.language_code.eq_ignore_ascii_case(language))
        .or_else(|| tracks.iter().find(|t| t.language_code.eq_ignore_ascii_case(language)))
}

/// Parsed watch page
#[derive(Debug)]
pub struct WatchPage {
    video_id: String,
    player: Value,
    initial_data: Value,
}

impl WatchPage {
    pub fn parse(html: &str, video_id: &str) -> Result<Self, YouTubeError> {
        debug!(%video_id, html_len = %html.len(), "WatchPage::parse: called");
        let player = extract_first(html, PLAYER_MARKERS)
            .ok_or_else(|| YouTubeError::Parse(format!("no player response on watch page for {}", video_id)))?;

        if player.get("videoDetails").is_none() {
            let reason = player
                .pointer("/playabilityStatus/reason")
                .and_then(Value::as_str)
                .unwrap_or("no video details");
            debug!(%video_id, %reason, "WatchPage::parse: video unavailable");
            return Err(YouTubeError::VideoNotFound(format!("{} ({})", video_id, reason)));
        }

        Ok(Self {
            video_id: video_id.to_string(),
            player,
            initial_data: extract_first(html, DATA_MARKERS).unwrap_or(Value::Null),
        })
    }

    fn detail(&self, field: &str) -> Option<&Value> {
        self.player.get("videoDetails").and_then(|d| d.get(field))
    }

    fn detail_u64(&self, field: &str) -> Option<u64> {
        self.detail(field)
            .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_u64().map(|n| n.to_string())))
            .and_then(|s| s.parse().ok())
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn channel_id(&self) -> Option<String> {
        self.detail("channelId").and_then(Value::as_str).map(str::to_string)
    }

    pub fn metadata(&self) -> VideoMetadata {
        let duration = self.detail_u64("lengthSeconds");
        VideoMetadata {
            title: self.detail("title").and_then(Value::as_str).map(str::to_string),
            views: self.detail_u64("viewCount"),
            duration,
            channel: self.detail("author").and_then(Value::as_str).map(str::to_string),
            likes: find_key(&self.initial_data, "likeCountIfIndifferentNumber")
                .and_then(text_of)
                .and_then(|s| parse_count(&s)),
            comments: find_key(&self.initial_data, "commentCount")
                .and_then(text_of)
                .and_then(|s| parse_count(&s)),
            chapters: self.chapters(duration),
        }
    }

    fn chapters(&self, duration: Option<u64>) -> Vec<Chapter> {
        let mut renderers = Vec::new();
        collect_key(&self.initial_data, "chapterRenderer", &mut renderers);

        let mut starts: Vec<(String, f64)> = renderers
            .into_iter()
            .filter_map(|r| {
                let title = r.get("title").and_then(text_of)?;
                let start_ms = r.get("timeRangeStartMillis").and_then(Value::as_u64)?;
                Some((title, start_ms as f64 / 1000.0))
            })
            .collect();
        starts.sort_by(|a, b| a.1.total_cmp(&b.1));
        starts.dedup_by(|a, b| a.1 == b.1 && a.0 == b.0);

        let ends: Vec<Option<f64>> = starts
            .iter()
            .skip(1)
            .map(|(_, start)| Some(*start))
            .chain(std::iter::once(duration.map(|d| d as f64)))
            .collect();

        starts
            .into_iter()
            .zip(ends)
            .map(|((title, start_time), end_time)| Chapter {
                title,
                start_time,
                end_time,
            })
            .collect()
    }

    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        #[derive(Deserialize)]
        struct RawThumb {
            url: Option<String>,
            width: Option<u32>,
            height: Option<u32>,
        }

        self.detail("thumbnail")
            .and_then(|t| t.get("thumbnails"))
            .cloned()
            .and_then(|v| serde_json::from_value::<Vec<RawThumb>>(v).ok())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|t| t.url.map(|url| Thumbnail::new(url, t.width, t.height)))
            .collect()
    }

    pub fn caption_tracks(&self) -> Vec<CaptionTrack> {
        let tracks = self
            .player
            .pointer("/captions/playerCaptionsTracklistRenderer/captionTracks")
            .and_then(Value::as_array);

        tracks
            .map(|tracks| {
                tracks
                    .iter()
                    .filter_map(|t| {
                        let language_code = t.get("languageCode").and_then(Value::as_str)?.to_string();
                        Some(CaptionTrack {
                            base_url: t.get("baseUrl").and_then(Value::as_str)?.to_string(),
                            language: t.get("name").and_then(text_of).unwrap_or_else(|| language_code.clone()),
                            is_generated: t.get("kind").and_then(Value::as_str) == Some("asr"),
                            language_code,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse search results out of a results page
pub fn parse_search_results(html: &str, limit: usize) -> Result<Vec<VideoStub>, YouTubeError> {
    debug!(html_len = %html.len(), %limit, "parse_search_results: called");
    let data = extract_first(html, DATA_MARKERS)
        .ok_or_else(|| YouTubeError::Parse("no initial data on search results page".to_string()))?;

    let mut renderers = Vec::new();
    collect_key(&data, "videoRenderer", &mut renderers);

    let mut stubs: Vec<VideoStub> = Vec::new();
    for r in renderers {
        let Some(video_id) = r.get("videoId").and_then(Value::as_str) else {
            continue;
        };
        if stubs.iter().any(|s| s.video_id == video_id) {
            continue;
        }
        let title = r.get("title").and_then(text_of).unwrap_or_default();
        stubs.push(VideoStub::new(video_id, title));
        if stubs.len() >= limit {
            break;
        }
    }

    Ok(stubs)
}

/// Parse channel details out of a channel page
pub fn parse_channel_page(html: &str) -> Result<ChannelInfo, YouTubeError> {
    debug!(html_len = %html.len(), "parse_channel_page: called");
    let data = extract_first(html, DATA_MARKERS)
        .ok_or_else(|| YouTubeError::Parse("no initial data on channel page".to_string()))?;

    let meta = data
        .pointer("/metadata/channelMetadataRenderer")
        .ok_or_else(|| YouTubeError::Parse("channel page has no channel metadata".to_string()))?;
    let field = |name: &str| meta.get(name).and_then(Value::as_str).unwrap_or_default().to_string();

    let header = data.get("header").unwrap_or(&Value::Null);
    let subscribers = find_key(header, "subscriberCountText")
        .and_then(text_of)
        .or_else(|| find_string_with_suffix(header, " subscribers"));
    let video_count = find_key(header, "videosCountText")
        .and_then(text_of)
        .or_else(|| find_string_with_suffix(header, " videos"));

    Ok(ChannelInfo {
        channel_id: field("externalId"),
        title: field("title"),
        description: field("description"),
        url: field("channelUrl"),
        subscribers,
        video_count,
    })
}

/// Parse a `fmt=json3` timed-text document
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSnippet>, YouTubeError> {
    #[derive(Deserialize)]
    struct TimedText {
        #[serde(default)]
        events: Vec<Event>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Event {
        #[serde(default)]
        t_start_ms: u64,
        #[serde(default)]
        d_duration_ms: u64,
        segs: Option<Vec<Seg>>,
    }

    #[derive(Deserialize)]
    struct Seg {
        #[serde(default)]
        utf8: String,
    }

    let doc: TimedText = serde_json::from_str(body)?;
    Ok(doc
        .events
        .into_iter()
        .filter_map(|e| {
            let text: String = e.segs?.into_iter().map(|s| s.utf8).collect();
            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSnippet {
                text,
                start: e.t_start_ms as f64 / 1000.0,
                duration: e.d_duration_ms as f64 / 1000.0,
            })
        })
        .collect())
}
