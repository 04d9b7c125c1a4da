use chrono::Utc;
use serde::{Deserialize, Serialize};

pub mod discord;

pub use discord::{
    DiscordChannel, DiscordConnection, DiscordGuild, DiscordUser, OAuthTokens, PostedMessage,
};

/// Upper bound on the number of items a single feed response may carry
pub const MAX_LIMIT: usize = 20;

/// Page size used when the caller omits `limit` or sends garbage
pub const DEFAULT_LIMIT: usize = 10;

/// A single short-form video flowing through the recommendation pipeline
///
/// Field names on the wire are fixed for compatibility with the existing feed consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateItem {
    /// Upstream video identifier, primary dedup key
    pub id: String,
    pub title: String,
    /// Channel or creator display name
    #[serde(rename = "channelTitle")]
    pub author_label: String,
    /// Free-text publication hint ("hace 3 días"), never parsed
    #[serde(rename = "publishedAt")]
    pub published_label: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "url")]
    pub permalink: Option<String>,
}

impl CandidateItem {
    /// Text used for scoring, script detection and topic matching
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.author_label)
    }

    pub fn shorts_permalink(video_id: &str) -> String {
        format!("https://www.youtube.com/shorts/{}", video_id)
    }

    pub fn watch_permalink(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }
}

/// Raw query string of the recommendations endpoint
///
/// Everything is kept as a string so malformed numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationParams {
    pub topic: Option<String>,
    pub limit: Option<String>,
    pub seed: Option<String>,
}

/// Validated request parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    /// Trimmed topic; empty means "nothing to recommend"
    pub topic: String,
    /// Always within `1..=MAX_LIMIT`
    pub limit: usize,
    pub seed: u32,
}

impl FeedQuery {
    pub fn from_params(params: &RecommendationParams) -> Self {
        let topic = params
            .topic
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let limit = params
            .limit
            .as_deref()
            .and_then(parse_integer)
            .map(clamp_limit)
            .unwrap_or(DEFAULT_LIMIT);

        let seed = params
            .seed
            .as_deref()
            .and_then(parse_integer)
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        Self {
            topic,
            limit,
            seed: seed_to_state(seed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topic.is_empty()
    }
}

/// Clamps a caller-supplied limit into `1..=MAX_LIMIT`
pub fn clamp_limit(raw: i64) -> usize {
    raw.clamp(1, MAX_LIMIT as i64) as usize
}

/// Reduces an integer seed to the 32-bit generator state, wrapping modulo 2^32
pub fn seed_to_state(seed: i64) -> u32 {
    seed as u32
}

/// Accepts plain integers and finite decimals (truncated toward zero)
fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.trunc() as i64)
    })
}

/// Body of the recommendations endpoint, always served with status 200
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeedResponse {
    pub items: Vec<CandidateItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Diagnostic code attached to a degraded feed response
pub const FETCH_FAILED: &str = "youtube_fetch_failed";

impl FeedResponse {
    pub fn items(items: Vec<CandidateItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn degraded(detail: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            error: Some(FETCH_FAILED.to_string()),
            detail: Some(detail.into()),
        }
    }
}
