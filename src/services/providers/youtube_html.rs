/// YouTube search page provider
///
/// Scrapes the public results page for a few differently-worded queries, each
/// restricted to Shorts with a Spanish locale hint, and concatenates what every
/// variant yields. Results come from the `ytInitialData` blob embedded in the page.
use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, ACCEPT_LANGUAGE},
    Client as HttpClient,
};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::CandidateItem,
    services::providers::{
        cancellable,
        embedded_json::{collect_nodes, find_initial_data, first_text, search_root},
        pick_thumbnail, SearchContext, VideoProvider,
    },
};

/// Search filter parameter selecting Shorts
const SHORTS_FILTER: &str = "EgZzaG9ydH";
const ACCEPT_LANGUAGE_ES: &str = "es-ES,es;q=0.9,en;q=0.8";
const RAW_LIMIT_FACTOR: usize = 6;
const RAW_LIMIT_CAP: usize = 80;

const REEL_KEY: &str = "reelItemRenderer";
const VIDEO_KEY: &str = "videoRenderer";

#[derive(Clone)]
pub struct YoutubeHtmlProvider {
    http_client: HttpClient,
    base_url: String,
}

impl YoutubeHtmlProvider {
    pub fn new(http_client: HttpClient, base_url: String) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    /// Query phrasings fetched for every request, for diversity
    fn query_variants(ctx: &SearchContext) -> [String; 3] {
        let base = ctx.shorts_query();
        [
            base.clone(),
            format!("{} en español", base),
            format!("{} latam", base),
        ]
    }

    async fn fetch_page(&self, ctx: &SearchContext, query: &str) -> AppResult<String> {
        let url = format!("{}/results", self.base_url.trim_end_matches('/'));

        cancellable(&ctx.cancel, async {
            let response = self
                .http_client
                .get(&url)
                .header(ACCEPT, "text/html")
                .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_ES)
                .query(&[
                    ("search_query", query),
                    ("sp", SHORTS_FILTER),
                    ("hl", "es"),
                    ("gl", "ES"),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                tracing::debug!(status = %response.status(), "Search page returned non-success status");
            }

            Ok(response.text().await?)
        })
        .await
    }
}

#[async_trait]
impl VideoProvider for YoutubeHtmlProvider {
    async fn fetch(&self, ctx: &SearchContext) -> AppResult<Vec<CandidateItem>> {
        let raw_limit = raw_limit(ctx.limit);
        let mut all = Vec::new();
        let mut last_error = None;
        let mut fetched_any = false;

        for query in Self::query_variants(ctx) {
            let html = match self.fetch_page(ctx, &query).await {
                Ok(html) => html,
                Err(AppError::Cancelled) => return Err(AppError::Cancelled),
                Err(e) => {
                    tracing::warn!(provider = self.name(), query = %query, error = %e, "Search page fetch failed");
                    last_error = Some(e);
                    continue;
                }
            };
            fetched_any = true;

            let items = parse_results_page(&html, raw_limit);
            tracing::debug!(provider = self.name(), query = %query, count = items.len(), "Parsed search page");
            all.extend(items);
        }

        match last_error {
            Some(e) if !fetched_any => Err(e),
            _ => Ok(all),
        }
    }

    fn name(&self) -> &'static str {
        "youtube_html"
    }
}

/// Per-variant cap on collected items
fn raw_limit(limit: usize) -> usize {
    (limit * RAW_LIMIT_FACTOR).min(RAW_LIMIT_CAP)
}

/// Extracts items from one results page, preferring Shorts over regular videos
pub fn parse_results_page(html: &str, limit: usize) -> Vec<CandidateItem> {
    let Some(data) = find_initial_data(html) else {
        return Vec::new();
    };
    let root = search_root(&data);

    let reels = collect_nodes(root, REEL_KEY, limit, reel_item);
    if !reels.is_empty() {
        return reels;
    }
    collect_nodes(root, VIDEO_KEY, limit, video_item)
}

fn video_id(node: &Value) -> Option<&str> {
    node.get("videoId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn reel_item(node: &Value) -> Option<CandidateItem> {
    let id = video_id(node)?;

    let mut title = first_text(node, &["headline", "title"]);
    if title.is_empty() {
        title = "YouTube Short".to_string();
    }

    Some(CandidateItem {
        id: id.to_string(),
        title,
        author_label: first_text(node, &["shortBylineText", "ownerText", "longBylineText"]),
        published_label: String::new(),
        thumbnail_url: node.get("thumbnail").and_then(pick_thumbnail),
        permalink: Some(CandidateItem::shorts_permalink(id)),
    })
}

fn video_item(node: &Value) -> Option<CandidateItem> {
    let id = video_id(node)?;

    let mut title = first_text(node, &["title"]);
    if title.is_empty() {
        title = "YouTube Video".to_string();
    }

    Some(CandidateItem {
        id: id.to_string(),
        title,
        author_label: first_text(node, &["ownerText", "shortBylineText"]),
        published_label: String::new(),
        thumbnail_url: node.get("thumbnail").and_then(pick_thumbnail),
        permalink: Some(CandidateItem::watch_permalink(id)),
    })
}
