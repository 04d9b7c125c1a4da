/// Invidious provider
///
/// Queries the public directory of community-run Invidious instances (ranked by
/// health) and fails over across them. Each instance is searched page by page
/// until enough distinct items are collected; the first instance that yields
/// anything wins.
///
/// API Flow:
/// 1. Directory: `instances.json?sort_by=health` → `[[host, {uri, api, ..}], ..]`
/// 2. Search: `{uri}/api/v1/search?q=..&type=video&sort_by=publish_date&page=N`
use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client as HttpClient};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::CandidateItem,
    services::providers::{
        cancellable, dedup_by_id, expect_json, pick_thumbnail, SearchContext, VideoProvider,
    },
};

const PAGES: [u32; 3] = [1, 2, 3];
const MAX_RECORDS_PER_PAGE: usize = 60;
/// Stop paging an instance once this many times `limit` distinct items are in hand
const ENOUGH_FACTOR: usize = 4;
const DEFAULT_TITLE: &str = "YouTube Video";

/// A single search hit as returned by `/api/v1/search`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousVideo {
    video_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    published_text: Option<String>,
    #[serde(default)]
    video_thumbnails: Value,
}

impl From<InvidiousVideo> for CandidateItem {
    fn from(video: InvidiousVideo) -> Self {
        let title = video
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        CandidateItem {
            permalink: Some(CandidateItem::shorts_permalink(&video.video_id)),
            thumbnail_url: pick_thumbnail(&video.video_thumbnails),
            id: video.video_id,
            title,
            author_label: video.author.unwrap_or_default(),
            published_label: video.published_text.unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct InvidiousProvider {
    http_client: HttpClient,
    directory_url: String,
    max_instances: usize,
}

impl InvidiousProvider {
    pub fn new(http_client: HttpClient, directory_url: String, max_instances: usize) -> Self {
        Self {
            http_client,
            directory_url,
            max_instances,
        }
    }

    /// Fetch the health-ranked instance directory and pick API-enabled candidates
    async fn fetch_instances(&self, ctx: &SearchContext) -> AppResult<Vec<String>> {
        let directory = cancellable(&ctx.cancel, async {
            let response = self
                .http_client
                .get(&self.directory_url)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            expect_json(response).await
        })
        .await?;

        let instances = parse_instances(&directory, self.max_instances);

        tracing::debug!(
            provider = self.name(),
            instance_count = instances.len(),
            "Loaded instance directory"
        );

        Ok(instances)
    }

    /// Fetch one page of search results from one instance
    async fn search_page(
        &self,
        ctx: &SearchContext,
        base: &str,
        page: u32,
    ) -> AppResult<Vec<CandidateItem>> {
        let url = format!("{}/api/v1/search", base.trim_end_matches('/'));
        let query = ctx.shorts_query();
        let page = page.to_string();

        let body = cancellable(&ctx.cancel, async {
            let response = self
                .http_client
                .get(&url)
                .header(ACCEPT, "application/json")
                .query(&[
                    ("q", query.as_str()),
                    ("type", "video"),
                    ("sort_by", "publish_date"),
                    ("page", page.as_str()),
                ])
                .send()
                .await?;
            expect_json(response).await
        })
        .await?;

        parse_search_page(&body)
    }

    /// Page through one instance, stopping early once enough items are collected
    async fn search_instance(
        &self,
        ctx: &SearchContext,
        base: &str,
    ) -> AppResult<Vec<CandidateItem>> {
        let enough = ctx.limit * ENOUGH_FACTOR;
        let mut collected = Vec::new();

        for page in PAGES {
            match self.search_page(ctx, base, page).await {
                Ok(mut items) => {
                    collected.append(&mut items);
                    if dedup_by_id(collected.clone()).len() >= enough {
                        break;
                    }
                }
                Err(AppError::Cancelled) => return Err(AppError::Cancelled),
                Err(e) => {
                    tracing::debug!(
                        provider = self.name(),
                        instance = %base,
                        page,
                        error = %e,
                        "Search page failed, continuing"
                    );
                }
            }
        }

        Ok(dedup_by_id(collected))
    }
}

#[async_trait]
impl VideoProvider for InvidiousProvider {
    async fn fetch(&self, ctx: &SearchContext) -> AppResult<Vec<CandidateItem>> {
        let instances = self.fetch_instances(ctx).await?;

        for base in &instances {
            let items = self.search_instance(ctx, base).await?;
            if !items.is_empty() {
                tracing::info!(
                    provider = self.name(),
                    instance = %base,
                    count = items.len(),
                    "Instance returned results"
                );
                return Ok(items);
            }
            tracing::debug!(provider = self.name(), instance = %base, "Instance returned nothing");
        }

        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "invidious"
    }
}

/// Picks up to `max` instance URIs from the directory, in directory order.
///
/// Rows look like `["host", {"uri": "https://..", "api": true, ..}]`; only rows with
/// a truthy `api` flag and an http(s) `uri` qualify.
fn parse_instances(directory: &Value, max: usize) -> Vec<String> {
    let Some(rows) = directory.as_array() else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let meta = row.get(1)?;
            let uri = meta.get("uri")?.as_str()?;
            let api_enabled = meta.get("api").is_some_and(is_truthy);
            (api_enabled && uri.starts_with("http")).then(|| uri.to_string())
        })
        .take(max)
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Maps a search response into items, skipping malformed records
fn parse_search_page(body: &Value) -> AppResult<Vec<CandidateItem>> {
    let records = body
        .as_array()
        .ok_or_else(|| AppError::Internal("search response is not an array".to_string()))?;

    Ok(records
        .iter()
        .filter(|r| r.get("videoId").is_some_and(Value::is_string))
        .take(MAX_RECORDS_PER_PAGE)
        .filter_map(|r| serde_json::from_value::<InvidiousVideo>(r.clone()).ok())
        .map(CandidateItem::from)
        .collect())
}
