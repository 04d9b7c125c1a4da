/// Short-form video providers
///
/// Each provider turns one upstream data source into `CandidateItem`s. Providers are
/// chained by the recommendation pipeline, never by each other: an error or an empty
/// list from one simply hands the request to the next provider in line.
use std::{future::Future, time::Duration};

use reqwest::{header::CONTENT_TYPE, Client as HttpClient, Response};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::CandidateItem,
};

pub mod embedded_json;
pub mod invidious;
pub mod youtube_html;

pub use invidious::InvidiousProvider;
pub use youtube_html::YoutubeHtmlProvider;

/// Everything a provider needs to serve one feed request
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub topic: String,
    pub limit: usize,
    /// Cancelled when the inbound request goes away
    pub cancel: CancellationToken,
}

impl SearchContext {
    pub fn new(topic: impl Into<String>, limit: usize, cancel: CancellationToken) -> Self {
        Self {
            topic: topic.into(),
            limit,
            cancel,
        }
    }

    /// Search phrase biased toward short-form results
    pub fn shorts_query(&self) -> String {
        format!("{} shorts", self.topic)
    }
}

/// Trait for short-form video providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VideoProvider: Send + Sync {
    /// Fetch candidate items for the context's topic
    ///
    /// `Ok(vec![])` means the source answered but had nothing usable; `Err` means the
    /// source could not be reached or parsed at all.
    async fn fetch(&self, ctx: &SearchContext) -> AppResult<Vec<CandidateItem>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Builds the HTTP client shared by all providers
///
/// Upstreams are unofficial endpoints with unbounded latency, so every call carries
/// the configured timeout.
pub fn build_http_client(config: &Config) -> AppResult<HttpClient> {
    HttpClient::builder()
        .timeout(Duration::from_secs(config.upstream_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(AppError::from)
}

/// Runs `fut` unless the request is cancelled first
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}

/// True for 2xx responses that declare a JSON body
pub(crate) fn is_json_ok(response: &Response) -> bool {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    response.status().is_success() && is_json
}

/// Converts a non-JSON or failed response into an `ExternalApi` error
pub(crate) async fn expect_json(response: Response) -> AppResult<Value> {
    if !is_json_ok(&response) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ExternalApi { status, body });
    }
    Ok(response.json::<Value>().await?)
}

/// URL of the best (last) variant in a thumbnail list
///
/// Accepts either a bare array of `{url}` objects or an object wrapping one under
/// `thumbnails`.
pub fn pick_thumbnail(thumbnails: &Value) -> Option<String> {
    let list = thumbnails
        .get("thumbnails")
        .unwrap_or(thumbnails)
        .as_array()?;

    list.last()?
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Removes items without an id and repeated ids, keeping first occurrences in order
pub fn dedup_by_id(items: Vec<CandidateItem>) -> Vec<CandidateItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.id.is_empty() && seen.insert(item.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, title: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            title: title.to_string(),
            author_label: String::new(),
            published_label: String::new(),
            thumbnail_url: None,
            permalink: None,
        }
    }

    #[test]
    fn test_pick_thumbnail_shapes() {
        let wrapped = json!({"thumbnails": [{"url": "small"}, {"url": "large"}]});
        assert_eq!(pick_thumbnail(&wrapped), Some("large".to_string()));

        let bare = json!([{"url": "only"}]);
        assert_eq!(pick_thumbnail(&bare), Some("only".to_string()));

        assert_eq!(pick_thumbnail(&json!([])), None);
        assert_eq!(pick_thumbnail(&json!([{"width": 10}])), None);
        assert_eq!(pick_thumbnail(&Value::Null), None);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let out = dedup_by_id(vec![
            item("a", "first a"),
            item("b", "first b"),
            item("a", "second a"),
            item("", "no id"),
            item("c", "c"),
            item("b", "second b"),
        ]);

        let ids: Vec<&str> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(out[0].title, "first a");
        assert_eq!(out[1].title, "first b");
    }

    #[test]
    fn test_shorts_query() {
        let ctx = SearchContext::new("recetas", 5, CancellationToken::new());
        assert_eq!(ctx.shorts_query(), "recetas shorts");
    }

    #[test]
    fn test_cancellable_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: AppResult<u8> = tokio_test::block_on(cancellable(
            &cancel,
            std::future::pending::<AppResult<u8>>(),
        ));
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancellable_passes_result_through() {
        let cancel = CancellationToken::new();
        let result = cancellable(&cancel, async { Ok::<_, AppError>(7u8) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
