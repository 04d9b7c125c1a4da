use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    error::AppError,
    models::{CandidateItem, FeedQuery, FeedResponse},
    services::{
        providers::{dedup_by_id, SearchContext, VideoProvider},
        relevance::{rank_by_affinity, spanish_affinity, TopicMatcher, PREFERRED_SCORE},
        script::has_non_latin_script,
        shuffle::seeded_shuffle,
    },
};

/// Minimum number of confidently-Spanish, on-topic items before the feed is
/// restricted to them. The effective bound is `max(this, limit / 2)`.
const MIN_PREFERRED: usize = 4;

/// Generates a shuffled short-video feed for a topic
///
/// Providers are tried in order; the first one returning a non-empty list feeds the
/// ranking stage. An error from the last provider attempted is reported as a degraded
/// (but still successful) response.
#[derive(Clone)]
pub struct RecommendationService {
    providers: Vec<Arc<dyn VideoProvider>>,
}

impl RecommendationService {
    pub fn new(providers: Vec<Arc<dyn VideoProvider>>) -> Self {
        Self { providers }
    }

    pub async fn recommend(&self, query: &FeedQuery, cancel: CancellationToken) -> FeedResponse {
        if query.is_empty() {
            return FeedResponse::default();
        }

        let matcher = TopicMatcher::new(&query.topic);
        let ctx = SearchContext::new(query.topic.clone(), query.limit, cancel);

        let mut last_error: Option<AppError> = None;

        for provider in &self.providers {
            match provider.fetch(&ctx).await {
                Ok(raw) if !raw.is_empty() => {
                    tracing::info!(
                        provider = provider.name(),
                        raw_count = raw.len(),
                        "Provider returned candidates"
                    );
                    let items = compose_feed(raw, &matcher, query.limit, query.seed);
                    return FeedResponse::items(items);
                }
                Ok(_) => {
                    tracing::info!(provider = provider.name(), "Provider returned no candidates");
                    last_error = None;
                }
                Err(AppError::Cancelled) => {
                    tracing::debug!(provider = provider.name(), "Request cancelled");
                    return FeedResponse::default();
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => FeedResponse::degraded(e.to_string()),
            None => FeedResponse::default(),
        }
    }
}

/// Ranks, filters and shuffles raw provider output into the final feed.
///
/// On-topic items come first, filler (off-topic) items after; each tier is shuffled
/// with the same seed so a given seed always reproduces the same feed.
///
/// Shuffling the tiers separately (rather than the whole pool at once) keeps filler
/// out of the truncated feed whenever enough on-topic items exist, at the cost of
/// never mixing filler in among them.
pub fn compose_feed(
    raw: Vec<CandidateItem>,
    matcher: &TopicMatcher,
    limit: usize,
    seed: u32,
) -> Vec<CandidateItem> {
    let latin: Vec<CandidateItem> = dedup_by_id(raw)
        .into_iter()
        .filter(|item| !has_non_latin_script(&item.search_text()))
        .collect();
    let ranked = rank_by_affinity(latin);

    let (topic_matched, filler): (Vec<_>, Vec<_>) =
        ranked.into_iter().partition(|item| matcher.matches(item));

    let preferred: Vec<CandidateItem> = topic_matched
        .iter()
        .filter(|item| spanish_affinity(item) >= PREFERRED_SCORE)
        .cloned()
        .collect();

    let chosen = if preferred.len() >= MIN_PREFERRED.max(limit / 2) {
        preferred
    } else {
        topic_matched
    };

    tracing::debug!(
        chosen = chosen.len(),
        filler = filler.len(),
        limit,
        "Composed candidate pool"
    );

    let mut feed = seeded_shuffle(&chosen, seed);
    feed.extend(seeded_shuffle(&filler, seed));

    let mut feed = dedup_by_id(feed);
    feed.truncate(limit);
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockVideoProvider;

    fn item(id: &str, title: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            title: title.to_string(),
            author_label: String::new(),
            published_label: String::new(),
            thumbnail_url: None,
            permalink: Some(CandidateItem::shorts_permalink(id)),
        }
    }

    fn query(topic: &str, limit: usize, seed: u32) -> FeedQuery {
        FeedQuery {
            topic: topic.to_string(),
            limit,
            seed,
        }
    }

    fn ids(items: &[CandidateItem]) -> Vec<String> {
        items.iter().map(|i| i.id.clone()).collect()
    }

    fn football_items() -> Vec<CandidateItem> {
        (0..10)
            .map(|i| item(&format!("gol{}", i), &format!("El mejor gol de la liga {}", i)))
            .collect()
    }

    fn unrelated_items() -> Vec<CandidateItem> {
        (0..10)
            .map(|i| item(&format!("misc{}", i), &format!("Cooking pasta tips {}", i)))
            .collect()
    }

    #[test]
    fn test_compose_prefers_relevant_spanish_items() {
        let mut raw = unrelated_items();
        raw.extend(football_items());

        let feed = compose_feed(raw, &TopicMatcher::new("futbol"), 5, 42);

        let expected: Vec<String> = ids(&seeded_shuffle(&football_items(), 42))
            .into_iter()
            .take(5)
            .collect();
        assert_eq!(ids(&feed), expected);
    }

    #[test]
    fn test_compose_is_deterministic_per_seed() {
        let mut raw = football_items();
        raw.extend(unrelated_items());

        let a = compose_feed(raw.clone(), &TopicMatcher::new("futbol"), 8, 7);
        let b = compose_feed(raw, &TopicMatcher::new("futbol"), 8, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_compose_drops_non_latin_and_duplicates() {
        // Strongly Spanish author, but the Cyrillic title still excludes it
        let cyrillic = CandidateItem {
            author_label: "Fútbol Latino en español".to_string(),
            ..item("b", "Гол Месси")
        };
        assert_eq!(spanish_affinity(&cyrillic), 8);

        let raw = vec![
            item("a", "Gol de Messi"),
            cyrillic,
            item("a", "Gol de Messi repetido"),
            item("c", "Golazo en la final"),
        ];

        let feed = compose_feed(raw, &TopicMatcher::new("futbol"), 10, 1);
        let mut got = ids(&feed);
        got.sort();
        assert_eq!(got, vec!["a", "c"]);
        assert!(feed.iter().all(|i| i.title != "Gol de Messi repetido"));
    }

    #[test]
    fn test_compose_falls_back_to_all_matches_when_few_preferred() {
        // Only one Spanish-scored on-topic item: below max(4, limit / 2)
        let raw = vec![
            item("es", "El gol del año"),
            item("en1", "Goles of the season"),
            item("en2", "Champions highlights"),
            item("off", "Cooking pasta"),
        ];

        let feed = compose_feed(raw, &TopicMatcher::new("soccer"), 10, 3);
        assert_eq!(feed.len(), 4);

        // the off-topic filler always trails the on-topic tier
        assert_eq!(feed.last().unwrap().id, "off");
    }

    #[test]
    fn test_compose_excludes_weak_matches_when_enough_preferred() {
        let mut raw = football_items();
        raw.push(item("weak", "Champions highlights"));
        raw.push(item("off", "Cooking pasta"));

        let feed = compose_feed(raw, &TopicMatcher::new("futbol"), 20, 9);

        // weak on-topic match is neither preferred nor filler
        assert!(feed.iter().all(|i| i.id != "weak"));
        assert_eq!(feed.len(), 11);
        assert_eq!(feed.last().unwrap().id, "off");
    }

    #[tokio::test]
    async fn test_empty_topic_skips_providers() {
        let mut provider = MockVideoProvider::new();
        provider.expect_fetch().times(0);
        provider.expect_name().return_const("mock");

        let service = RecommendationService::new(vec![Arc::new(provider)]);
        let response = service
            .recommend(&query("", 10, 1), CancellationToken::new())
            .await;

        assert!(response.items.is_empty());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_to_second_provider() {
        let mut first = MockVideoProvider::new();
        first
            .expect_fetch()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi { status: 503, body: "down".to_string() }));
        first.expect_name().return_const("first");

        let mut second = MockVideoProvider::new();
        second
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(football_items()));
        second.expect_name().return_const("second");

        let service = RecommendationService::new(vec![Arc::new(first), Arc::new(second)]);
        let response = service
            .recommend(&query("futbol", 5, 42), CancellationToken::new())
            .await;

        assert_eq!(response.items.len(), 5);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut first = MockVideoProvider::new();
        first
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(football_items()));
        first.expect_name().return_const("first");

        let mut second = MockVideoProvider::new();
        second.expect_fetch().times(0);
        second.expect_name().return_const("second");

        let service = RecommendationService::new(vec![Arc::new(first), Arc::new(second)]);
        let response = service
            .recommend(&query("futbol", 3, 1), CancellationToken::new())
            .await;

        assert_eq!(response.items.len(), 3);
    }

    #[tokio::test]
    async fn test_last_provider_failure_is_degraded() {
        let mut first = MockVideoProvider::new();
        first.expect_fetch().returning(|_| Ok(vec![]));
        first.expect_name().return_const("first");

        let mut second = MockVideoProvider::new();
        second
            .expect_fetch()
            .returning(|_| Err(AppError::Internal("parser exploded".to_string())));
        second.expect_name().return_const("second");

        let service = RecommendationService::new(vec![Arc::new(first), Arc::new(second)]);
        let response = service
            .recommend(&query("futbol", 5, 1), CancellationToken::new())
            .await;

        assert!(response.items.is_empty());
        assert_eq!(response.error.as_deref(), Some("youtube_fetch_failed"));
        assert!(response.detail.unwrap().contains("parser exploded"));
    }

    #[tokio::test]
    async fn test_all_empty_is_plain_empty() {
        let mut first = MockVideoProvider::new();
        first
            .expect_fetch()
            .returning(|_| Err(AppError::Internal("instance list down".to_string())));
        first.expect_name().return_const("first");

        let mut second = MockVideoProvider::new();
        second.expect_fetch().returning(|_| Ok(vec![]));
        second.expect_name().return_const("second");

        let service = RecommendationService::new(vec![Arc::new(first), Arc::new(second)]);
        let response = service
            .recommend(&query("futbol", 5, 1), CancellationToken::new())
            .await;

        assert!(response.items.is_empty());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_request_stops_chain() {
        let mut first = MockVideoProvider::new();
        first.expect_fetch().returning(|_| Err(AppError::Cancelled));
        first.expect_name().return_const("first");

        let mut second = MockVideoProvider::new();
        second.expect_fetch().times(0);
        second.expect_name().return_const("second");

        let service = RecommendationService::new(vec![Arc::new(first), Arc::new(second)]);
        let response = service
            .recommend(&query("futbol", 5, 1), CancellationToken::new())
            .await;

        assert!(response.items.is_empty());
        assert!(response.error.is_none());
    }
}
