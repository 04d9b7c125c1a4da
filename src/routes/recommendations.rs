use axum::{
    extract::{Query, State},
    http::header::{CACHE_CONTROL, EXPIRES, PRAGMA},
    response::IntoResponse,
    Extension, Json,
};
use tokio_util::sync::CancellationToken;

use crate::{
    middleware::RequestId,
    models::{FeedQuery, RecommendationParams},
    routes::AppState,
};

/// Results are randomized per seed, so no intermediary may cache them
const NO_STORE: [(axum::http::HeaderName, &str); 3] = [
    (CACHE_CONTROL, "no-store, no-cache, must-revalidate, proxy-revalidate"),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];

/// Handler for the short-video recommendations feed
///
/// Always answers 200 with an `items` array; upstream trouble shows up as an empty
/// list, optionally with `error`/`detail` diagnostics.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationParams>,
) -> impl IntoResponse {
    let query = FeedQuery::from_params(&params);

    tracing::info!(
        request_id = %request_id,
        topic = %query.topic,
        limit = query.limit,
        seed = query.seed,
        "Processing recommendations request"
    );

    // Dropping the handler (client went away) cancels every upstream call
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let response = state.recommendations.recommend(&query, cancel).await;

    tracing::info!(
        request_id = %request_id,
        count = response.items.len(),
        degraded = response.error.is_some(),
        "Recommendations served"
    );

    (NO_STORE, Json(response))
}
