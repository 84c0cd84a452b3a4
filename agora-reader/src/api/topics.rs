//! Topic read endpoints
//!
//! Every successful response carries the revalidation window as a
//! `Cache-Control` header for whatever cache sits in front of the reader.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::assembler::DEFAULT_TOPIC_LIMIT;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Upper bound the record store accepts for `maxRecords` on one page
const MAX_TOPIC_LIMIT: usize = 100;

/// Query parameters for topic listing
#[derive(Debug, Deserialize)]
pub struct TopicListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_TOPIC_LIMIT
}

/// GET /api/topics
///
/// Newest topics with normalized hashtags.
pub async fn list_topics(
    State(state): State<AppState>,
    Query(query): Query<TopicListQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.clamp(1, MAX_TOPIC_LIMIT);
    let topics = state.pipeline.list_topics(limit).await?;

    Ok((
        [(header::CACHE_CONTROL, state.revalidation.cache_control())],
        Json(topics),
    ))
}

/// GET /api/topics/:id
///
/// Topic view model with viewpoints grouped by stance; 404 when the topic
/// does not exist.
pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let view = state
        .pipeline
        .topic_view(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("topic {}", id)))?;

    Ok((
        [(header::CACHE_CONTROL, state.revalidation.cache_control())],
        Json(view),
    ))
}

/// Build topic routes
pub fn topic_routes() -> Router<AppState> {
    Router::new()
        .route("/api/topics", get(list_topics))
        .route("/api/topics/:id", get(get_topic))
}
