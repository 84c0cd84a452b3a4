//! agora-reader library
//!
//! Fetches debate topics and their viewpoints from the record store and
//! reshapes them into view models for the rendering layer:
//! record fetch → field normalization → linked-record resolution →
//! stance aggregation → view model.

use agora_common::config::{RevalidationWindow, StoreSettings};
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod assembler;
pub mod error;
pub mod formula;
pub mod normalize;
pub mod record_store;
pub mod resolver;

pub use crate::assembler::{TopicPipeline, TopicView};
pub use crate::error::{ApiError, ApiResult};
pub use crate::record_store::{RawRecord, RecordStoreClient, StoreError};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Read pipeline over the record store
    pub pipeline: TopicPipeline,
    /// Freshness policy advertised to downstream caches
    pub revalidation: RevalidationWindow,
}

impl AppState {
    pub fn new(pipeline: TopicPipeline, revalidation: RevalidationWindow) -> Self {
        Self {
            pipeline,
            revalidation,
        }
    }

    /// Build state from resolved settings
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreError> {
        Ok(Self::new(TopicPipeline::new(settings)?, settings.revalidation))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::topic_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
