//! Topic view model assembly
//!
//! Composes fetch, normalization, resolution and aggregation into the read
//! model handed to the rendering layer. Each call runs the pipeline once,
//! end to end, holding no state between requests.

use agora_common::config::{LinkageStrategy, RevalidationWindow, SortSpec, StoreSettings};
use agora_common::{StanceGroup, Topic, Viewpoint};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::normalize;
use crate::record_store::{ListQuery, RecordStoreClient, StoreError};
use crate::resolver::LinkedRecordResolver;

/// Number of topics listed when the caller gives no limit
pub const DEFAULT_TOPIC_LIMIT: usize = 10;

/// Immutable read model for one topic page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicView {
    pub id: String,
    pub question: String,
    pub hashtags: Vec<String>,
    /// Non-empty stance buckets in display order
    pub buckets: Vec<StanceGroup>,
    /// Viewpoints left out of the buckets because their stance was not recognized
    pub unrecognized: Vec<Viewpoint>,
    pub fetched_at: DateTime<Utc>,
    /// When a cached copy of this view must be refetched
    pub stale_after: DateTime<Utc>,
}

impl TopicView {
    pub fn assemble(
        topic: Topic,
        viewpoints: Vec<Viewpoint>,
        fetched_at: DateTime<Utc>,
        revalidation: RevalidationWindow,
    ) -> Self {
        let (buckets, unrecognized) = aggregate(viewpoints).into_parts();
        Self {
            id: topic.id,
            question: topic.question,
            hashtags: topic.hashtags,
            buckets,
            unrecognized,
            fetched_at,
            stale_after: revalidation.stale_after(fetched_at),
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.stale_after
    }

    /// Whether any viewpoint made it into a displayed bucket
    pub fn has_viewpoints(&self) -> bool {
        !self.buckets.is_empty()
    }
}

/// Read pipeline over the topics and viewpoints tables
#[derive(Clone)]
pub struct TopicPipeline {
    client: RecordStoreClient,
    resolver: LinkedRecordResolver,
    topics_table: String,
    newest_view: Option<String>,
    sort: Option<SortSpec>,
    revalidation: RevalidationWindow,
}

impl TopicPipeline {
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let client = RecordStoreClient::new(settings)?;
        let resolver = LinkedRecordResolver::new(
            client.clone(),
            settings.viewpoints_table.clone(),
            settings.linkage.clone(),
        );

        Ok(Self {
            client,
            resolver,
            topics_table: settings.topics_table.clone(),
            newest_view: settings.newest_view.clone(),
            sort: settings.sort.clone(),
            revalidation: settings.revalidation,
        })
    }

    /// Fetch and normalize one topic; `None` if it does not exist
    pub async fn fetch_topic(&self, topic_id: &str) -> Result<Option<Topic>, StoreError> {
        if topic_id.is_empty() {
            return Ok(None);
        }

        let record = self.client.fetch_one(&self.topics_table, topic_id).await?;
        Ok(record.map(|r| normalize::topic(&r, self.resolver.strategy().forward_field())))
    }

    /// Build the view model for one topic; `None` if the topic does not exist
    ///
    /// With back-reference linkage the topic and its viewpoints are fetched
    /// concurrently. A missing topic is reported as `None` even when the
    /// viewpoint fetch failed.
    pub async fn topic_view(&self, topic_id: &str) -> Result<Option<TopicView>, StoreError> {
        if topic_id.is_empty() {
            return Ok(None);
        }

        let (topic, viewpoints) = match self.resolver.strategy() {
            LinkageStrategy::BackReference { .. } => {
                let (topic, viewpoints) = tokio::join!(
                    self.fetch_topic(topic_id),
                    self.resolver.resolve_ids(topic_id, &[])
                );
                let Some(topic) = topic? else {
                    return Ok(None);
                };
                (topic, viewpoints?)
            }
            LinkageStrategy::ForwardRefs { .. } => {
                let Some(topic) = self.fetch_topic(topic_id).await? else {
                    return Ok(None);
                };
                let viewpoints = self.resolver.resolve(&topic).await?;
                (topic, viewpoints)
            }
        };

        let view = TopicView::assemble(topic, viewpoints, Utc::now(), self.revalidation);

        tracing::info!(
            topic_id = %view.id,
            buckets = view.buckets.len(),
            unrecognized = view.unrecognized.len(),
            "Assembled topic view"
        );

        Ok(Some(view))
    }

    /// Newest topics, using the configured newest-first view and/or sort
    pub async fn list_topics(&self, limit: usize) -> Result<Vec<Topic>, StoreError> {
        let query = ListQuery {
            max_records: Some(limit),
            sort: self.sort.clone(),
            view: self.newest_view.clone(),
            ..Default::default()
        };

        let forward_field = self.resolver.strategy().forward_field();
        let records = self.client.fetch_many(&self.topics_table, &query).await?;

        Ok(records
            .iter()
            .map(|r| normalize::topic(r, forward_field))
            .collect())
    }
}
