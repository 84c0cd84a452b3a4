//! Linked record resolution
//!
//! Produces a topic's viewpoints under whichever linkage the deployment
//! uses: forward id lists on the topic, or a back-reference field on each
//! viewpoint. Result order is the store's response order; it is not
//! reconciled with the order of the topic's forward links.

use agora_common::config::LinkageStrategy;
use agora_common::{Topic, Viewpoint};

use crate::formula;
use crate::normalize;
use crate::record_store::{ListQuery, RecordStoreClient, StoreError};

/// Lower bound on the page size of a viewpoint query
pub const MIN_PAGE_SIZE: usize = 50;

/// Resolves topics to their viewpoints
#[derive(Clone)]
pub struct LinkedRecordResolver {
    client: RecordStoreClient,
    viewpoints_table: String,
    strategy: LinkageStrategy,
}

impl LinkedRecordResolver {
    pub fn new(client: RecordStoreClient, viewpoints_table: impl Into<String>, strategy: LinkageStrategy) -> Self {
        Self {
            client,
            viewpoints_table: viewpoints_table.into(),
            strategy,
        }
    }

    pub fn strategy(&self) -> &LinkageStrategy {
        &self.strategy
    }

    /// Viewpoint query for a topic, or `None` when nothing needs fetching
    pub fn query_for(&self, topic_id: &str, viewpoint_refs: &[String]) -> Option<ListQuery> {
        match &self.strategy {
            LinkageStrategy::ForwardRefs { .. } => {
                let formula = formula::or_of_ids(viewpoint_refs)?;
                Some(ListQuery::filtered(
                    formula,
                    MIN_PAGE_SIZE.max(viewpoint_refs.len()),
                ))
            }
            LinkageStrategy::BackReference { field } => Some(ListQuery::filtered(
                formula::equality(field, topic_id),
                MIN_PAGE_SIZE,
            )),
        }
    }

    /// Resolve a topic's viewpoints
    pub async fn resolve(&self, topic: &Topic) -> Result<Vec<Viewpoint>, StoreError> {
        self.resolve_ids(&topic.id, &topic.viewpoint_refs).await
    }

    /// Resolve viewpoints from a topic id and its forward links
    ///
    /// Under back-reference linkage only `topic_id` is used, so this can run
    /// before the topic record itself has been fetched.
    pub async fn resolve_ids(&self, topic_id: &str, viewpoint_refs: &[String]) -> Result<Vec<Viewpoint>, StoreError> {
        let Some(query) = self.query_for(topic_id, viewpoint_refs) else {
            tracing::debug!(topic_id = %topic_id, "Topic has no viewpoint links, skipping lookup");
            return Ok(Vec::new());
        };

        let records = self.client.fetch_many(&self.viewpoints_table, &query).await?;

        if let LinkageStrategy::ForwardRefs { .. } = self.strategy {
            if records.len() < viewpoint_refs.len() {
                tracing::debug!(
                    topic_id = %topic_id,
                    linked = viewpoint_refs.len(),
                    returned = records.len(),
                    "Some linked viewpoints no longer exist"
                );
            }
        }

        Ok(records.iter().map(normalize::viewpoint).collect())
    }
}
