//! Viewpoint aggregation into stance buckets
//!
//! Stable partition: members keep the order the resolver produced.

use agora_common::{Stance, StanceGroup, Viewpoint};
use serde::Serialize;

/// Every bucket, including empty ones and unrecognized stances
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregation {
    groups: [StanceGroup; 3],
    unrecognized: Vec<Viewpoint>,
}

impl Aggregation {
    /// Bucket for one displayed stance
    ///
    /// `Stance::Unrecognized` has no displayed bucket and yields `None`.
    pub fn group(&self, stance: Stance) -> Option<&StanceGroup> {
        self.groups.iter().find(|g| g.stance == stance)
    }

    /// All three displayed buckets in display order, empty ones included
    pub fn all_groups(&self) -> &[StanceGroup] {
        &self.groups
    }

    /// Viewpoints whose stance was not recognized
    pub fn unrecognized(&self) -> &[Viewpoint] {
        &self.unrecognized
    }

    /// Non-empty buckets in display order
    pub fn displayed(&self) -> Vec<StanceGroup> {
        self.groups.iter().filter(|g| !g.is_empty()).cloned().collect()
    }

    pub fn into_parts(self) -> (Vec<StanceGroup>, Vec<Viewpoint>) {
        let displayed = self.groups.into_iter().filter(|g| !g.is_empty()).collect();
        (displayed, self.unrecognized)
    }
}

/// Partition viewpoints into `For`, `Against`, `Mixed` buckets
pub fn aggregate(viewpoints: impl IntoIterator<Item = Viewpoint>) -> Aggregation {
    let mut groups = Stance::DISPLAY_ORDER.map(StanceGroup::new);
    let mut unrecognized = Vec::new();

    for viewpoint in viewpoints {
        match groups.iter_mut().find(|g| g.stance == viewpoint.stance) {
            Some(group) => group.members.push(viewpoint),
            None => unrecognized.push(viewpoint),
        }
    }

    Aggregation {
        groups,
        unrecognized,
    }
}
