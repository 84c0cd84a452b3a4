//! Domain model for debate topics and their viewpoints
//!
//! All entities are externally authored and read-only here: they are built
//! fresh from record-store responses for each request and then dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Debate topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Store-assigned record id (never empty)
    pub id: String,
    /// Question shown as the topic heading (may be empty)
    pub question: String,
    /// Canonical hashtags, each starting with `#`, in source order
    pub hashtags: Vec<String>,
    /// Forward links to viewpoint records; empty when the data uses back-references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub viewpoint_refs: Vec<String>,
}

/// Position a viewpoint takes on its topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stance {
    For,
    Against,
    Mixed,
    /// Source value missing or not one of the three canonical literals
    Unrecognized,
}

impl Stance {
    /// Fixed display order of the stance buckets
    pub const DISPLAY_ORDER: [Stance; 3] = [Stance::For, Stance::Against, Stance::Mixed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::For => "For",
            Stance::Against => "Against",
            Stance::Mixed => "Mixed",
            Stance::Unrecognized => "Unrecognized",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single viewpoint on a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewpoint {
    /// Store-assigned record id
    pub id: String,
    /// Quoted viewpoint text
    pub text: String,
    /// Source address, if supplied
    pub url: Option<String>,
    /// Author display name, if supplied
    pub author: Option<String>,
    pub stance: Stance,
}

/// Viewpoints sharing one stance, in resolver output order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanceGroup {
    pub stance: Stance,
    pub members: Vec<Viewpoint>,
}

impl StanceGroup {
    pub fn new(stance: Stance) -> Self {
        Self {
            stance,
            members: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}
