//! Content-derived match IDs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A deterministic entity ID: the first 16 hex characters of a SHA-256.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Derive an ID from a raw tagging document.
    ///
    /// The same bytes always map to the same match, so re-running a batch
    /// over an unchanged export produces the same report IDs.
    pub fn for_document(document: &str) -> Self {
        let hash = hex::encode(Sha256::digest(document.as_bytes()));
        Self(hash[..16].to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Type alias for match report IDs
pub type MatchId = EntityId;
