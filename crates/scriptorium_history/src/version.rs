//! Version record types.
//!
//! Versions are immutable once created and serialize to plain JSON so the
//! host can persist a whole history as an ordered list of records.

use scriptorium_core::{Timestamp, VersionId};
use serde::{Deserialize, Serialize};

/// Kind of change a descriptor records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Lines were added
    Added,
    /// Lines were removed
    Removed,
    /// Lines were modified
    Modified,
}

/// One human-readable entry in a version's change list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    /// Kind of change
    pub kind: ChangeKind,
    /// What changed, in the author's words or derived from a diff summary
    pub description: String,
}

impl ChangeDescriptor {
    /// Create a new change descriptor
    #[must_use]
    pub fn new(kind: ChangeKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

/// A committed code snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeVersion {
    /// Version identifier
    pub id: VersionId,
    /// When the version was committed
    pub created_at: Timestamp,
    /// Who committed it
    pub author: String,
    /// Commit message
    pub message: String,
    /// Complete copy of the artifact's source text at commit time
    pub snapshot: String,
    /// Ordered change descriptors
    pub changes: Vec<ChangeDescriptor>,
    /// Whether this is the artifact's current version
    pub is_current: bool,
}

impl CodeVersion {
    /// Create a new version marked current
    #[must_use]
    pub fn new(
        author: impl Into<String>,
        message: impl Into<String>,
        snapshot: impl Into<String>,
        changes: Vec<ChangeDescriptor>,
    ) -> Self {
        Self {
            id: VersionId::new(),
            created_at: Timestamp::now(),
            author: author.into(),
            message: message.into(),
            snapshot: snapshot.into(),
            changes,
            is_current: true,
        }
    }
}
