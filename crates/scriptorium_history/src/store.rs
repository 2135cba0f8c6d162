//! Append-only version store for one artifact.

use crate::version::{ChangeDescriptor, CodeVersion};
use scriptorium_core::{CoreError, VersionId};
use scriptorium_diff::{DiffEngine, DiffResult};
use serde::{Deserialize, Serialize};

/// Store error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Version lookup referenced an unknown id
    VersionNotFound {
        /// The id that was requested
        id: VersionId,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VersionNotFound { id } => write!(f, "version not found: {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionNotFound { id } => CoreError::VersionNotFound {
                id: id.to_string(),
            },
        }
    }
}

/// Append-only ordered log of code snapshots for one artifact.
///
/// Newest first. Exactly one version carries the current flag once the
/// store is non-empty; commits and restores move the flag, nothing else
/// touches existing records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionStore {
    versions: Vec<CodeVersion>,
}

impl VersionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            versions: Vec::new(),
        }
    }

    /// Commit a snapshot as the new head version.
    ///
    /// The previous current version's flag is cleared.
    pub fn commit(
        &mut self,
        snapshot: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
        changes: Vec<ChangeDescriptor>,
    ) -> CodeVersion {
        self.clear_current_flag();
        let version = CodeVersion::new(author, message, snapshot, changes);
        self.versions.insert(0, version.clone());
        version
    }

    /// Restore an existing version by id.
    ///
    /// Appends a NEW head version copying the restored snapshot, so the
    /// log records what was restored and when. A failed lookup leaves the
    /// store untouched.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if no version has the given id.
    pub fn restore(&mut self, id: VersionId) -> Result<CodeVersion, StoreError> {
        let restored = self
            .find(id)
            .ok_or(StoreError::VersionNotFound { id })?
            .clone();

        self.clear_current_flag();
        let version = CodeVersion::new(
            restored.author.clone(),
            format!("restored {}", restored.id),
            restored.snapshot.clone(),
            Vec::new(),
        );
        self.versions.insert(0, version.clone());
        Ok(version)
    }

    /// Compare two versions' snapshots.
    ///
    /// The caller chooses which id plays original and which revised.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if either id is unknown.
    pub fn compare(&self, original: VersionId, revised: VersionId) -> Result<DiffResult, StoreError> {
        let original = self
            .find(original)
            .ok_or(StoreError::VersionNotFound { id: original })?;
        let revised = self
            .find(revised)
            .ok_or(StoreError::VersionNotFound { id: revised })?;

        Ok(DiffEngine::new().diff(&original.snapshot, &revised.snapshot))
    }

    /// Compare two versions with the earlier one playing original.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` if either id is unknown.
    pub fn compare_chronological(
        &self,
        a: VersionId,
        b: VersionId,
    ) -> Result<DiffResult, StoreError> {
        let version_a = self.find(a).ok_or(StoreError::VersionNotFound { id: a })?;
        let version_b = self.find(b).ok_or(StoreError::VersionNotFound { id: b })?;

        if version_a.created_at <= version_b.created_at {
            self.compare(a, b)
        } else {
            self.compare(b, a)
        }
    }

    /// All versions, newest first
    #[must_use]
    pub fn history(&self) -> &[CodeVersion] {
        &self.versions
    }

    /// The current version, if any
    #[must_use]
    pub fn current(&self) -> Option<&CodeVersion> {
        self.versions.iter().find(|v| v.is_current)
    }

    /// Look up a version by id
    #[must_use]
    pub fn find(&self, id: VersionId) -> Option<&CodeVersion> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// Number of versions in the store
    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether the store has no versions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Drop the whole history. The only permitted deletion.
    pub fn clear(&mut self) {
        self.versions.clear();
    }

    fn clear_current_flag(&mut self) {
        for version in &mut self.versions {
            version.is_current = false;
        }
    }
}
