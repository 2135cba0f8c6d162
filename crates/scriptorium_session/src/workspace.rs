//! The workspace façade.

use scriptorium_core::{
    ArtifactId, CoreError, CoreResult, ExecutionRequest, ExecutionResult, Language, VersionId,
};
use scriptorium_diff::{DiffEngine, DiffResult};
use scriptorium_history::{ChangeDescriptor, CodeVersion, VersionStore};
use scriptorium_runtime::{Debouncer, Dispatcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::debug;

/// One playground workspace: execution, diffing, and per-artifact version
/// history behind a single boundary.
///
/// Artifacts are independent: each has its own store behind its own lock,
/// so commits and restores are linearizable per artifact while separate
/// artifacts never contend. Callers always name the artifact they mean;
/// there is no implicit well-known history.
pub struct Workspace {
    dispatcher: Arc<Dispatcher>,
    diff_engine: DiffEngine,
    stores: RwLock<HashMap<ArtifactId, Arc<Mutex<VersionStore>>>>,
}

impl Workspace {
    /// Create a workspace over the five stock engines
    #[must_use]
    pub fn new() -> Self {
        Self::with_dispatcher(Arc::new(Dispatcher::with_defaults()))
    }

    /// Create a workspace over a custom dispatcher
    #[must_use]
    pub fn with_dispatcher(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            diff_engine: DiffEngine::new(),
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Execute code in the given language under a millisecond budget.
    ///
    /// Always returns a result; failures of every kind arrive as
    /// diagnostic text, never as panics or errors.
    pub async fn run(
        &self,
        code: impl Into<String>,
        language: Language,
        timeout_ms: u64,
    ) -> ExecutionResult {
        let request = ExecutionRequest::new(code, language);
        self.dispatcher
            .execute(request, Duration::from_millis(timeout_ms))
            .await
    }

    /// Execute code tagged with a host-supplied language string.
    ///
    /// Unknown tags produce the unsupported-language result without
    /// touching any engine.
    pub async fn run_tagged(
        &self,
        code: impl Into<String>,
        tag: &str,
        timeout_ms: u64,
    ) -> ExecutionResult {
        match Language::from_tag(tag) {
            Some(language) => self.run(code, language, timeout_ms).await,
            None => ExecutionResult::unsupported_language(),
        }
    }

    /// A debouncer for auto-run-on-edit, sharing this workspace's engines
    #[must_use]
    pub fn debouncer(&self, window: Duration) -> Debouncer {
        Debouncer::new(Arc::clone(&self.dispatcher), window)
    }

    /// Diff two code strings, language-independent
    #[must_use]
    pub fn diff(&self, original: &str, revised: &str) -> DiffResult {
        self.diff_engine.diff(original, revised)
    }

    /// Commit a snapshot to an artifact's history.
    ///
    /// The artifact's store is created on first commit.
    pub fn commit(
        &self,
        artifact: ArtifactId,
        snapshot: impl Into<String>,
        author: impl Into<String>,
        message: impl Into<String>,
        changes: Vec<ChangeDescriptor>,
    ) -> CodeVersion {
        let store = self.store_or_create(artifact);
        let mut store = store.lock().expect("version store lock poisoned");
        let version = store.commit(snapshot, author, message, changes);
        debug!(%artifact, version = %version.id, "committed");
        version
    }

    /// Restore a version of an artifact by id.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` for an unknown artifact or version id;
    /// the history is left untouched.
    pub fn restore(&self, artifact: ArtifactId, version: VersionId) -> CoreResult<CodeVersion> {
        let store = self
            .store(artifact)
            .ok_or(CoreError::VersionNotFound {
                id: version.to_string(),
            })?;
        let mut store = store.lock().expect("version store lock poisoned");
        let restored = store.restore(version)?;
        debug!(%artifact, version = %restored.id, "restored");
        Ok(restored)
    }

    /// An artifact's history, newest first. Empty for unknown artifacts.
    #[must_use]
    pub fn history(&self, artifact: ArtifactId) -> Vec<CodeVersion> {
        match self.store(artifact) {
            Some(store) => store
                .lock()
                .expect("version store lock poisoned")
                .history()
                .to_vec(),
            None => Vec::new(),
        }
    }

    /// Compare two versions of an artifact; `original` and `revised`
    /// play the roles the caller assigns.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` for an unknown artifact or version id.
    pub fn compare(
        &self,
        artifact: ArtifactId,
        original: VersionId,
        revised: VersionId,
    ) -> CoreResult<DiffResult> {
        let store = self.store(artifact).ok_or(CoreError::VersionNotFound {
            id: original.to_string(),
        })?;
        let store = store.lock().expect("version store lock poisoned");
        Ok(store.compare(original, revised)?)
    }

    /// Compare two versions with the earlier one playing original.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` for an unknown artifact or version id.
    pub fn compare_chronological(
        &self,
        artifact: ArtifactId,
        a: VersionId,
        b: VersionId,
    ) -> CoreResult<DiffResult> {
        let store = self.store(artifact).ok_or(CoreError::VersionNotFound {
            id: a.to_string(),
        })?;
        let store = store.lock().expect("version store lock poisoned");
        Ok(store.compare_chronological(a, b)?)
    }

    /// Artifacts with at least one committed version
    #[must_use]
    pub fn artifacts(&self) -> Vec<ArtifactId> {
        self.stores
            .read()
            .expect("workspace lock poisoned")
            .keys()
            .copied()
            .collect()
    }

    /// Drop an artifact's whole history. Returns whether it existed.
    pub fn clear_history(&self, artifact: ArtifactId) -> bool {
        self.stores
            .write()
            .expect("workspace lock poisoned")
            .remove(&artifact)
            .is_some()
    }

    fn store(&self, artifact: ArtifactId) -> Option<Arc<Mutex<VersionStore>>> {
        self.stores
            .read()
            .expect("workspace lock poisoned")
            .get(&artifact)
            .cloned()
    }

    fn store_or_create(&self, artifact: ArtifactId) -> Arc<Mutex<VersionStore>> {
        let mut stores = self.stores.write().expect("workspace lock poisoned");
        Arc::clone(
            stores
                .entry(artifact)
                .or_insert_with(|| Arc::new(Mutex::new(VersionStore::new()))),
        )
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptorium_diff::DiffLineKind;

    const RUN_TIMEOUT_MS: u64 = 5_000;

    #[tokio::test]
    async fn test_run_each_executable_language() {
        let workspace = Workspace::new();

        let js = workspace
            .run("print(\"js\");", Language::EcmaScript, RUN_TIMEOUT_MS)
            .await;
        assert_eq!(js.output, "js\n");

        let py = workspace
            .run("x = 5\nprint(f\"value: {x}\")", Language::PythonLike, RUN_TIMEOUT_MS)
            .await;
        assert_eq!(py.output, "value: 5\n");

        let c = workspace
            .run(
                "int main() { printf(\"c\\n\"); }",
                Language::CLike,
                RUN_TIMEOUT_MS,
            )
            .await;
        assert_eq!(c.output, "c\n");
    }

    #[tokio::test]
    async fn test_run_markup_reports_notice() {
        let workspace = Workspace::new();
        let result = workspace
            .run("<p>hi</p>", Language::Markup, RUN_TIMEOUT_MS)
            .await;
        assert!(result.is_success());
        assert!(result.output.contains("rendered by the client"));
    }

    #[tokio::test]
    async fn test_run_tagged_unknown_tag() {
        let workspace = Workspace::new();
        let result = workspace.run_tagged("anything", "cobol", RUN_TIMEOUT_MS).await;
        assert_eq!(result.error.as_deref(), Some("unsupported language"));
    }

    #[test]
    fn test_diff_scenario() {
        let workspace = Workspace::new();
        let diff = workspace.diff("a\nb\nc", "a\nx\nc");
        let kinds: Vec<DiffLineKind> = diff.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiffLineKind::Unchanged,
                DiffLineKind::Removed,
                DiffLineKind::Added,
                DiffLineKind::Unchanged,
            ]
        );
    }

    #[test]
    fn test_commit_history_and_current() {
        let workspace = Workspace::new();
        let artifact = ArtifactId::new();

        for i in 0..4 {
            workspace.commit(artifact, format!("v{}", i), "alice", "edit", Vec::new());
        }

        let history = workspace.history(artifact);
        assert_eq!(history.len(), 4);
        assert_eq!(history.iter().filter(|v| v.is_current).count(), 1);
        assert_eq!(history[0].snapshot, "v3");
    }

    #[test]
    fn test_restore_roundtrip() {
        let workspace = Workspace::new();
        let artifact = ArtifactId::new();

        let first = workspace.commit(artifact, "original", "alice", "init", Vec::new());
        workspace.commit(artifact, "edited", "alice", "edit", Vec::new());

        let restored = workspace.restore(artifact, first.id).unwrap();
        assert_eq!(restored.snapshot, "original");
        assert!(restored.is_current);
        assert_eq!(workspace.history(artifact).len(), 3);
    }

    #[test]
    fn test_restore_unknown_version_propagates() {
        let workspace = Workspace::new();
        let artifact = ArtifactId::new();
        workspace.commit(artifact, "v1", "alice", "init", Vec::new());

        let missing = VersionId::new();
        let err = workspace.restore(artifact, missing).unwrap_err();
        assert!(matches!(err, CoreError::VersionNotFound { .. }));
        assert_eq!(workspace.history(artifact).len(), 1);
    }

    #[test]
    fn test_restore_unknown_artifact_propagates() {
        let workspace = Workspace::new();
        let err = workspace
            .restore(ArtifactId::new(), VersionId::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::VersionNotFound { .. }));
    }

    #[test]
    fn test_compare_versions() {
        let workspace = Workspace::new();
        let artifact = ArtifactId::new();

        let first = workspace.commit(artifact, "a\nb", "alice", "init", Vec::new());
        let second = workspace.commit(artifact, "a\nb\nc", "alice", "extend", Vec::new());

        let diff = workspace.compare(artifact, first.id, second.id).unwrap();
        assert_eq!(diff.summary().added, 1);

        let chrono = workspace
            .compare_chronological(artifact, second.id, first.id)
            .unwrap();
        assert_eq!(chrono, diff);
    }

    #[test]
    fn test_artifacts_are_independent() {
        let workspace = Workspace::new();
        let a = ArtifactId::new();
        let b = ArtifactId::new();

        workspace.commit(a, "a1", "alice", "init", Vec::new());
        workspace.commit(b, "b1", "bob", "init", Vec::new());
        workspace.commit(b, "b2", "bob", "edit", Vec::new());

        assert_eq!(workspace.history(a).len(), 1);
        assert_eq!(workspace.history(b).len(), 2);
        assert_eq!(workspace.artifacts().len(), 2);
    }

    #[test]
    fn test_clear_history() {
        let workspace = Workspace::new();
        let artifact = ArtifactId::new();
        workspace.commit(artifact, "v1", "alice", "init", Vec::new());

        assert!(workspace.clear_history(artifact));
        assert!(workspace.history(artifact).is_empty());
        assert!(!workspace.clear_history(artifact));
    }

    #[test]
    fn test_history_serializes_for_host_persistence() {
        let workspace = Workspace::new();
        let artifact = ArtifactId::new();
        workspace.commit(artifact, "v1", "alice", "init", Vec::new());
        workspace.commit(artifact, "v2", "alice", "edit", Vec::new());

        let history = workspace.history(artifact);
        let json = serde_json::to_string(&history).unwrap();
        let back: Vec<CodeVersion> = serde_json::from_str(&json).unwrap();
        assert_eq!(history, back);
    }

    #[tokio::test]
    async fn test_concurrent_commits_to_independent_artifacts() {
        let workspace = Arc::new(Workspace::new());
        let artifacts: Vec<ArtifactId> = (0..4).map(|_| ArtifactId::new()).collect();

        let tasks = artifacts.iter().map(|&artifact| {
            let workspace = Arc::clone(&workspace);
            tokio::task::spawn_blocking(move || {
                for i in 0..10 {
                    workspace.commit(artifact, format!("v{}", i), "bot", "edit", Vec::new());
                }
            })
        });
        futures::future::join_all(tasks).await;

        for artifact in artifacts {
            let history = workspace.history(artifact);
            assert_eq!(history.len(), 10);
            assert_eq!(history.iter().filter(|v| v.is_current).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_debouncer_from_workspace() {
        let workspace = Workspace::new();
        let debouncer = workspace.debouncer(Duration::from_millis(10));

        let pending = debouncer.submit(
            ExecutionRequest::new("print(7);", Language::EcmaScript),
            Duration::from_secs(5),
        );
        let result = pending.result().await.unwrap();
        assert_eq!(result.output, "7\n");
    }
}
