//! Scriptorium Session
//!
//! The single entry point the host application uses: run code, diff two
//! texts, and commit/restore/compare versioned snapshots per artifact.
//! Everything else in the host (posts, rendering, persistence) calls
//! through this boundary and renders whatever structured result comes
//! back.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod workspace;

pub use workspace::Workspace;

// The façade's vocabulary, re-exported so hosts depend on one crate.
pub use scriptorium_core::{
    ArtifactId, CoreError, CoreResult, ExecutionRequest, ExecutionResult, Language, Timestamp,
    VersionId,
};
pub use scriptorium_diff::{DiffLine, DiffLineKind, DiffResult, DiffSummary};
pub use scriptorium_engine::{EngineOutput, EngineRegistry, Executable};
pub use scriptorium_history::{ChangeDescriptor, ChangeKind, CodeVersion};
pub use scriptorium_runtime::{Debouncer, DispatchError, Dispatcher, PendingRun};
