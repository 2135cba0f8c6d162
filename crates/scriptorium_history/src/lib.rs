//! Scriptorium History
//!
//! Append-only ordered log of code snapshots per editable artifact, with a
//! current pointer, restore, and pairwise compare. History is never
//! rewritten: restore appends, it does not mutate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod store;
pub mod version;

pub use store::{StoreError, VersionStore};
pub use version::{ChangeDescriptor, ChangeKind, CodeVersion};
