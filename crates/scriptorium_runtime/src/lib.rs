//! Scriptorium Runtime
//!
//! Routes execution requests to the matching engine under a cancellable
//! timeout, and debounces auto-run-on-edit so only the most recent edit in
//! a quiet period ever executes. Engine failures become data here; nothing
//! engine-side unwinds past the dispatcher.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod debounce;
pub mod dispatcher;

pub use debounce::{Debouncer, PendingRun};
pub use dispatcher::{DispatchError, Dispatcher};
