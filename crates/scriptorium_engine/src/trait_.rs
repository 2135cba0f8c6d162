//! The `Executable` capability shared by every language engine.

use scriptorium_core::{CoreResult, Language};
use serde::{Deserialize, Serialize};

/// What one engine run produced.
///
/// A program-level failure carries a diagnostic and no output; partial
/// output from a failed run is discarded before it reaches a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOutput {
    /// Buffered program output
    pub output: String,
    /// Diagnostic text for a caught program-level failure
    pub error: Option<String>,
}

impl EngineOutput {
    /// A run that completed, with whatever it printed
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: None,
        }
    }

    /// A run that failed with a caught, human-readable diagnostic
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            error: Some(error.into()),
        }
    }

    /// Whether the run completed without a diagnostic
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A per-language execution or emulation strategy.
///
/// Engines are stateless across calls and share no mutable state, so
/// independent runs are safe in parallel. Program-level failures are
/// reported inside [`EngineOutput`]; an `Err` marks input the engine
/// could not make sense of at all (e.g. malformed syntax matching no
/// known pattern). Neither may panic on any input.
pub trait Executable: Send + Sync {
    /// The language this engine handles
    fn language(&self) -> Language;

    /// Execute or emulate `code`, buffering all produced text.
    ///
    /// # Errors
    ///
    /// Returns an error for input the engine cannot classify as any
    /// known construct.
    fn run(&self, code: &str) -> CoreResult<EngineOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_success() {
        let out = EngineOutput::success("hello\n");
        assert!(out.is_success());
        assert_eq!(out.output, "hello\n");
    }

    #[test]
    fn test_output_failure_discards_output() {
        let out = EngineOutput::failure("bad operand");
        assert!(!out.is_success());
        assert!(out.output.is_empty());
        assert_eq!(out.error.as_deref(), Some("bad operand"));
    }
}
