//! Execution request and result types.
//!
//! A request/result pair lives only for the duration of one run call.

use crate::language::Language;
use serde::{Deserialize, Serialize};

/// Error text for a language tag outside the supported enumeration
pub const UNSUPPORTED_LANGUAGE: &str = "unsupported language";

/// Error text for an execution that exceeded its time budget
pub const EXECUTION_TIMED_OUT: &str = "execution timed out";

/// A single run request: one code string, one language tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source text to execute
    pub code: String,
    /// Language the source should be interpreted as
    pub language: Language,
}

impl ExecutionRequest {
    /// Create a new execution request
    #[must_use]
    pub fn new(code: impl Into<String>, language: Language) -> Self {
        Self {
            code: code.into(),
            language,
        }
    }
}

/// Outcome of one run, immutable once produced.
///
/// A run either produced output, produced an error, or legitimately
/// produced neither; it never carries partial output alongside a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Buffered program output
    pub output: String,
    /// Diagnostic text, present when the run failed
    pub error: Option<String>,
    /// Wall-clock duration of the run in milliseconds
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    /// Successful run with buffered output
    #[must_use]
    pub fn success(output: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            output: output.into(),
            error: None,
            execution_time_ms,
        }
    }

    /// Failed run; partial output is discarded
    #[must_use]
    pub fn failure(error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            output: String::new(),
            error: Some(error.into()),
            execution_time_ms,
        }
    }

    /// Result for a language tag outside the supported enumeration
    #[must_use]
    pub fn unsupported_language() -> Self {
        Self::failure(UNSUPPORTED_LANGUAGE, 0)
    }

    /// Result for a run that exceeded its time budget
    #[must_use]
    pub fn timed_out(execution_time_ms: u64) -> Self {
        Self::failure(EXECUTION_TIMED_OUT, execution_time_ms)
    }

    /// Whether the run completed without a diagnostic
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_new() {
        let req = ExecutionRequest::new("print(1)", Language::PythonLike);
        assert_eq!(req.code, "print(1)");
        assert_eq!(req.language, Language::PythonLike);
    }

    #[test]
    fn test_result_success() {
        let result = ExecutionResult::success("42\n", 7);
        assert!(result.is_success());
        assert_eq!(result.output, "42\n");
        assert_eq!(result.execution_time_ms, 7);
    }

    #[test]
    fn test_result_failure_discards_output() {
        let result = ExecutionResult::failure("boom", 3);
        assert!(!result.is_success());
        assert!(result.output.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_unsupported_language_result() {
        let result = ExecutionResult::unsupported_language();
        assert_eq!(result.error.as_deref(), Some("unsupported language"));
        assert_eq!(result.execution_time_ms, 0);
    }

    #[test]
    fn test_timed_out_result() {
        let result = ExecutionResult::timed_out(50);
        assert_eq!(result.error.as_deref(), Some("execution timed out"));
        assert_eq!(result.execution_time_ms, 50);
    }

    #[test]
    fn test_result_serializes() {
        let result = ExecutionResult::success("hi", 1);
        let json = serde_json::to_string(&result).unwrap();
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
