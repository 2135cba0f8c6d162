//! Core error types for Scriptorium.

use std::fmt;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Language tag is not in the supported enumeration
    UnsupportedLanguage {
        /// Tag the caller supplied
        tag: String,
    },

    /// A program-level failure caught inside an engine
    EngineFailure {
        /// Human-readable message
        message: String,
    },

    /// Execution exceeded its configured time budget
    Timeout {
        /// Operation that timed out
        operation: String,
    },

    /// Version lookup referenced an unknown id
    VersionNotFound {
        /// The id that was requested
        id: String,
    },

    /// Input matched no known syntactic pattern
    MalformedInput {
        /// 1-based line of the offending input
        line: usize,
        /// What went wrong
        reason: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Why it failed
        reason: String,
    },

    /// Internal error (for unexpected errors)
    Internal {
        /// Error message
        message: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedLanguage { tag } => write!(f, "unsupported language: {}", tag),
            Self::EngineFailure { message } => write!(f, "engine failure: {}", message),
            Self::Timeout { operation } => write!(f, "timeout: {}", operation),
            Self::VersionNotFound { id } => write!(f, "version not found: {}", id),
            Self::MalformedInput { line, reason } => {
                write!(f, "malformed input at line {}: {}", line, reason)
            }
            Self::Validation { field, reason } => {
                write!(f, "validation failed for {}: {}", field, reason)
            }
            Self::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::UnsupportedLanguage {
            tag: "brainfuck".to_string(),
        };
        assert_eq!(format!("{}", err), "unsupported language: brainfuck");

        let err = CoreError::VersionNotFound {
            id: "ver_123".to_string(),
        };
        assert_eq!(format!("{}", err), "version not found: ver_123");
    }

    #[test]
    fn test_malformed_input_error() {
        let err = CoreError::MalformedInput {
            line: 3,
            reason: "unclosed print".to_string(),
        };
        let s = format!("{}", err);
        assert!(s.contains("line 3"));
        assert!(s.contains("unclosed print"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = CoreError::Timeout {
            operation: "execute".to_string(),
        };
        let err2 = CoreError::Timeout {
            operation: "execute".to_string(),
        };
        assert_eq!(err1, err2);

        let err3 = CoreError::Internal {
            message: "x".to_string(),
        };
        assert_ne!(err1, err3);
    }
}
