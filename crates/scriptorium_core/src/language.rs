//! Supported playground languages.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Closed enumeration of languages the playground can execute or emulate.
///
/// Selected per execution request; unknown tags never reach an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    /// ECMAScript-family programs (restricted interpreter)
    EcmaScript,
    /// Python-family programs (pattern-matching subset)
    PythonLike,
    /// C-family programs (structural emission subset)
    CLike,
    /// Markup documents - no execution semantics
    Markup,
    /// Style sheets - no execution semantics
    StyleSheet,
}

impl Language {
    /// All supported languages, in registry order
    pub const ALL: [Language; 5] = [
        Language::EcmaScript,
        Language::PythonLike,
        Language::CLike,
        Language::Markup,
        Language::StyleSheet,
    ];

    /// Parse a host-supplied tag into a supported language.
    ///
    /// Accepts the common aliases a forum editor emits. Returns `None` for
    /// anything outside the closed set; callers surface that as an
    /// unsupported-language result rather than an error path.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "ecmascript" | "typescript" | "ts" => Some(Self::EcmaScript),
            "python" | "py" | "python3" => Some(Self::PythonLike),
            "c" | "cpp" | "c++" => Some(Self::CLike),
            "html" | "xml" | "markup" => Some(Self::Markup),
            "css" | "stylesheet" => Some(Self::StyleSheet),
            _ => None,
        }
    }

    /// Parse a tag, failing with a typed error for unknown tags.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedLanguage` for a tag outside the closed set.
    pub fn parse_tag(tag: &str) -> CoreResult<Self> {
        Self::from_tag(tag).ok_or_else(|| CoreError::UnsupportedLanguage {
            tag: tag.to_string(),
        })
    }

    /// Canonical tag for this language
    #[must_use]
    pub const fn as_tag(&self) -> &'static str {
        match self {
            Self::EcmaScript => "javascript",
            Self::PythonLike => "python",
            Self::CLike => "c",
            Self::Markup => "html",
            Self::StyleSheet => "css",
        }
    }

    /// Whether programs in this language have execution semantics
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        !matches!(self, Self::Markup | Self::StyleSheet)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(Language::from_tag("javascript"), Some(Language::EcmaScript));
        assert_eq!(Language::from_tag("JS"), Some(Language::EcmaScript));
        assert_eq!(Language::from_tag("python"), Some(Language::PythonLike));
        assert_eq!(Language::from_tag(" cpp "), Some(Language::CLike));
        assert_eq!(Language::from_tag("html"), Some(Language::Markup));
        assert_eq!(Language::from_tag("css"), Some(Language::StyleSheet));
        assert_eq!(Language::from_tag("brainfuck"), None);
    }

    #[test]
    fn test_parse_tag_typed_error() {
        assert_eq!(Language::parse_tag("py").unwrap(), Language::PythonLike);
        let err = Language::parse_tag("cobol").unwrap_err();
        assert_eq!(
            err,
            CoreError::UnsupportedLanguage {
                tag: "cobol".to_string()
            }
        );
    }

    #[test]
    fn test_tag_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_tag(lang.as_tag()), Some(lang));
        }
    }

    #[test]
    fn test_is_executable() {
        assert!(Language::EcmaScript.is_executable());
        assert!(Language::PythonLike.is_executable());
        assert!(Language::CLike.is_executable());
        assert!(!Language::Markup.is_executable());
        assert!(!Language::StyleSheet.is_executable());
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::PythonLike.to_string(), "python");
    }
}
