//! Markup and style-sheet passthrough engines.
//!
//! These languages have no execution semantics in the playground; the host
//! renderer displays them. Each engine reports a fixed informational
//! notice so a run still produces something to show.

use crate::trait_::{EngineOutput, Executable};
use scriptorium_core::{CoreResult, Language};

/// Notice reported for markup documents
pub const MARKUP_NOTICE: &str = "markup has no execution output; it is rendered by the client";

/// Notice reported for style sheets
pub const STYLE_NOTICE: &str = "style sheets have no execution output; they apply to rendered markup";

/// Markup passthrough engine
pub struct MarkupEngine;

impl MarkupEngine {
    /// Create a new engine (unit struct)
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for MarkupEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Executable for MarkupEngine {
    fn language(&self) -> Language {
        Language::Markup
    }

    fn run(&self, _code: &str) -> CoreResult<EngineOutput> {
        Ok(EngineOutput::success(MARKUP_NOTICE))
    }
}

/// Style-sheet passthrough engine
pub struct StyleEngine;

impl StyleEngine {
    /// Create a new engine (unit struct)
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Executable for StyleEngine {
    fn language(&self) -> Language {
        Language::StyleSheet
    }

    fn run(&self, _code: &str) -> CoreResult<EngineOutput> {
        Ok(EngineOutput::success(STYLE_NOTICE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_reports_notice() {
        let out = MarkupEngine::new().run("<p>hello</p>").unwrap();
        assert!(out.is_success());
        assert_eq!(out.output, MARKUP_NOTICE);
    }

    #[test]
    fn test_style_reports_notice() {
        let out = StyleEngine::new().run("body { color: red; }").unwrap();
        assert!(out.is_success());
        assert_eq!(out.output, STYLE_NOTICE);
    }

    #[test]
    fn test_languages() {
        assert_eq!(MarkupEngine::new().language(), Language::Markup);
        assert_eq!(StyleEngine::new().language(), Language::StyleSheet);
    }
}
