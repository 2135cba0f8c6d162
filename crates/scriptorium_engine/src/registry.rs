//! Engine registry keyed by language.

use crate::clike::CEngine;
use crate::ecma::EcmaEngine;
use crate::markup::{MarkupEngine, StyleEngine};
use crate::python::PythonEngine;
use crate::trait_::Executable;
use indexmap::IndexMap;
use scriptorium_core::Language;
use std::sync::Arc;

/// Error from registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An engine for this language is already registered
    AlreadyRegistered {
        /// The contested language
        language: Language,
    },
    /// No engine registered for this language
    NotRegistered {
        /// The requested language
        language: Language,
    },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered { language } => {
                write!(f, "engine already registered: {}", language)
            }
            Self::NotRegistered { language } => {
                write!(f, "no engine registered: {}", language)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Registry mapping each language to its engine.
///
/// Iteration order is registration order, so listings are deterministic.
/// The registry is built once and shared immutably; it holds no per-run
/// state.
pub struct EngineRegistry {
    engines: IndexMap<Language, Arc<dyn Executable>>,
}

impl EngineRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            engines: IndexMap::new(),
        }
    }

    /// Create a registry with all five stock engines registered
    #[must_use]
    #[allow(clippy::missing_panics_doc)]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        // Fresh registry; stock registrations cannot collide
        registry.register(Arc::new(EcmaEngine::new())).unwrap();
        registry.register(Arc::new(PythonEngine::new())).unwrap();
        registry.register(Arc::new(CEngine::new())).unwrap();
        registry.register(Arc::new(MarkupEngine::new())).unwrap();
        registry.register(Arc::new(StyleEngine::new())).unwrap();
        registry
    }

    /// Register an engine under its own language.
    ///
    /// # Errors
    ///
    /// Returns an error if that language already has an engine.
    pub fn register(&mut self, engine: Arc<dyn Executable>) -> Result<(), RegistryError> {
        let language = engine.language();
        if self.engines.contains_key(&language) {
            return Err(RegistryError::AlreadyRegistered { language });
        }
        self.engines.insert(language, engine);
        Ok(())
    }

    /// Get the engine for a language.
    ///
    /// # Errors
    ///
    /// Returns an error if no engine is registered for it.
    pub fn get(&self, language: Language) -> Result<Arc<dyn Executable>, RegistryError> {
        self.engines
            .get(&language)
            .map(Arc::clone)
            .ok_or(RegistryError::NotRegistered { language })
    }

    /// Whether a language has a registered engine
    #[must_use]
    pub fn contains(&self, language: Language) -> bool {
        self.engines.contains_key(&language)
    }

    /// Registered languages, in registration order
    #[must_use]
    pub fn list(&self) -> Vec<Language> {
        self.engines.keys().copied().collect()
    }

    /// Number of registered engines
    #[must_use]
    pub fn count(&self) -> usize {
        self.engines.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
