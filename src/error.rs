//! Error handling for kincanvas
//!
//! The engine core never fails: out-of-range input is clamped and missing
//! collaborator data degrades to placeholders. Errors only arise on the I/O
//! edges (configuration files, view snapshots, tree files loaded by the demo
//! host), and this module defines the error type and Result alias for those.

use thiserror::Error;

/// Main error type for kincanvas operations
#[derive(Error, Debug)]
pub enum KinCanvasError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tree file was readable but structurally invalid
    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<KinCanvasError>,
    },
}

impl KinCanvasError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        KinCanvasError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for KinCanvasError {
    fn from(err: serde_json::Error) -> Self {
        KinCanvasError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for KinCanvasError {
    fn from(err: toml::de::Error) -> Self {
        KinCanvasError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for KinCanvasError {
    fn from(err: toml::ser::Error) -> Self {
        KinCanvasError::Serialization(err.to_string())
    }
}

/// Result type alias for kincanvas operations
pub type Result<T> = std::result::Result<T, KinCanvasError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<KinCanvasError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
