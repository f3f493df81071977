//! Error handling for vispipe-rs
//!
//! This module defines the crate-level error type and a Result alias.
//! Layer-specific errors (`PipelineError`, `CompositeError`) convert into it.

use crate::data::CompositeError;
use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for vispipe-rs operations
#[derive(Error, Debug)]
pub enum VisPipeError {
    /// Errors raised by executives and the pipeline registry
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to composite tree access
    #[error("Composite error: {0}")]
    Composite(#[from] CompositeError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

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
        source: Box<VisPipeError>,
    },
}

impl VisPipeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        VisPipeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The pipeline error at the root of any context chain
    pub fn pipeline_error(&self) -> Option<&PipelineError> {
        match self {
            VisPipeError::Pipeline(e) => Some(e),
            VisPipeError::WithContext { source, .. } => source.pipeline_error(),
            _ => None,
        }
    }
}

/// Result type alias for vispipe-rs operations
pub type Result<T> = std::result::Result<T, VisPipeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| VisPipeError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| VisPipeError::from(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VisPipeError::Config("missing file".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing file");
    }

    #[test]
    fn test_error_with_context() {
        let err = VisPipeError::Serialization("bad".to_string());
        let with_ctx = err.with_context("Failed to parse");
        assert!(with_ctx.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_pipeline_error_survives_context() {
        let result: std::result::Result<(), PipelineError> = Err(PipelineError::InputRequired {
            node: "sink".to_string(),
            port: 0,
        });
        let err = result.context("Updating sink").unwrap_err();
        assert!(err.to_string().starts_with("Updating sink: Pipeline error:"));
        assert!(matches!(
            err.pipeline_error(),
            Some(PipelineError::InputRequired { port: 0, .. })
        ));
    }

    #[test]
    fn test_composite_conversion() {
        let err: VisPipeError = CompositeError::InvalidState.into();
        assert!(matches!(err, VisPipeError::Composite(_)));
    }
}
