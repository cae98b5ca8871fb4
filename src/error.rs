//! Error types for the analysis pipeline

use std::time::Duration;

/// Errors that can occur during audio analysis
///
/// Only [`AnalysisError::InvalidInput`] and [`AnalysisError::DecodingError`] ever
/// reach the caller of the pipeline entry points. The remaining variants are
/// produced by signal primitives and bounded operations, and the extraction
/// layer replaces them with documented fallbacks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Processing error inside a signal primitive
    #[error("Processing error: {0}")]
    ProcessingError(String),

    /// Numerical error (non-finite values, degenerate input, etc.)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Writing an annotation document failed
    #[error("Export error: {0}")]
    ExportError(String),

    /// A bounded operation exceeded its time budget
    #[error("Operation '{operation}' timed out after {budget:?}")]
    Timeout {
        /// Operation name
        operation: String,
        /// Budget that was exceeded
        budget: Duration,
    },
}

impl AnalysisError {
    /// Whether this error aborts the pipeline instead of degrading a feature
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidInput(_) | AnalysisError::DecodingError(_)
        )
    }
}
