//! Error types for the skald library.
//!
//! Structured error types that preserve context and enable proper error
//! propagation through the topic-labeling pipeline. Malformed or empty input
//! documents are recoverable (logged and skipped by the caller); numeric and
//! external failures carry enough context to explain which stage died.

use std::io;

use thiserror::Error;

/// Main result type for skald operations.
pub type Result<T> = std::result::Result<T, SkaldError>;

/// Comprehensive error type for all skald operations.
#[derive(Error, Debug)]
pub enum SkaldError {
    /// I/O related errors (file operations, directory walks, etc.)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Transcript parsing errors
    #[error("Parse error: {message}")]
    Parse {
        /// Error description
        message: String,
        /// File path where the error occurred
        file_path: Option<String>,
        /// Line number (if available)
        line: Option<usize>,
    },

    /// A document contained no usable tokens after normalization
    #[error("Empty input: document '{document}' has no tokens after preprocessing")]
    EmptyInput {
        /// Identifier of the offending document
        document: String,
    },

    /// Too few documents for the requested clustering
    #[error("Insufficient data: {message} (needed {needed}, got {actual})")]
    InsufficientData {
        /// Error description
        message: String,
        /// Minimum row count required
        needed: usize,
        /// Actual row count available
        actual: usize,
    },

    /// Numeric computation errors (degenerate matrices, failed decompositions)
    #[error("Mathematical error: {message}")]
    Math {
        /// Error description
        message: String,
        /// Context of the mathematical operation
        context: Option<String>,
    },

    /// Pipeline stage errors
    #[error("Pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// Pipeline stage where the error occurred
        stage: String,
        /// Error description
        message: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Remote model/API failures (LLM labeling, embedding model download)
    #[error("External service error: {message}")]
    External {
        /// Error description
        message: String,
        /// Underlying transport or API error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl SkaldError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: None,
            line: None,
        }
    }

    /// Create a new parse error with file context
    pub fn parse_in_file(
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: Option<usize>,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: Some(file_path.into()),
            line,
        }
    }

    /// Create a new empty-input error for a document
    pub fn empty_input(document: impl Into<String>) -> Self {
        Self::EmptyInput {
            document: document.into(),
        }
    }

    /// Create a new insufficient-data error
    pub fn insufficient_data(message: impl Into<String>, needed: usize, actual: usize) -> Self {
        Self::InsufficientData {
            message: message.into(),
            needed,
            actual,
        }
    }

    /// Create a new mathematical error
    pub fn math(message: impl Into<String>) -> Self {
        Self::Math {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new mathematical error with context
    pub fn math_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Math {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new pipeline error
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new external-service error
    pub fn external(message: impl Into<String>) -> Self {
        Self::External {
            message: message.into(),
            source: None,
        }
    }

    /// Create an external-service error wrapping its underlying cause
    pub fn external_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Math { context: ctx, .. } | Self::Internal { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::Io { message, .. }
            | Self::Pipeline { message, .. }
            | Self::Serialization { message, .. } => {
                *message = format!("{}: {message}", context.into());
            }
            _ => {} // Other variants handle context differently
        }
        self
    }

    /// True if the batch should continue after this error on a single document
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyInput { .. } | Self::Parse { .. })
    }
}

// Implement From traits for common error types
impl From<io::Error> for SkaldError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for SkaldError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for SkaldError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for SkaldError {
    fn from(err: reqwest::Error) -> Self {
        Self::External {
            message: format!("HTTP request failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error result
    fn context(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SkaldError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }

    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SkaldError::config("Invalid configuration");
        assert!(matches!(err, SkaldError::Config { .. }));

        let err = SkaldError::parse("Malformed STM line");
        assert!(matches!(err, SkaldError::Parse { .. }));
    }

    #[test]
    fn test_empty_input_is_recoverable() {
        let err = SkaldError::empty_input("talk_0001.stm");
        assert!(err.is_recoverable());

        let err = SkaldError::math("singular matrix");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = SkaldError::insufficient_data("matrix has too few rows for K", 5, 3);
        let display = format!("{err}");
        assert!(display.contains("needed 5"));
        assert!(display.contains("got 3"));
    }

    #[test]
    fn test_error_with_context() {
        let err = SkaldError::math("Division by zero").with_context("silhouette_score");

        if let SkaldError::Math { context, .. } = err {
            assert_eq!(context, Some("silhouette_score".to_string()));
        } else {
            panic!("Expected Math error");
        }
    }

    #[test]
    fn test_pipeline_error() {
        let err = SkaldError::pipeline("vectorize", "vocabulary is empty");

        if let SkaldError::Pipeline { stage, message } = err {
            assert_eq!(stage, "vectorize");
            assert_eq!(message, "vocabulary is empty");
        } else {
            panic!("Expected Pipeline error");
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let skald_err: SkaldError = io_err.into();
        assert!(matches!(skald_err, SkaldError::Io { .. }));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let skald_err: SkaldError = json_err.into();

        if let SkaldError::Serialization { data_type, .. } = skald_err {
            assert_eq!(data_type, Some("JSON".to_string()));
        } else {
            panic!("Expected Serialization error");
        }
    }

    #[test]
    fn test_result_extension() {
        let result: std::result::Result<i32, io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "File not found"));

        let skald_result = result.context("Failed to read transcript directory");
        let display = format!("{}", skald_result.unwrap_err());
        assert!(display.contains("Failed to read transcript directory"));
    }
}
