// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String), // Only pdf, docx and doc are accepted

    #[error("Could not extract text from file: {0}")]
    ExtractionFailed(String), // Decoder failure or empty text, never a raw decoder error
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_messages_are_user_facing() {
        let err = ExtractError::UnsupportedFormat("txt".to_string());
        assert_eq!(err.to_string(), "Unsupported file format: txt");

        let err = ExtractError::ExtractionFailed("empty text".to_string());
        assert_eq!(err.to_string(), "Could not extract text from file: empty text");
    }

    #[test]
    fn test_app_error_wraps_extract_error() {
        let app: AppError = ExtractError::UnsupportedFormat("odt".to_string()).into();
        assert!(matches!(app, AppError::Extraction(ExtractError::UnsupportedFormat(_))));
        assert_eq!(app.to_string(), "Extraction failed: Unsupported file format: odt");
    }
}
