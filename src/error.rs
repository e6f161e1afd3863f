// Typed errors with thiserror. Every failure aborts the run; there is no partial output.

use thiserror::Error;

/// Analysis error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("Insufficient data: fixation detection needs at least 2 samples, got {found}")]
    InsufficientData { found: usize },

    #[error("Region count mismatch: expected {expected} region starts, got {found}")]
    RegionCountMismatch { expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AnalysisError::RegionCountMismatch {
            expected: 21,
            found: 20,
        };
        let msg = err.to_string();
        assert!(msg.contains("21"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn malformed_input_names_line() {
        let err = AnalysisError::MalformedInput {
            line: 7,
            message: "not a number".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: AnalysisError = json_err.into();
        assert!(matches!(err, AnalysisError::Serialization(_)));
    }
}
