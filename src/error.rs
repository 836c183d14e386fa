//! Error types for the anofox-anomaly library.

use thiserror::Error;

/// Result type alias for anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;

/// Errors that can occur during anomaly detection and feature augmentation.
///
/// Three categories, matching the three ways a call can fail:
/// input shape problems caught before any computation, rejected
/// configuration, and numeric failures inside the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnomalyError {
    /// Input is not a supported tabular shape, a required column is missing
    /// or has the wrong type. Raised before any computation runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unsupported method/decomp/clean tag, or a period/trend setting that
    /// is incompatible with the series. Raised at the start of the failing
    /// group's pipeline.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Numeric failure inside decomposition or classification.
    #[error("computation error: {0}")]
    Computation(String),
}

impl AnomalyError {
    /// Prefix the error message with the offending group's key so grouped
    /// failures can be traced back to their source.
    pub fn for_group(self, group: &str) -> Self {
        match self {
            AnomalyError::Validation(msg) => {
                AnomalyError::Validation(format!("group {group:?}: {msg}"))
            }
            AnomalyError::Configuration(msg) => {
                AnomalyError::Configuration(format!("group {group:?}: {msg}"))
            }
            AnomalyError::Computation(msg) => {
                AnomalyError::Computation(format!("group {group:?}: {msg}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AnomalyError::Validation("missing column: date".to_string());
        assert_eq!(err.to_string(), "validation error: missing column: date");

        let err = AnomalyError::Configuration("unknown method tag: stl".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: unknown method tag: stl"
        );

        let err = AnomalyError::Computation("remainder contains non-finite values".to_string());
        assert_eq!(
            err.to_string(),
            "computation error: remainder contains non-finite values"
        );
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = AnomalyError::Validation("empty input data".to_string());
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn group_context_keeps_the_category() {
        let err = AnomalyError::Computation("fence undefined".to_string()).for_group("store_2");
        assert!(matches!(err, AnomalyError::Computation(_)));
        assert_eq!(
            err.to_string(),
            "computation error: group \"store_2\": fence undefined"
        );
    }
}
