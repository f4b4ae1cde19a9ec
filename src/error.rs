use thiserror::Error;

use crate::domain::RuleId;
use crate::registry::ValidationError;

/// Errors surfaced by the registry workflows.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("alert rule {0} does not exist")]
    NotFound(RuleId),

    /// The store failed; the cause is kept for logs but not displayed.
    #[error("storage failure during {operation}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl RegistryError {
    /// Wrap a store failure with the operation that produced it.
    pub fn persistence(operation: &'static str, source: anyhow::Error) -> Self {
        RegistryError::Persistence { operation, source }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Validation(_) => "VALIDATION_FAILED",
            RegistryError::NotFound(_) => "NOT_FOUND",
            RegistryError::Persistence { .. } => "STORAGE_ERROR",
            RegistryError::MalformedRequest(_) => "BAD_REQUEST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_hides_cause() {
        let err = RegistryError::persistence(
            "create",
            anyhow::anyhow!("connection refused (os error 111)"),
        );

        assert_eq!(err.to_string(), "storage failure during create");
        assert_eq!(err.code(), "STORAGE_ERROR");

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("connection refused"));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = RegistryError::from(ValidationError::EmptyRuleSet);
        assert_eq!(err.to_string(), "at least one rule must be defined");
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }
}
