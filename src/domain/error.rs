use thiserror::Error;

/// Core domain errors
///
/// Lookups and admission decisions never fail on their own outcome: a miss
/// is `None` and a throttled request is `false`. These variants only cover
/// bad input at the API boundary, bad configuration and poisoned locks.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Rejects an empty key, identifier or query
    pub fn require_non_empty(field: &str, value: &str) -> Result<(), Self> {
        if value.is_empty() {
            return Err(Self::validation(format!("{} must not be empty", field)));
        }

        Ok(())
    }

    /// Maps a poisoned lock into an internal error
    pub fn poisoned<T>(err: std::sync::PoisonError<T>) -> Self {
        Self::internal(format!("Lock poisoned: {}", err))
    }
}
