//! Registry error types
//!
//! Error types for identity admission and lookup.

use super::user::ValidationError;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Record failed structural validation
    Invalid(ValidationError),
    /// A record with this id is already admitted
    Conflict(String),
    /// No record with this id
    NotFound(String),
    /// Registry cancellation fired; no new admissions
    Cancelled,
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Invalid(err) => write!(f, "Invalid user: {}", err),
            RegistryError::Conflict(id) => write!(f, "User already exists: {}", id),
            RegistryError::NotFound(id) => write!(f, "User not found: {}", id),
            RegistryError::Cancelled => write!(f, "Registry cancelled, not admitting users"),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        RegistryError::Invalid(err)
    }
}
