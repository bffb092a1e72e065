//! Router error types

/// Error type for router operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Router is shutting down or has shut down; no submissions accepted
    Closed,
    /// Routing loop has not been started yet
    NotRunning,
    /// Routing loop was already started once
    AlreadyRunning,
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::Closed => write!(f, "Broker closed"),
            RouterError::NotRunning => write!(f, "Router is not running"),
            RouterError::AlreadyRunning => write!(f, "Router loop already started"),
        }
    }
}

impl std::error::Error for RouterError {}
