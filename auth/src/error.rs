//! Error types for authentication result building.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthenticationError>;

/// Failures raised while composing an authentication.
///
/// An empty authentication chain is not an error: builders report it as
/// `Ok(None)` and leave the decision to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The election strategy was given no authentication to elect from.
    #[error("No principal could be elected from an empty authentication chain")]
    NoPrincipal,

    /// An authentication was built before a principal was set.
    #[error("Authentication cannot be built without a principal")]
    MissingPrincipal,

    /// A custom election strategy rejected the authentication chain.
    #[error("Principal election failed: {0}")]
    Election(String),
}

impl AuthenticationError {
    /// Returns `true` if this error comes from principal election.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ticketry_auth::AuthenticationError;
    /// assert!(AuthenticationError::NoPrincipal.is_election_error());
    /// assert!(!AuthenticationError::MissingPrincipal.is_election_error());
    /// ```
    #[must_use]
    pub const fn is_election_error(&self) -> bool {
        matches!(self, Self::NoPrincipal | Self::Election(_))
    }
}
