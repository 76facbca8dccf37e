//! Error types for ticket registry operations.

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Failure modes of the ticket registry.
///
/// A missing ticket is not an error: lookups return `Ok(None)` and deletes
/// return a count of zero. Counters that the backing store cannot compute
/// return [`UNKNOWN_COUNT`](crate::constants::UNKNOWN_COUNT) instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// Ticket resolved but is not of the requested kind.
    #[error("Ticket [{id}] is of type {actual} when we were expecting {expected}")]
    TypeMismatch {
        /// Ticket id that was looked up
        id: String,
        /// Kind the caller asked for
        expected: String,
        /// Kind actually stored
        actual: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Data Integrity Errors
    // ═══════════════════════════════════════════════════════════

    /// Ticket could not be serialized or deserialized.
    #[error("Ticket serialization error: {0}")]
    Serialization(String),

    /// Ticket payload could not be encrypted or decrypted.
    #[error("Ticket cipher error: {0}")]
    Crypto(String),

    // ═══════════════════════════════════════════════════════════
    // Backend Errors
    // ═══════════════════════════════════════════════════════════

    /// Backing store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Backing store does not support the operation.
    #[error("Operation not supported by the ticket store: {0}")]
    Unsupported(&'static str),

    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// Registry or cipher configuration is invalid.
    #[error("Invalid registry configuration: {0}")]
    Configuration(String),
}

impl RegistryError {
    /// Returns `true` if the backing store failed or refused the operation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ticketry_registry::RegistryError;
    /// assert!(RegistryError::Storage("connection reset".into()).is_storage_error());
    /// assert!(!RegistryError::Crypto("bad tag".into()).is_storage_error());
    /// ```
    #[must_use]
    pub const fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Unsupported(_))
    }

    /// Returns `true` if a stored ticket payload cannot be trusted.
    ///
    /// # Examples
    ///
    /// ```
    /// # use ticketry_registry::RegistryError;
    /// assert!(RegistryError::Crypto("bad tag".into()).is_data_integrity_error());
    /// assert!(RegistryError::Serialization("eof".into()).is_data_integrity_error());
    /// ```
    #[must_use]
    pub const fn is_data_integrity_error(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::Crypto(_))
    }
}

impl From<bincode::Error> for RegistryError {
    fn from(error: bincode::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
