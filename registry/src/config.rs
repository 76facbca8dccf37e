//! Registry configuration.
//!
//! Configuration values should be provided by the application, not hardcoded.
//! Loading them from files or the environment is left to the application.

use crate::ciphers::AesGcmCipherExecutor;
use crate::error::{RegistryError, Result};
use crate::providers::{CipherExecutor, NoOpCipherExecutor};
use crate::ticket::ExpirationPolicy;
use chrono::Duration;
use std::fmt;
use std::sync::Arc;

/// Encryption-at-rest configuration.
#[derive(Clone, Default)]
pub struct CryptoConfig {
    /// Whether tickets are encrypted before they reach the store.
    ///
    /// Default: disabled
    pub enabled: bool,

    /// Standard base64 encoding of a 32-byte AES-256 key.
    ///
    /// Required when `enabled` is set.
    pub encryption_key: Option<String>,
}

impl CryptoConfig {
    /// Create a disabled crypto configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: false,
            encryption_key: None,
        }
    }

    /// Enable encryption with a base64-encoded key.
    #[must_use]
    pub fn with_encryption_key(mut self, encryption_key: impl Into<String>) -> Self {
        self.enabled = true;
        self.encryption_key = Some(encryption_key.into());
        self
    }

    /// Turn encryption on or off without touching the key.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Build the cipher this configuration describes.
    ///
    /// A disabled configuration yields [`NoOpCipherExecutor`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] if encryption is enabled
    /// without a key, or the key is not a valid 32-byte base64 key.
    pub fn build_cipher(&self) -> Result<Arc<dyn CipherExecutor>> {
        if !self.enabled {
            return Ok(Arc::new(NoOpCipherExecutor));
        }
        let encryption_key = self.encryption_key.as_deref().ok_or_else(|| {
            RegistryError::Configuration("Encryption is enabled but no encryption key is set".to_string())
        })?;
        Ok(Arc::new(AesGcmCipherExecutor::from_base64(encryption_key)?))
    }
}

impl fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoConfig")
            .field("enabled", &self.enabled)
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Expiration policies applied by the default ticket factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketExpirationConfig {
    /// Ticket-granting tickets.
    ///
    /// Default: 8 hour hard timeout
    pub ticket_granting_ticket: ExpirationPolicy,

    /// Service tickets.
    ///
    /// Default: 10 second hard timeout
    pub service_ticket: ExpirationPolicy,

    /// Proxy-granting tickets.
    ///
    /// Default: 2 hour hard timeout
    pub proxy_granting_ticket: ExpirationPolicy,
}

impl TicketExpirationConfig {
    /// Create the default expiration configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ticket_granting_ticket: ExpirationPolicy::hard_timeout(Duration::hours(8)),
            service_ticket: ExpirationPolicy::hard_timeout(Duration::seconds(10)),
            proxy_granting_ticket: ExpirationPolicy::hard_timeout(Duration::hours(2)),
        }
    }

    /// Set the ticket-granting ticket policy.
    #[must_use]
    pub const fn with_ticket_granting_ticket(mut self, policy: ExpirationPolicy) -> Self {
        self.ticket_granting_ticket = policy;
        self
    }

    /// Set the service ticket policy.
    #[must_use]
    pub const fn with_service_ticket(mut self, policy: ExpirationPolicy) -> Self {
        self.service_ticket = policy;
        self
    }

    /// Set the proxy-granting ticket policy.
    #[must_use]
    pub const fn with_proxy_granting_ticket(mut self, policy: ExpirationPolicy) -> Self {
        self.proxy_granting_ticket = policy;
        self
    }
}

impl Default for TicketExpirationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticket registry configuration.
#[derive(Debug, Clone, Default)]
pub struct TicketRegistryConfig {
    /// Encryption at rest.
    pub crypto: CryptoConfig,

    /// Ticket lifetimes.
    pub expiration: TicketExpirationConfig,
}

impl TicketRegistryConfig {
    /// Create the default registry configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the crypto configuration.
    #[must_use]
    pub fn with_crypto(mut self, crypto: CryptoConfig) -> Self {
        self.crypto = crypto;
        self
    }

    /// Set the expiration configuration.
    #[must_use]
    pub const fn with_expiration(mut self, expiration: TicketExpirationConfig) -> Self {
        self.expiration = expiration;
        self
    }
}
