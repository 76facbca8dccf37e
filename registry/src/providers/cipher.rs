//! Cipher executor trait.

use crate::error::Result;

/// Symmetric cipher applied to tickets at rest.
///
/// Implementations are shared between tasks and called concurrently; each
/// call must be self-contained (no per-call state kept on `self`).
pub trait CipherExecutor: Send + Sync {
    /// Whether the cipher should be applied at all.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Encrypt `plaintext`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Crypto`](crate::RegistryError::Crypto) if encryption fails.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt output previously produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Crypto`](crate::RegistryError::Crypto) if the
    /// payload is malformed or was not produced with this key.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Disabled cipher; tickets are stored as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCipherExecutor;

impl CipherExecutor for NoOpCipherExecutor {
    fn is_enabled(&self) -> bool {
        false
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        Ok(plaintext.to_vec())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        Ok(ciphertext.to_vec())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
