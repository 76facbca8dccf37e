//! AES-256-GCM cipher executor.
//!
//! Every encryption uses a fresh random 96-bit nonce. The output layout is:
//!
//! ```text
//! [nonce (12 bytes)][ciphertext + tag (variable)]
//! ```
//!
//! The key MUST:
//! - Be exactly 32 bytes (256 bits)
//! - Come from a secure source (secrets manager, vault, environment)
//! - Never be committed to version control
//!
//! # Example
//!
//! ```
//! use ticketry_registry::ciphers::AesGcmCipherExecutor;
//! use ticketry_registry::providers::CipherExecutor;
//!
//! # fn example() -> ticketry_registry::Result<()> {
//! let cipher = AesGcmCipherExecutor::new(&AesGcmCipherExecutor::generate_key())?;
//! let encrypted = cipher.encrypt(b"TGT-1")?;
//! assert_eq!(cipher.decrypt(&encrypted)?, b"TGT-1");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::error::{RegistryError, Result};
use crate::providers::CipherExecutor;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::Engine;
use std::fmt;
use std::sync::Arc;

/// Nonce length for AES-GCM (96 bits).
const NONCE_LEN: usize = 12;

/// Key length for AES-256 (256 bits).
const KEY_LEN: usize = 32;

/// AES-256-GCM cipher executor.
#[derive(Clone)]
pub struct AesGcmCipherExecutor {
    /// Shared cipher; each `encrypt()` call draws its own nonce.
    cipher: Arc<Aes256Gcm>,
}

impl AesGcmCipherExecutor {
    /// Create a cipher from a raw 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] if the key is not 32 bytes.
    pub fn new(encryption_key: &[u8]) -> Result<Self> {
        if encryption_key.len() != KEY_LEN {
            return Err(RegistryError::Configuration(
                "Encryption key must be exactly 32 bytes (256 bits) for AES-256-GCM".to_string(),
            ));
        }

        let cipher = Aes256Gcm::new_from_slice(encryption_key).map_err(|e| {
            RegistryError::Configuration(format!("Failed to initialize AES-256-GCM cipher: {e}"))
        })?;

        Ok(Self {
            cipher: Arc::new(cipher),
        })
    }

    /// Create a cipher from a standard base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] if the key is not valid base64
    /// or does not decode to 32 bytes.
    pub fn from_base64(encoded_key: &str) -> Result<Self> {
        let key = base64::engine::general_purpose::STANDARD
            .decode(encoded_key.trim())
            .map_err(|e| RegistryError::Configuration(format!("Encryption key is not valid base64: {e}")))?;
        Self::new(&key)
    }

    /// Generate a random 32-byte key.
    #[must_use]
    pub fn generate_key() -> Vec<u8> {
        Aes256Gcm::generate_key(&mut OsRng).to_vec()
    }
}

impl CipherExecutor for AesGcmCipherExecutor {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| RegistryError::Crypto(format!("Encryption failed: {e}")))?;

        let mut encrypted = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        encrypted.extend_from_slice(&nonce);
        encrypted.extend_from_slice(&ciphertext);
        Ok(encrypted)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN {
            return Err(RegistryError::Crypto(
                "Encrypted data too short (missing nonce)".to_string(),
            ));
        }

        let (nonce, ciphertext) = ciphertext.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| RegistryError::Crypto(format!("Decryption failed: {e}")))
    }

    fn name(&self) -> &'static str {
        "aes-256-gcm"
    }
}

impl fmt::Debug for AesGcmCipherExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCipherExecutor").finish_non_exhaustive()
    }
}
