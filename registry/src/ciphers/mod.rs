//! Cipher executor implementations.
//!
//! - **AES-256-GCM** - authenticated encryption for tickets at rest

pub mod aes;

// Re-exports
pub use aes::AesGcmCipherExecutor;
