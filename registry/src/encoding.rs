//! Encryption-at-rest pipeline.
//!
//! When a cipher is enabled, tickets reach the store only as
//! [`EncodedTicket`]s keyed by the SHA-512 of the plaintext id, so a lookup by
//! the plaintext id still resolves to the same key. When no cipher is enabled
//! every step is the identity.
//!
//! ```text
//! Ticket ─► bincode ─► encrypt ─► EncodedTicket { sha512(id), bytes } ─► store
//! store ─► EncodedTicket ─► decrypt ─► bincode ─► Ticket
//! ```

use crate::error::{RegistryError, Result};
use crate::providers::CipherExecutor;
use crate::ticket::{EncodedTicket, Ticket};
use sha2::{Digest, Sha512};
use std::fmt;
use std::sync::Arc;

const CIPHER_DISABLED: &str = "Ticket encryption is not enabled. Falling back to default behavior";

/// Encodes tickets for storage and decodes them back.
#[derive(Clone, Default)]
pub struct TicketCodec {
    cipher: Option<Arc<dyn CipherExecutor>>,
}

impl TicketCodec {
    /// Codec applying `cipher`, if any.
    #[must_use]
    pub fn new(cipher: Option<Arc<dyn CipherExecutor>>) -> Self {
        Self { cipher }
    }

    /// Codec that stores tickets as they are.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether a cipher is configured and reports itself enabled.
    #[must_use]
    pub fn is_cipher_enabled(&self) -> bool {
        self.enabled_cipher().is_some()
    }

    fn enabled_cipher(&self) -> Option<&dyn CipherExecutor> {
        self.cipher
            .as_deref()
            .filter(|cipher| cipher.is_enabled())
    }

    /// Storage key for `ticket_id`.
    ///
    /// Identity when the cipher is disabled or the id is blank, otherwise the
    /// lowercase hex SHA-512 digest of the id.
    #[must_use]
    pub fn encode_ticket_id(&self, ticket_id: &str) -> String {
        if !self.is_cipher_enabled() {
            tracing::trace!("{}", CIPHER_DISABLED);
            return ticket_id.to_string();
        }
        if ticket_id.trim().is_empty() {
            return ticket_id.to_string();
        }

        let encoded_id = sha512_hex(ticket_id);
        tracing::debug!(ticket_id = %ticket_id, encoded_id = %encoded_id, "Encoded ticket id");
        encoded_id
    }

    /// Encode `ticket` for storage.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Serialization`] or [`RegistryError::Crypto`]
    /// if the ticket cannot be serialized or encrypted.
    pub fn encode_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        let Some(cipher) = self.enabled_cipher() else {
            tracing::trace!("{}", CIPHER_DISABLED);
            return Ok(ticket);
        };
        if let Ticket::Encoded(_) = ticket {
            tracing::debug!(ticket_id = %ticket.id(), "Ticket is already encoded");
            return Ok(ticket);
        }

        tracing::debug!(ticket_id = %ticket.id(), kind = %ticket.kind(), "Encoding ticket");
        let serialized = bincode::serialize(&ticket)?;
        let encoded_ticket = cipher.encrypt(&serialized)?;
        let encoded = EncodedTicket {
            id: self.encode_ticket_id(ticket.id()),
            encoded_ticket,
        };
        tracing::debug!(encoded_id = %encoded.id, cipher = cipher.name(), "Created encoded ticket");

        Ok(Ticket::Encoded(encoded))
    }

    /// Decode a stored ticket.
    ///
    /// Plaintext tickets found while a cipher is enabled are returned as they
    /// are, with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Crypto`] or [`RegistryError::Serialization`]
    /// if the payload cannot be decrypted or deserialized.
    pub fn decode_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        let Some(cipher) = self.enabled_cipher() else {
            tracing::trace!("{}", CIPHER_DISABLED);
            return Ok(ticket);
        };
        let encoded = match ticket {
            Ticket::Encoded(encoded) => encoded,
            plain => {
                tracing::warn!(
                    kind = %plain.kind(),
                    "Ticket passed is not an encoded ticket type; no decoding is necessary"
                );
                return Ok(plain);
            }
        };

        tracing::debug!(encoded_id = %encoded.id, "Attempting to decode ticket");
        let decrypted = cipher.decrypt(&encoded.encoded_ticket)?;
        let decoded: Ticket = bincode::deserialize(&decrypted)?;
        if let Ticket::Encoded(_) = decoded {
            return Err(RegistryError::Serialization(format!(
                "Encoded ticket [{}] decoded to another encoded ticket",
                encoded.id
            )));
        }
        tracing::debug!(ticket_id = %decoded.id(), kind = %decoded.kind(), "Decoded ticket");

        Ok(decoded)
    }

    /// Decode every ticket, stopping at the first failure.
    ///
    /// Does no per-ticket work when the cipher is disabled.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error.
    pub fn decode_tickets<I>(&self, tickets: I) -> Result<Vec<Ticket>>
    where
        I: IntoIterator<Item = Ticket>,
    {
        if !self.is_cipher_enabled() {
            tracing::trace!("{}", CIPHER_DISABLED);
            return Ok(tickets.into_iter().collect());
        }
        tickets
            .into_iter()
            .map(|ticket| self.decode_ticket(ticket))
            .collect()
    }
}

impl fmt::Debug for TicketCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketCodec")
            .field("cipher", &self.cipher.as_ref().map(|cipher| cipher.name()))
            .field("enabled", &self.is_cipher_enabled())
            .finish()
    }
}

fn sha512_hex(value: &str) -> String {
    hex::encode(Sha512::digest(value.as_bytes()))
}
