//! Ticket store trait.

use crate::error::{RegistryError, Result};
use crate::ticket::Ticket;

/// Backing key-value store for tickets.
///
/// The registry decides the key (the ticket id, hashed when encryption is
/// enabled) and the stored value (the ticket, or its encrypted wrapper). The
/// store only has to make each single-key operation atomic.
///
/// # Implementation Notes
///
/// - No cross-key transactions are required; cascading deletes are best effort
/// - Failures are reported, never retried here
/// - `scan()` is optional; stores without a cheap full scan keep the default,
///   and the registry reports unknown counts instead of failing
pub trait TicketStore: Send + Sync {
    /// Store `ticket` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn put(
        &self,
        key: &str,
        ticket: Ticket,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch the ticket stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Some(ticket)` if found
    /// - `None` if no ticket is stored under `key`
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ticket>>> + Send;

    /// Delete the ticket stored under `key`.
    ///
    /// # Returns
    ///
    /// `true` if a ticket was removed.
    ///
    /// # Errors
    ///
    /// Returns error if the delete fails.
    fn delete(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Every stored ticket, as stored.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unsupported`] unless the store overrides it.
    fn scan(&self) -> impl std::future::Future<Output = Result<Vec<Ticket>>> + Send {
        async { Err(RegistryError::Unsupported("scan")) }
    }
}
