//! Ticket registry.
//!
//! The registry layers cascading delete and encryption at rest over any
//! [`TicketStore`]. It performs no locking of its own: every store call is
//! atomic for one key, and a cascade is a best-effort sequence of such calls.
//! A crash part way through can leave orphaned service tickets behind; those
//! are treated as invalid by [`TicketRegistry::is_orphaned`] rather than
//! repaired.
//!
//! # Cascading delete
//!
//! ```text
//! delete(TGT)  = delete(ST children)
//!              + delete(PGT children, each with its own ST children)
//!              + delete(TGT)
//! delete(PGT)  = delete(ST children) + detach from parent TGT + delete(PGT)
//! delete(ST)   = delete(ST)
//! ```

use crate::config::TicketRegistryConfig;
use crate::constants::UNKNOWN_COUNT;
use crate::encoding::TicketCodec;
use crate::error::{RegistryError, Result};
use crate::providers::{CipherExecutor, TicketStore};
use crate::ticket::{ProxyGrantingTicket, ServiceTicket, Ticket, TicketGrantingTicket, TicketKind};
use std::sync::Arc;

/// Storage-agnostic ticket registry.
///
/// # Example
///
/// ```
/// use ticketry_registry::mocks::InMemoryTicketStore;
/// use ticketry_registry::TicketRegistry;
///
/// # async fn example() -> ticketry_registry::Result<()> {
/// let registry = TicketRegistry::new(InMemoryTicketStore::new());
///
/// assert_eq!(registry.delete_ticket("TGT-unknown").await?, 0);
/// assert!(registry.get_ticket("TGT-unknown").await?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TicketRegistry<S> {
    store: S,
    codec: TicketCodec,
}

impl<S: TicketStore> TicketRegistry<S> {
    /// Registry storing plaintext tickets.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            codec: TicketCodec::disabled(),
        }
    }

    /// Registry encrypting tickets at rest with `cipher` (when it is enabled).
    #[must_use]
    pub fn with_cipher(store: S, cipher: Arc<dyn CipherExecutor>) -> Self {
        Self {
            store,
            codec: TicketCodec::new(Some(cipher)),
        }
    }

    /// Registry configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Configuration`] if the cipher cannot be built.
    pub fn from_config(store: S, config: &TicketRegistryConfig) -> Result<Self> {
        let cipher = config.crypto.build_cipher()?;
        tracing::info!(
            cipher = cipher.name(),
            encryption = cipher.is_enabled(),
            "Configured ticket registry"
        );
        Ok(Self::with_cipher(store, cipher))
    }

    /// Backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ═══════════════════════════════════════════════════════════
    // CRUD
    // ═══════════════════════════════════════════════════════════

    /// Store a new ticket, encoding it first if encryption is enabled.
    ///
    /// # Errors
    ///
    /// Returns error if encoding or the store write fails.
    pub async fn add_ticket(&self, ticket: impl Into<Ticket>) -> Result<()> {
        let ticket = ticket.into();
        let kind = ticket.kind();
        self.put_ticket(ticket).await?;
        metrics::counter!("ticket_registry.tickets_added", "kind" => kind.as_str()).increment(1);
        Ok(())
    }

    /// Persist changes to an existing ticket (e.g., updated child maps).
    ///
    /// # Errors
    ///
    /// Returns error if encoding or the store write fails.
    pub async fn update_ticket(&self, ticket: impl Into<Ticket>) -> Result<()> {
        self.put_ticket(ticket.into()).await
    }

    async fn put_ticket(&self, ticket: Ticket) -> Result<()> {
        let ticket_id = ticket.id().to_string();
        let encoded = self.codec.encode_ticket(ticket)?;
        let key = encoded.id().to_string();
        self.store.put(&key, encoded).await?;
        tracing::debug!(ticket_id = %ticket_id, "Stored ticket");
        Ok(())
    }

    /// Fetch and decode a ticket.
    ///
    /// # Returns
    ///
    /// - `Some(ticket)` if found
    /// - `None` if the id is blank or nothing is stored under it
    ///
    /// # Errors
    ///
    /// Returns error if the store read or decoding fails.
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
        if ticket_id.trim().is_empty() {
            return Ok(None);
        }
        let key = self.codec.encode_ticket_id(ticket_id);
        match self.store.get(&key).await? {
            Some(stored) => Ok(Some(self.codec.decode_ticket(stored)?)),
            None => {
                tracing::trace!(ticket_id = %ticket_id, "Ticket not found in the registry");
                Ok(None)
            }
        }
    }

    /// Fetch a ticket that must be of kind `expected`.
    ///
    /// A proxy-granting ticket satisfies a lookup for a ticket-granting ticket.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TypeMismatch`] if the ticket exists with
    /// another kind, or any error of [`get_ticket`](Self::get_ticket).
    pub async fn get_ticket_as(&self, ticket_id: &str, expected: TicketKind) -> Result<Option<Ticket>> {
        let Some(ticket) = self.get_ticket(ticket_id).await? else {
            return Ok(None);
        };
        if !ticket.kind().matches(expected) {
            return Err(RegistryError::TypeMismatch {
                id: ticket.id().to_string(),
                expected: expected.to_string(),
                actual: ticket.kind().to_string(),
            });
        }
        Ok(Some(ticket))
    }

    /// Fetch a service ticket.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TypeMismatch`] if the id names another kind of ticket.
    pub async fn get_service_ticket(&self, ticket_id: &str) -> Result<Option<ServiceTicket>> {
        Ok(self
            .get_ticket_as(ticket_id, TicketKind::Service)
            .await?
            .and_then(Ticket::into_service_ticket))
    }

    /// Fetch a proxy-granting ticket.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::TypeMismatch`] if the id names another kind of ticket.
    pub async fn get_proxy_granting_ticket(&self, ticket_id: &str) -> Result<Option<ProxyGrantingTicket>> {
        Ok(self
            .get_ticket_as(ticket_id, TicketKind::ProxyGranting)
            .await?
            .and_then(Ticket::into_proxy_granting_ticket))
    }

    /// Every ticket in the store, decoded.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unsupported`] if the store cannot scan, or a
    /// decoding error.
    pub async fn get_tickets(&self) -> Result<Vec<Ticket>> {
        let stored = self.store.scan().await?;
        self.codec.decode_tickets(stored)
    }

    /// Whether the parent of `service_ticket` no longer resolves.
    ///
    /// # Errors
    ///
    /// Returns error if the parent lookup fails.
    pub async fn is_orphaned(&self, service_ticket: &ServiceTicket) -> Result<bool> {
        Ok(self
            .get_ticket(&service_ticket.ticket_granting_ticket_id)
            .await?
            .is_none())
    }

    // ═══════════════════════════════════════════════════════════
    // Deletion
    // ═══════════════════════════════════════════════════════════

    /// Delete a ticket and everything derived from it.
    ///
    /// # Returns
    ///
    /// Number of tickets removed, including the ticket itself. `0` if the id
    /// is blank or unknown; in that case nothing is written.
    ///
    /// # Errors
    ///
    /// Returns error on store or decoding failure. Tickets removed before the
    /// failure stay removed.
    pub async fn delete_ticket(&self, ticket_id: &str) -> Result<usize> {
        if ticket_id.trim().is_empty() {
            tracing::trace!("No ticket id is provided for deletion");
            return Ok(0);
        }
        let Some(ticket) = self.get_ticket(ticket_id).await? else {
            tracing::trace!(ticket_id = %ticket_id, "Could not fetch ticket from the registry");
            return Ok(0);
        };
        self.delete_resolved_ticket(&ticket).await
    }

    /// Delete an already-resolved ticket and everything derived from it.
    ///
    /// # Errors
    ///
    /// Returns error on store or decoding failure.
    pub async fn delete_resolved_ticket(&self, ticket: &Ticket) -> Result<usize> {
        let count = match ticket {
            Ticket::TicketGranting(tgt) => self.delete_ticket_granting_ticket(tgt).await?,
            Ticket::ProxyGranting(pgt) => self.delete_proxy_granting_ticket(pgt).await?,
            Ticket::Service(_) | Ticket::Encoded(_) => usize::from(self.delete_single_ticket(ticket.id()).await?),
        };

        metrics::counter!("ticket_registry.tickets_deleted").increment(u64::try_from(count).unwrap_or(u64::MAX));
        Ok(count)
    }

    async fn delete_ticket_granting_ticket(&self, tgt: &TicketGrantingTicket) -> Result<usize> {
        tracing::debug!(ticket_id = %tgt.id, "Removing children of ticket from the registry");
        let mut count = self.delete_children(tgt).await?;
        count += self.delete_linked_proxy_granting_tickets(tgt).await?;

        tracing::debug!(ticket_id = %tgt.id, "Removing ticket from the registry");
        if self.delete_single_ticket(&tgt.id).await? {
            count += 1;
        }
        Ok(count)
    }

    async fn delete_proxy_granting_ticket(&self, pgt: &ProxyGrantingTicket) -> Result<usize> {
        tracing::debug!(ticket_id = %pgt.id(), "Removing children of ticket from the registry");
        let mut count = self.delete_children(&pgt.ticket_granting_ticket).await?;
        self.detach_from_parent(pgt).await?;

        tracing::debug!(ticket_id = %pgt.id(), "Removing ticket from the registry");
        if self.delete_single_ticket(pgt.id()).await? {
            count += 1;
        }
        Ok(count)
    }

    /// Delete the service tickets issued from `tgt`.
    async fn delete_children(&self, tgt: &TicketGrantingTicket) -> Result<usize> {
        let mut count = 0;
        for service_ticket_id in tgt.services.keys() {
            if self.delete_single_ticket(service_ticket_id).await? {
                tracing::debug!(ticket_id = %service_ticket_id, "Removed ticket");
                count += 1;
            } else {
                tracing::debug!(ticket_id = %service_ticket_id, "Unable to remove ticket");
            }
        }
        Ok(count)
    }

    /// Delete the proxy-granting tickets spawned by a root `tgt`.
    async fn delete_linked_proxy_granting_tickets(&self, tgt: &TicketGrantingTicket) -> Result<usize> {
        if tgt.proxy_granting_tickets.is_empty() {
            return Ok(0);
        }

        let mut count = 0;
        for pgt_id in tgt.proxy_granting_tickets.keys() {
            count += match self.get_ticket(pgt_id).await? {
                Some(Ticket::ProxyGranting(pgt)) => self.delete_proxy_granting_ticket(&pgt).await?,
                Some(other) => usize::from(self.delete_single_ticket(other.id()).await?),
                None => 0,
            };
        }

        tracing::debug!(ticket_id = %tgt.id, "Removing proxy-granting tickets from parent ticket-granting ticket");
        let mut updated = tgt.clone();
        updated.proxy_granting_tickets.clear();
        self.update_ticket(updated).await?;
        Ok(count)
    }

    async fn detach_from_parent(&self, pgt: &ProxyGrantingTicket) -> Result<()> {
        let parent_id = &pgt.parent_ticket_granting_ticket_id;
        let Some(parent) = self.get_ticket(parent_id).await? else {
            tracing::debug!(ticket_id = %pgt.id(), parent_id = %parent_id, "Parent ticket is already gone");
            return Ok(());
        };

        match parent {
            Ticket::TicketGranting(mut tgt) => {
                tgt.remove_proxy_granting_ticket(pgt.id());
                self.update_ticket(tgt).await
            }
            Ticket::ProxyGranting(mut parent_pgt) => {
                parent_pgt.ticket_granting_ticket.remove_proxy_granting_ticket(pgt.id());
                self.update_ticket(parent_pgt).await
            }
            Ticket::Service(_) | Ticket::Encoded(_) => {
                tracing::warn!(ticket_id = %pgt.id(), parent_id = %parent_id, "Parent ticket is not a ticket-granting ticket");
                Ok(())
            }
        }
    }

    /// Delete exactly one ticket, without cascading.
    ///
    /// # Errors
    ///
    /// Returns error if the store delete fails.
    pub async fn delete_single_ticket(&self, ticket_id: &str) -> Result<bool> {
        let key = self.codec.encode_ticket_id(ticket_id);
        self.store.delete(&key).await
    }

    /// Delete every ticket in the store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unsupported`] if the store cannot scan, or a
    /// store error.
    pub async fn delete_all(&self) -> Result<usize> {
        let stored = self.store.scan().await?;
        let mut count = 0;
        // Stored ids are already storage keys; no re-encoding.
        for ticket in &stored {
            if self.store.delete(ticket.id()).await? {
                count += 1;
            }
        }
        tracing::info!(count, "Removed all tickets from the registry");
        Ok(count)
    }

    // ═══════════════════════════════════════════════════════════
    // Counters
    // ═══════════════════════════════════════════════════════════

    /// Number of ticket-granting tickets (including proxy-granting tickets).
    ///
    /// Returns [`UNKNOWN_COUNT`] if the store cannot count.
    pub async fn session_count(&self) -> i64 {
        self.count_tickets(TicketKind::TicketGranting, "session_count").await
    }

    /// Number of service tickets.
    ///
    /// Returns [`UNKNOWN_COUNT`] if the store cannot count.
    pub async fn service_ticket_count(&self) -> i64 {
        self.count_tickets(TicketKind::Service, "service_ticket_count").await
    }

    async fn count_tickets(&self, kind: TicketKind, operation: &'static str) -> i64 {
        match self.get_tickets().await {
            Ok(tickets) => {
                let count = tickets.iter().filter(|ticket| ticket.kind().matches(kind)).count();
                i64::try_from(count).unwrap_or(i64::MAX)
            }
            Err(e) => {
                tracing::trace!(
                    operation,
                    error = %e,
                    unknown = UNKNOWN_COUNT,
                    "Operation is not supported by the ticket store; returning unknown"
                );
                UNKNOWN_COUNT
            }
        }
    }

    // ═══════════════════════════════════════════════════════════
    // Encoding
    // ═══════════════════════════════════════════════════════════

    /// Whether tickets are encrypted at rest.
    #[must_use]
    pub fn is_cipher_enabled(&self) -> bool {
        self.codec.is_cipher_enabled()
    }

    /// Storage key for `ticket_id`.
    #[must_use]
    pub fn encode_ticket_id(&self, ticket_id: &str) -> String {
        self.codec.encode_ticket_id(ticket_id)
    }

    /// Encode a ticket for storage.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or encryption fails.
    pub fn encode_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        self.codec.encode_ticket(ticket)
    }

    /// Decode a stored ticket.
    ///
    /// # Errors
    ///
    /// Returns error if decryption or deserialization fails.
    pub fn decode_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        self.codec.decode_ticket(ticket)
    }

    /// Decode stored tickets.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error.
    pub fn decode_tickets(&self, tickets: impl IntoIterator<Item = Ticket>) -> Result<Vec<Ticket>> {
        self.codec.decode_tickets(tickets)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{InMemoryTicketStore, ScanlessTicketStore};
    use crate::ticket::ExpirationPolicy;
    use chrono::Utc;
    use ticketry_auth::{AuthenticationBuilder, Principal};
    use ticketry_core::Service;

    fn tgt(id: &str) -> TicketGrantingTicket {
        let authentication = AuthenticationBuilder::new(Principal::new("casuser")).build().unwrap();
        TicketGrantingTicket::new(id, authentication, Utc::now(), ExpirationPolicy::NeverExpires)
    }

    fn st(id: &str, parent: &mut TicketGrantingTicket) -> ServiceTicket {
        let service = Service::new("https://app.example.org");
        parent.grant_service_ticket(id, service.clone());
        ServiceTicket {
            id: id.to_string(),
            creation_time: Utc::now(),
            expiration_policy: ExpirationPolicy::NeverExpires,
            ticket_granting_ticket_id: parent.id.clone(),
            service,
            from_new_login: false,
        }
    }

    fn pgt(id: &str, parent: &mut TicketGrantingTicket) -> ProxyGrantingTicket {
        let service = Service::new("https://proxy.example.org");
        parent.add_proxy_granting_ticket(id, service.clone());
        ProxyGrantingTicket {
            ticket_granting_ticket: tgt(id),
            parent_ticket_granting_ticket_id: parent.id.clone(),
            proxied_by: service,
        }
    }

    #[tokio::test]
    async fn test_blank_ids_resolve_to_nothing() {
        let store = InMemoryTicketStore::new();
        let registry = TicketRegistry::new(store.clone());

        assert!(registry.get_ticket("  ").await.unwrap().is_none());
        assert_eq!(registry.delete_ticket("").await.unwrap(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_deleting_proxy_granting_ticket_detaches_it_from_parent() {
        let registry = TicketRegistry::new(InMemoryTicketStore::new());
        let mut root = tgt("TGT-1");
        let mut proxy = pgt("PGT-1", &mut root);
        let proxied = st("ST-P1", &mut proxy.ticket_granting_ticket);
        registry.add_ticket(root).await.unwrap();
        registry.add_ticket(proxy).await.unwrap();
        registry.add_ticket(proxied).await.unwrap();

        assert_eq!(registry.delete_ticket("PGT-1").await.unwrap(), 2);

        let Some(Ticket::TicketGranting(root)) = registry.get_ticket("TGT-1").await.unwrap() else {
            unreachable!("root ticket-granting ticket must survive");
        };
        assert!(root.proxy_granting_tickets.is_empty());
        assert!(registry.get_ticket("ST-P1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_proxy_granting_ticket_without_parent() {
        let registry = TicketRegistry::new(InMemoryTicketStore::new());
        let mut root = tgt("TGT-1");
        registry.add_ticket(pgt("PGT-1", &mut root)).await.unwrap();

        assert_eq!(registry.delete_ticket("PGT-1").await.unwrap(), 1);
        assert!(registry.get_ticket("TGT-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_service_ticket_delete_does_not_cascade() {
        let registry = TicketRegistry::new(InMemoryTicketStore::new());
        let mut root = tgt("TGT-1");
        let service_ticket = st("ST-1", &mut root);
        registry.add_ticket(root).await.unwrap();
        registry.add_ticket(service_ticket).await.unwrap();

        assert_eq!(registry.delete_ticket("ST-1").await.unwrap(), 1);
        assert!(registry.get_ticket("TGT-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_proxy_granting_ticket_satisfies_ticket_granting_lookup() {
        let registry = TicketRegistry::new(InMemoryTicketStore::new());
        let mut root = tgt("TGT-1");
        registry.add_ticket(pgt("PGT-1", &mut root)).await.unwrap();

        let found = registry
            .get_ticket_as("PGT-1", TicketKind::TicketGranting)
            .await
            .unwrap();
        assert_eq!(found.map(|ticket| ticket.kind()), Some(TicketKind::ProxyGranting));

        let mismatch = registry.get_service_ticket("PGT-1").await;
        assert!(matches!(mismatch, Err(RegistryError::TypeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_orphaned_service_ticket() {
        let registry = TicketRegistry::new(InMemoryTicketStore::new());
        let mut root = tgt("TGT-1");
        let service_ticket = st("ST-1", &mut root);
        registry.add_ticket(root).await.unwrap();
        registry.add_ticket(service_ticket.clone()).await.unwrap();

        assert!(!registry.is_orphaned(&service_ticket).await.unwrap());
        registry.delete_single_ticket("TGT-1").await.unwrap();
        assert!(registry.is_orphaned(&service_ticket).await.unwrap());
    }

    #[tokio::test]
    async fn test_counts_include_proxy_granting_tickets() {
        let registry = TicketRegistry::new(InMemoryTicketStore::new());
        let mut root = tgt("TGT-1");
        let proxy = pgt("PGT-1", &mut root);
        let service_ticket = st("ST-1", &mut root);
        registry.add_ticket(root).await.unwrap();
        registry.add_ticket(proxy).await.unwrap();
        registry.add_ticket(service_ticket).await.unwrap();

        assert_eq!(registry.session_count().await, 2);
        assert_eq!(registry.service_ticket_count().await, 1);
    }

    #[tokio::test]
    async fn test_scanless_store_reports_unknown_counts() {
        let registry = TicketRegistry::new(ScanlessTicketStore::new(InMemoryTicketStore::new()));
        registry.add_ticket(tgt("TGT-1")).await.unwrap();

        assert_eq!(registry.session_count().await, UNKNOWN_COUNT);
        assert_eq!(registry.service_ticket_count().await, UNKNOWN_COUNT);
        assert_eq!(registry.delete_all().await, Err(RegistryError::Unsupported("scan")));
    }

    #[tokio::test]
    async fn test_delete_all() {
        let store = InMemoryTicketStore::new();
        let registry = TicketRegistry::new(store.clone());
        registry.add_ticket(tgt("TGT-1")).await.unwrap();
        registry.add_ticket(tgt("TGT-2")).await.unwrap();

        assert_eq!(registry.delete_all().await.unwrap(), 2);
        assert!(store.is_empty());
    }
}
