//! In-memory ticket stores for testing.

use crate::error::{RegistryError, Result};
use crate::providers::TicketStore;
use crate::ticket::Ticket;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory ticket store.
///
/// Clones share the same map, so a test can keep a handle for inspection
/// after moving the store into a registry. Every `put` and successful
/// `delete` bumps a write counter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketStore {
    tickets: Arc<Mutex<HashMap<String, Ticket>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryTicketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Stored keys, sorted (for testing).
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.snapshot().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Ticket stored under `key`, exactly as stored (for testing).
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Ticket> {
        self.snapshot().get(key).cloned()
    }

    /// Number of writes (puts and effective deletes) performed so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> MutexGuard<'_, HashMap<String, Ticket>> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Ticket>>> {
        self.tickets
            .lock()
            .map_err(|_| RegistryError::Storage("Ticket store lock poisoned".to_string()))
    }
}

impl TicketStore for InMemoryTicketStore {
    async fn put(&self, key: &str, ticket: Ticket) -> Result<()> {
        self.lock()?.insert(key.to_string(), ticket);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Ticket>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.lock()?.remove(key).is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }

    async fn scan(&self) -> Result<Vec<Ticket>> {
        Ok(self.lock()?.values().cloned().collect())
    }
}

/// Store wrapper that cannot enumerate its tickets.
///
/// Keeps the default [`TicketStore::scan`], so counters over it report
/// [`UNKNOWN_COUNT`](crate::constants::UNKNOWN_COUNT).
#[derive(Debug, Clone, Default)]
pub struct ScanlessTicketStore<S = InMemoryTicketStore> {
    inner: S,
}

impl<S: TicketStore> ScanlessTicketStore<S> {
    /// Wrap `inner`.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TicketStore> TicketStore for ScanlessTicketStore<S> {
    async fn put(&self, key: &str, ticket: Ticket) -> Result<()> {
        self.inner.put(key, ticket).await
    }

    async fn get(&self, key: &str) -> Result<Option<Ticket>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.inner.delete(key).await
    }
}
