//! Default ticket factory.
//!
//! Ids have the form `{PREFIX}-{sequence}-{random}`:
//! - `sequence` is a per-factory monotonic counter
//! - `random` is 32 bytes from the thread RNG, base64url without padding
//!
//! The sequence makes ids unique within one factory; the random part makes
//! them unguessable and unique across nodes.

use crate::config::TicketExpirationConfig;
use crate::providers::TicketFactory;
use crate::ticket::{ProxyGrantingTicket, ServiceTicket, TicketGrantingTicket, TicketKind};
use base64::Engine;
use rand::RngCore;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use ticketry_auth::Authentication;
use ticketry_core::Service;
use ticketry_core::environment::{Clock, SystemClock};

/// Random bytes in each ticket id.
const RANDOM_ID_BYTES: usize = 32;

/// Ticket factory stamping creation times from a [`Clock`].
pub struct DefaultTicketFactory {
    clock: Arc<dyn Clock>,
    expiration: TicketExpirationConfig,
    sequence: AtomicU64,
}

impl DefaultTicketFactory {
    /// Factory using the system clock and default lifetimes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Factory using `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            expiration: TicketExpirationConfig::default(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Set the expiration policies.
    #[must_use]
    pub const fn with_expiration(mut self, expiration: TicketExpirationConfig) -> Self {
        self.expiration = expiration;
        self
    }

    /// Expiration policies applied to new tickets.
    #[must_use]
    pub const fn expiration(&self) -> &TicketExpirationConfig {
        &self.expiration
    }

    fn next_id(&self, kind: TicketKind) -> String {
        let prefix = kind.prefix();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;

        let mut random_bytes = [0u8; RANDOM_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        let random = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes);

        format!("{prefix}-{sequence}-{random}")
    }
}

impl Default for DefaultTicketFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultTicketFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultTicketFactory")
            .field("expiration", &self.expiration)
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl TicketFactory for DefaultTicketFactory {
    fn create_ticket_granting_ticket(&self, authentication: Authentication) -> TicketGrantingTicket {
        let id = self.next_id(TicketKind::TicketGranting);
        tracing::debug!(ticket_id = %id, principal = %authentication.principal.id, "Created ticket-granting ticket");
        TicketGrantingTicket::new(
            id,
            authentication,
            self.clock.now(),
            self.expiration.ticket_granting_ticket,
        )
    }

    fn grant_service_ticket(
        &self,
        ticket_granting_ticket: &mut TicketGrantingTicket,
        service: Service,
        from_new_login: bool,
    ) -> ServiceTicket {
        let id = self.next_id(TicketKind::Service);
        ticket_granting_ticket.grant_service_ticket(id.clone(), service.clone());
        tracing::debug!(
            ticket_id = %id,
            parent_id = %ticket_granting_ticket.id,
            service = %service,
            "Granted service ticket"
        );

        ServiceTicket {
            id,
            creation_time: self.clock.now(),
            expiration_policy: self.expiration.service_ticket,
            ticket_granting_ticket_id: ticket_granting_ticket.id.clone(),
            service,
            from_new_login,
        }
    }

    fn grant_proxy_granting_ticket(
        &self,
        ticket_granting_ticket: &mut TicketGrantingTicket,
        service: Service,
    ) -> ProxyGrantingTicket {
        let id = self.next_id(TicketKind::ProxyGranting);
        ticket_granting_ticket.add_proxy_granting_ticket(id.clone(), service.clone());
        tracing::debug!(
            ticket_id = %id,
            parent_id = %ticket_granting_ticket.id,
            service = %service,
            "Granted proxy-granting ticket"
        );

        ProxyGrantingTicket {
            ticket_granting_ticket: TicketGrantingTicket::new(
                id,
                ticket_granting_ticket.authentication.clone(),
                self.clock.now(),
                self.expiration.proxy_granting_ticket,
            ),
            parent_ticket_granting_ticket_id: ticket_granting_ticket.id.clone(),
            proxied_by: service,
        }
    }
}
