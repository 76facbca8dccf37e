//! Ticket model.
//!
//! Tickets form a tree rooted at a ticket-granting ticket:
//!
//! ```text
//! TGT ──┬── ST, ST, ...                 (services map)
//!       └── PGT ──── ST, ST, ...        (proxy_granting_tickets map)
//! ```
//!
//! Parent and child links are ticket ids, resolved through the registry. No
//! ticket holds a live reference to another.

use crate::constants::ticket_prefixes;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ticketry_auth::Authentication;
use ticketry_core::Service;

/// Ticket variant discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    /// Root of an SSO session.
    TicketGranting,

    /// Single-use ticket for one service.
    Service,

    /// Ticket-granting ticket issued to a proxying service.
    ProxyGranting,

    /// Encrypted storage wrapper.
    Encoded,
}

impl TicketKind {
    /// Id prefix for tickets of this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::TicketGranting => ticket_prefixes::TICKET_GRANTING_TICKET,
            Self::Service => ticket_prefixes::SERVICE_TICKET,
            Self::ProxyGranting => ticket_prefixes::PROXY_GRANTING_TICKET,
            Self::Encoded => ticket_prefixes::ENCODED_TICKET,
        }
    }

    /// Conventional type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TicketGranting => "TicketGrantingTicket",
            Self::Service => "ServiceTicket",
            Self::ProxyGranting => "ProxyGrantingTicket",
            Self::Encoded => "EncodedTicket",
        }
    }

    /// Whether a ticket of this kind satisfies a lookup for `expected`.
    ///
    /// A proxy-granting ticket is a specialised ticket-granting ticket, so it
    /// also satisfies [`TicketKind::TicketGranting`].
    #[must_use]
    pub const fn matches(self, expected: Self) -> bool {
        matches!(
            (self, expected),
            (Self::TicketGranting, Self::TicketGranting)
                | (Self::ProxyGranting, Self::TicketGranting | Self::ProxyGranting)
                | (Self::Service, Self::Service)
                | (Self::Encoded, Self::Encoded)
        )
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a ticket stops being valid.
///
/// Policies are plain data so they survive encryption at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpirationPolicy {
    /// Never expires.
    NeverExpires,

    /// Always expired.
    AlwaysExpires,

    /// Expires a fixed number of seconds after creation.
    HardTimeout {
        /// Lifetime in seconds.
        time_to_live_secs: i64,
    },
}

impl ExpirationPolicy {
    /// Hard timeout of `duration`.
    #[must_use]
    pub fn hard_timeout(duration: Duration) -> Self {
        Self::HardTimeout {
            time_to_live_secs: duration.num_seconds(),
        }
    }

    /// Whether a ticket created at `creation_time` is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, creation_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::NeverExpires => false,
            Self::AlwaysExpires => true,
            Self::HardTimeout { time_to_live_secs } => {
                now.signed_duration_since(creation_time).num_seconds() >= *time_to_live_secs
            }
        }
    }
}

/// Root of an SSO session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketGrantingTicket {
    /// Ticket id.
    pub id: String,

    /// Creation timestamp.
    pub creation_time: DateTime<Utc>,

    /// Expiration policy.
    pub expiration_policy: ExpirationPolicy,

    /// Authentication that produced this session.
    pub authentication: Authentication,

    /// Live service tickets issued from this ticket.
    pub services: BTreeMap<String, Service>,

    /// Proxy-granting tickets derived from this ticket.
    pub proxy_granting_tickets: BTreeMap<String, Service>,
}

impl TicketGrantingTicket {
    /// Create a ticket-granting ticket with no children.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        authentication: Authentication,
        creation_time: DateTime<Utc>,
        expiration_policy: ExpirationPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            creation_time,
            expiration_policy,
            authentication,
            services: BTreeMap::new(),
            proxy_granting_tickets: BTreeMap::new(),
        }
    }

    /// Record a service ticket issued from this ticket.
    pub fn grant_service_ticket(&mut self, service_ticket_id: impl Into<String>, service: Service) {
        self.services.insert(service_ticket_id.into(), service);
    }

    /// Record a proxy-granting ticket derived from this ticket.
    pub fn add_proxy_granting_ticket(&mut self, proxy_granting_ticket_id: impl Into<String>, service: Service) {
        self.proxy_granting_tickets
            .insert(proxy_granting_ticket_id.into(), service);
    }

    /// Forget a proxy-granting ticket. Returns `true` if it was recorded.
    pub fn remove_proxy_granting_ticket(&mut self, proxy_granting_ticket_id: &str) -> bool {
        self.proxy_granting_tickets
            .remove(proxy_granting_ticket_id)
            .is_some()
    }

    /// Whether this ticket is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_policy.is_expired(self.creation_time, now)
    }
}

/// Ticket granting access to one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTicket {
    /// Ticket id.
    pub id: String,

    /// Creation timestamp.
    pub creation_time: DateTime<Utc>,

    /// Expiration policy.
    pub expiration_policy: ExpirationPolicy,

    /// Id of the ticket-granting ticket this ticket was issued from.
    pub ticket_granting_ticket_id: String,

    /// Service the ticket is valid for.
    pub service: Service,

    /// Whether the ticket was issued right after a fresh login.
    pub from_new_login: bool,
}

impl ServiceTicket {
    /// Whether this ticket is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_policy.is_expired(self.creation_time, now)
    }
}

/// Ticket-granting ticket issued to a proxying service.
///
/// Carries a full ticket-granting body (so it can have service-ticket
/// children of its own) and the id of the ticket it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyGrantingTicket {
    /// Ticket-granting body; its id is this ticket's id.
    pub ticket_granting_ticket: TicketGrantingTicket,

    /// Id of the ticket-granting ticket this ticket was derived from.
    pub parent_ticket_granting_ticket_id: String,

    /// Service acting as the proxy.
    pub proxied_by: Service,
}

impl ProxyGrantingTicket {
    /// Ticket id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.ticket_granting_ticket.id
    }

    /// Whether this ticket is expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.ticket_granting_ticket.is_expired(now)
    }
}

/// Encrypted stand-in for a ticket at rest.
///
/// Only exists between encoding and decoding; never handed to callers as a
/// domain ticket.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedTicket {
    /// Hashed ticket id.
    pub id: String,

    /// Encrypted serialized ticket.
    pub encoded_ticket: Vec<u8>,
}

impl fmt::Debug for EncodedTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedTicket")
            .field("id", &self.id)
            .field("encoded_len", &self.encoded_ticket.len())
            .finish()
    }
}

/// Any ticket the registry can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ticket {
    /// Ticket-granting ticket.
    TicketGranting(TicketGrantingTicket),

    /// Service ticket.
    Service(ServiceTicket),

    /// Proxy-granting ticket.
    ProxyGranting(ProxyGrantingTicket),

    /// Encrypted ticket.
    Encoded(EncodedTicket),
}

impl Ticket {
    /// Ticket id.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::TicketGranting(tgt) => &tgt.id,
            Self::Service(st) => &st.id,
            Self::ProxyGranting(pgt) => pgt.id(),
            Self::Encoded(encoded) => &encoded.id,
        }
    }

    /// Variant discriminator.
    #[must_use]
    pub const fn kind(&self) -> TicketKind {
        match self {
            Self::TicketGranting(_) => TicketKind::TicketGranting,
            Self::Service(_) => TicketKind::Service,
            Self::ProxyGranting(_) => TicketKind::ProxyGranting,
            Self::Encoded(_) => TicketKind::Encoded,
        }
    }

    /// Creation timestamp. Encoded tickets do not expose one.
    #[must_use]
    pub const fn creation_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::TicketGranting(tgt) => Some(tgt.creation_time),
            Self::Service(st) => Some(st.creation_time),
            Self::ProxyGranting(pgt) => Some(pgt.ticket_granting_ticket.creation_time),
            Self::Encoded(_) => None,
        }
    }

    /// Whether this ticket is expired at `now`. Encoded tickets never are.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::TicketGranting(tgt) => tgt.is_expired(now),
            Self::Service(st) => st.is_expired(now),
            Self::ProxyGranting(pgt) => pgt.is_expired(now),
            Self::Encoded(_) => false,
        }
    }

    /// Ticket-granting view of TGTs and PGTs.
    #[must_use]
    pub const fn as_ticket_granting_ticket(&self) -> Option<&TicketGrantingTicket> {
        match self {
            Self::TicketGranting(tgt) => Some(tgt),
            Self::ProxyGranting(pgt) => Some(&pgt.ticket_granting_ticket),
            Self::Service(_) | Self::Encoded(_) => None,
        }
    }

    /// The service ticket, if this is one.
    #[must_use]
    pub fn into_service_ticket(self) -> Option<ServiceTicket> {
        match self {
            Self::Service(st) => Some(st),
            _ => None,
        }
    }

    /// The proxy-granting ticket, if this is one.
    #[must_use]
    pub fn into_proxy_granting_ticket(self) -> Option<ProxyGrantingTicket> {
        match self {
            Self::ProxyGranting(pgt) => Some(pgt),
            _ => None,
        }
    }
}

impl From<TicketGrantingTicket> for Ticket {
    fn from(ticket: TicketGrantingTicket) -> Self {
        Self::TicketGranting(ticket)
    }
}

impl From<ServiceTicket> for Ticket {
    fn from(ticket: ServiceTicket) -> Self {
        Self::Service(ticket)
    }
}

impl From<ProxyGrantingTicket> for Ticket {
    fn from(ticket: ProxyGrantingTicket) -> Self {
        Self::ProxyGranting(ticket)
    }
}

impl From<EncodedTicket> for Ticket {
    fn from(ticket: EncodedTicket) -> Self {
        Self::Encoded(ticket)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ticketry_auth::{AuthenticationBuilder, Principal};

    fn tgt(id: &str, policy: ExpirationPolicy, created: DateTime<Utc>) -> TicketGrantingTicket {
        let authentication = AuthenticationBuilder::new(Principal::new("casuser"))
            .with_authentication_date(created)
            .build()
            .unwrap();
        TicketGrantingTicket::new(id, authentication, created, policy)
    }

    #[test]
    fn test_kind_matching() {
        assert!(TicketKind::ProxyGranting.matches(TicketKind::TicketGranting));
        assert!(TicketKind::ProxyGranting.matches(TicketKind::ProxyGranting));
        assert!(!TicketKind::TicketGranting.matches(TicketKind::ProxyGranting));
        assert!(!TicketKind::Service.matches(TicketKind::TicketGranting));
        assert!(!TicketKind::Encoded.matches(TicketKind::Service));
    }

    #[test]
    fn test_kind_prefixes() {
        assert_eq!(TicketKind::TicketGranting.prefix(), "TGT");
        assert_eq!(TicketKind::Service.prefix(), "ST");
        assert_eq!(TicketKind::ProxyGranting.prefix(), "PGT");
        assert_eq!(TicketKind::Encoded.prefix(), "ENC");
    }

    #[test]
    fn test_hard_timeout() {
        let created = Utc::now();
        let policy = ExpirationPolicy::hard_timeout(Duration::seconds(10));

        assert!(!policy.is_expired(created, created + Duration::seconds(9)));
        assert!(policy.is_expired(created, created + Duration::seconds(10)));
        assert!(!ExpirationPolicy::NeverExpires.is_expired(created, created + Duration::days(365)));
        assert!(ExpirationPolicy::AlwaysExpires.is_expired(created, created));
    }

    #[test]
    fn test_proxy_granting_ticket_bookkeeping() {
        let mut ticket = tgt("TGT-1", ExpirationPolicy::NeverExpires, Utc::now());
        ticket.add_proxy_granting_ticket("PGT-1", Service::new("https://proxy.example.org"));

        assert!(ticket.remove_proxy_granting_ticket("PGT-1"));
        assert!(!ticket.remove_proxy_granting_ticket("PGT-1"));
    }

    #[test]
    fn test_ticket_accessors() {
        let created = Utc::now();
        let body = tgt("PGT-1", ExpirationPolicy::AlwaysExpires, created);
        let ticket = Ticket::from(ProxyGrantingTicket {
            ticket_granting_ticket: body,
            parent_ticket_granting_ticket_id: "TGT-1".to_string(),
            proxied_by: Service::new("https://proxy.example.org"),
        });

        assert_eq!(ticket.id(), "PGT-1");
        assert_eq!(ticket.kind(), TicketKind::ProxyGranting);
        assert_eq!(ticket.creation_time(), Some(created));
        assert!(ticket.is_expired(created));
        assert!(ticket.as_ticket_granting_ticket().is_some());
        assert!(ticket.clone().into_service_ticket().is_none());
        assert!(ticket.into_proxy_granting_ticket().is_some());
    }

    #[test]
    fn test_encoded_ticket_debug_hides_payload() {
        let encoded = EncodedTicket {
            id: "abc".to_string(),
            encoded_ticket: vec![1, 2, 3],
        };
        let rendered = format!("{encoded:?}");
        assert!(rendered.contains("encoded_len: 3"));
        assert!(!Ticket::from(encoded).is_expired(Utc::now()));
    }
}
