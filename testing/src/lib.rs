//! # Ticketry Testing
//!
//! Testing utilities and helpers for the Ticketry workspace.
//!
//! This crate provides:
//! - Mock implementations of environment traits
//! - Fixture builders for authentications, tickets and registries
//! - Tracing initialisation for tests
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```
//! use ticketry_testing::{fixtures, helpers};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! helpers::init_test_tracing();
//! let (registry, store) = fixtures::encrypted_registry();
//!
//! registry.add_ticket(fixtures::ticket_granting_ticket("TGT-1")).await.unwrap();
//! assert!(store.raw("TGT-1").is_none());
//! assert!(registry.get_ticket("TGT-1").await.unwrap().is_some());
//! # }
//! ```

use chrono::{DateTime, Utc};
use ticketry_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketry_testing::mocks::FixedClock;
    /// use ticketry_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use std::sync::Once;
    use tracing_subscriber::EnvFilter;

    static TRACING: Once = Once::new();

    /// Install a test-friendly `tracing` subscriber.
    ///
    /// Honours `RUST_LOG` (default `warn`) and writes through the test output
    /// capture. Safe to call from every test.
    pub fn init_test_tracing() {
        TRACING.call_once(|| {
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_test_writer()
                .try_init();
        });
    }
}

/// Fixture builders.
///
/// All fixtures use [`mocks::test_clock`] time and never-expiring policies
/// unless stated otherwise.
#[allow(clippy::expect_used)]
pub mod fixtures {
    use super::Clock;
    use super::mocks::test_clock;
    use std::sync::Arc;
    use ticketry_auth::{Authentication, AuthenticationBuilder, Principal};
    use ticketry_core::Service;
    use ticketry_registry::mocks::InMemoryTicketStore;
    use ticketry_registry::{
        AesGcmCipherExecutor, CipherExecutor, ExpirationPolicy, ProxyGrantingTicket, ServiceTicket,
        TicketGrantingTicket, TicketRegistry,
    };

    /// Key used by [`test_cipher`].
    pub const TEST_ENCRYPTION_KEY: [u8; 32] = [42; 32];

    /// Successful authentication of `principal_id` at test-clock time.
    ///
    /// # Panics
    ///
    /// Never; the builder always has a principal.
    #[must_use]
    pub fn authentication(principal_id: &str) -> Authentication {
        AuthenticationBuilder::new(Principal::new(principal_id))
            .with_authentication_date(test_clock().now())
            .build()
            .expect("fixture authentication has a principal")
    }

    /// Service fixture.
    #[must_use]
    pub fn service(name: &str) -> Service {
        Service::new(format!("https://{name}.example.org"))
    }

    /// Ticket-granting ticket with no children.
    #[must_use]
    pub fn ticket_granting_ticket(id: &str) -> TicketGrantingTicket {
        TicketGrantingTicket::new(
            id,
            authentication("casuser"),
            test_clock().now(),
            ExpirationPolicy::NeverExpires,
        )
    }

    /// Service ticket issued from `parent`, recorded on it.
    #[must_use]
    pub fn service_ticket(id: &str, parent: &mut TicketGrantingTicket) -> ServiceTicket {
        let service = service("app");
        parent.grant_service_ticket(id, service.clone());
        ServiceTicket {
            id: id.to_string(),
            creation_time: test_clock().now(),
            expiration_policy: ExpirationPolicy::NeverExpires,
            ticket_granting_ticket_id: parent.id.clone(),
            service,
            from_new_login: true,
        }
    }

    /// Proxy-granting ticket derived from `parent`, recorded on it.
    #[must_use]
    pub fn proxy_granting_ticket(id: &str, parent: &mut TicketGrantingTicket) -> ProxyGrantingTicket {
        let proxied_by = service("proxy");
        parent.add_proxy_granting_ticket(id, proxied_by.clone());
        ProxyGrantingTicket {
            ticket_granting_ticket: TicketGrantingTicket::new(
                id,
                parent.authentication.clone(),
                test_clock().now(),
                ExpirationPolicy::NeverExpires,
            ),
            parent_ticket_granting_ticket_id: parent.id.clone(),
            proxied_by,
        }
    }

    /// AES-256-GCM cipher keyed with [`TEST_ENCRYPTION_KEY`].
    ///
    /// # Panics
    ///
    /// Never; the key has the right length.
    #[must_use]
    pub fn test_cipher() -> Arc<dyn CipherExecutor> {
        Arc::new(AesGcmCipherExecutor::new(&TEST_ENCRYPTION_KEY).expect("test key is 32 bytes"))
    }

    /// Plaintext registry over a fresh in-memory store, plus a handle on the store.
    #[must_use]
    pub fn registry() -> (TicketRegistry<InMemoryTicketStore>, InMemoryTicketStore) {
        let store = InMemoryTicketStore::new();
        (TicketRegistry::new(store.clone()), store)
    }

    /// Encrypting registry over a fresh in-memory store, plus a handle on the store.
    #[must_use]
    pub fn encrypted_registry() -> (TicketRegistry<InMemoryTicketStore>, InMemoryTicketStore) {
        let store = InMemoryTicketStore::new();
        (TicketRegistry::with_cipher(store.clone(), test_cipher()), store)
    }
}

/// Property-based testing strategies using proptest.
pub mod properties {
    use super::Clock;
    use super::mocks::test_clock;
    use chrono::Duration;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;
    use ticketry_auth::{AttributeValue, Attributes, Authentication, CredentialMetaData, Principal};
    use ticketry_core::Service;
    use ticketry_registry::{ExpirationPolicy, ProxyGrantingTicket, ServiceTicket, Ticket, TicketGrantingTicket};

    /// Ticket or principal id.
    pub fn arb_id() -> impl Strategy<Value = String> {
        "[A-Z]{2,3}-[0-9]{1,4}-[A-Za-z0-9_-]{4,16}"
    }

    /// Service.
    pub fn arb_service() -> impl Strategy<Value = Service> {
        "[a-z]{1,8}".prop_map(|host| Service::new(format!("https://{host}.example.org")))
    }

    /// Single or multivalued attribute value.
    pub fn arb_attribute_value() -> impl Strategy<Value = AttributeValue> {
        prop_oneof![
            "[a-z0-9]{1,6}".prop_map(AttributeValue::Single),
            vec("[a-z0-9]{1,6}", 0..4).prop_map(AttributeValue::Multi),
        ]
    }

    /// Attribute map with a small key space, so merges overlap.
    pub fn arb_attributes() -> impl Strategy<Value = Attributes> {
        btree_map("[a-d]", arb_attribute_value(), 0..4)
    }

    /// Expiration policy.
    pub fn arb_expiration_policy() -> impl Strategy<Value = ExpirationPolicy> {
        prop_oneof![
            Just(ExpirationPolicy::NeverExpires),
            Just(ExpirationPolicy::AlwaysExpires),
            (1i64..100_000).prop_map(|secs| ExpirationPolicy::hard_timeout(Duration::seconds(secs))),
        ]
    }

    /// Authentication with arbitrary principal, attributes and credentials.
    pub fn arb_authentication() -> impl Strategy<Value = Authentication> {
        (
            "[a-z]{1,10}",
            arb_attributes(),
            arb_attributes(),
            vec(("[a-z]{1,6}", "[a-z_]{1,12}"), 0..3),
        )
            .prop_map(|(principal_id, principal_attributes, attributes, credentials)| Authentication {
                principal: Principal::new(principal_id).with_attributes(principal_attributes),
                credentials: credentials
                    .into_iter()
                    .map(|(id, kind)| CredentialMetaData::new(id, kind))
                    .collect(),
                successes: std::collections::BTreeMap::new(),
                failures: std::collections::BTreeMap::new(),
                attributes,
                authentication_date: test_clock().now(),
            })
    }

    /// Ticket-granting ticket with arbitrary children.
    pub fn arb_ticket_granting_ticket() -> impl Strategy<Value = TicketGrantingTicket> {
        (
            arb_id(),
            arb_authentication(),
            arb_expiration_policy(),
            btree_map(arb_id(), arb_service(), 0..4),
            btree_map(arb_id(), arb_service(), 0..3),
        )
            .prop_map(|(id, authentication, policy, services, proxy_granting_tickets)| {
                let mut tgt = TicketGrantingTicket::new(id, authentication, test_clock().now(), policy);
                tgt.services = services;
                tgt.proxy_granting_tickets = proxy_granting_tickets;
                tgt
            })
    }

    /// Any domain ticket (never an encoded one).
    pub fn arb_ticket() -> impl Strategy<Value = Ticket> {
        prop_oneof![
            arb_ticket_granting_ticket().prop_map(Ticket::from),
            (arb_id(), arb_id(), arb_service(), arb_expiration_policy(), any::<bool>()).prop_map(
                |(id, parent_id, service, policy, from_new_login)| {
                    Ticket::from(ServiceTicket {
                        id,
                        creation_time: test_clock().now(),
                        expiration_policy: policy,
                        ticket_granting_ticket_id: parent_id,
                        service,
                        from_new_login,
                    })
                }
            ),
            (arb_ticket_granting_ticket(), arb_id(), arb_service()).prop_map(|(body, parent_id, proxied_by)| {
                Ticket::from(ProxyGrantingTicket {
                    ticket_granting_ticket: body,
                    parent_ticket_granting_ticket_id: parent_id,
                    proxied_by,
                })
            }),
        ]
    }
}

// Re-export commonly used items
pub use helpers::init_test_tracing;
pub use mocks::{FixedClock, test_clock};
