//! # Ticketry Registry
//!
//! Storage-agnostic registry for single sign-on tickets.
//!
//! ## Features
//!
//! - **Ticket tree**: ticket-granting tickets own service tickets and
//!   proxy-granting tickets, linked by id
//! - **Cascading delete**: deleting a session removes everything issued from it
//! - **Encryption at rest**: tickets are serialized, encrypted with
//!   AES-256-GCM and stored under the SHA-512 of their id
//! - **Pluggable storage**: any [`TicketStore`] that can put, get and delete
//!   one key atomically
//!
//! ## Architecture
//!
//! ```text
//! TicketFactory ──► TicketRegistry ──► TicketCodec ──► TicketStore
//!                         │                 │
//!                         │                 └──► CipherExecutor
//!                         └──► cascade / counters
//! ```
//!
//! ## Example
//!
//! ```
//! use ticketry_auth::{AuthenticationBuilder, Principal};
//! use ticketry_core::Service;
//! use ticketry_registry::mocks::InMemoryTicketStore;
//! use ticketry_registry::providers::TicketFactory;
//! use ticketry_registry::{DefaultTicketFactory, TicketRegistry};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TicketRegistry::new(InMemoryTicketStore::new());
//! let factory = DefaultTicketFactory::new();
//!
//! let authentication = AuthenticationBuilder::new(Principal::new("casuser")).build()?;
//! let mut tgt = factory.create_ticket_granting_ticket(authentication);
//! let st = factory.grant_service_ticket(&mut tgt, Service::new("https://app.example.org"), true);
//!
//! registry.add_ticket(tgt.clone()).await?;
//! registry.add_ticket(st).await?;
//!
//! assert_eq!(registry.delete_ticket(&tgt.id).await?, 2);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod ciphers;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod factory;
pub mod providers;
pub mod registry;
pub mod ticket;

// Mock implementations for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use ciphers::AesGcmCipherExecutor;
pub use config::{CryptoConfig, TicketExpirationConfig, TicketRegistryConfig};
pub use constants::UNKNOWN_COUNT;
pub use encoding::TicketCodec;
pub use error::{RegistryError, Result};
pub use factory::DefaultTicketFactory;
pub use providers::{CipherExecutor, NoOpCipherExecutor, TicketFactory, TicketStore};
pub use registry::TicketRegistry;
pub use ticket::{
    EncodedTicket, ExpirationPolicy, ProxyGrantingTicket, ServiceTicket, Ticket, TicketGrantingTicket,
    TicketKind,
};
