//! Registry providers.
//!
//! This module defines traits for every external capability the registry
//! depends on. The registry is generic over them, so the same cascading
//! delete and encryption policy run unchanged over any backend.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ TicketRegistry   │────►│ TicketStore      │  put / get / delete / scan
//! │ - cascade        │     └──────────────────┘
//! │ - encode/decode  │     ┌──────────────────┐
//! │ - counters       │────►│ CipherExecutor   │  encrypt / decrypt
//! └──────────────────┘     └──────────────────┘
//!          ▲
//!          │ add_ticket
//! ┌──────────────────┐
//! │ TicketFactory    │  creates TGT / ST / PGT with fresh ids
//! └──────────────────┘
//! ```
//!
//! This enables:
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Plug in a database or distributed cache store

pub mod cipher;
pub mod ticket_factory;
pub mod ticket_store;

// Re-export provider traits
pub use cipher::{CipherExecutor, NoOpCipherExecutor};
pub use ticket_factory::TicketFactory;
pub use ticket_store::TicketStore;
