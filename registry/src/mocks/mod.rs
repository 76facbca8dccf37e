//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of the store trait
//! for use in unit and integration tests.

pub mod ticket_store;

pub use ticket_store::{InMemoryTicketStore, ScanlessTicketStore};
