//! # Ticketry Core
//!
//! Shared types for the Ticketry single-sign-on workspace.
//!
//! This crate is deliberately small. It holds the pieces that both the
//! authentication builder and the ticket registry need to agree on:
//!
//! - **Environment**: injected capabilities such as [`environment::Clock`]
//! - **Service**: the application a ticket or authentication result targets
//!
//! ## Example
//!
//! ```
//! use ticketry_core::environment::{Clock, SystemClock};
//! use ticketry_core::Service;
//!
//! let service = Service::new("https://app.example.org/login");
//! let issued_at = SystemClock.now();
//! assert_eq!(service.to_string(), "https://app.example.org/login");
//! # let _ = issued_at;
//! ```

pub mod service;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use service::Service;

/// Environment traits for dependency injection
///
/// All external capabilities are abstracted behind traits and injected
/// by the caller, so tests can substitute deterministic versions.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
