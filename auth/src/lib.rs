//! # Ticketry Authentication
//!
//! Authentication model and result building for single sign-on.
//!
//! ## Features
//!
//! - **Multi-factor aware**: collect a primary login and any number of
//!   step-up authentications into one transaction
//! - **Multivalued attribute merging**: attributes are unioned, never overwritten
//! - **Pluggable election**: pick the representative principal with a strategy
//!   object or a closure
//! - **Thread-safe collection**: authentications can be collected from
//!   several tasks of the same request
//!
//! ## Architecture
//!
//! ```text
//! Authentication handlers ──► AuthenticationResultBuilder ──► AuthenticationResult
//!                                   │                               │
//!                                   ▼                               ▼
//!                      PrincipalElectionStrategy            ticket registry
//! ```
//!
//! ## Example: primary login plus MFA
//!
//! ```
//! use ticketry_auth::*;
//!
//! # fn main() -> ticketry_auth::Result<()> {
//! let builder = AuthenticationResultBuilder::new();
//!
//! let primary = AuthenticationBuilder::new(
//!     Principal::new("casuser").with_attribute("mail", "casuser@example.org"),
//! )
//! .add_attribute("authenticationMethod", "ldap")
//! .build()?;
//! let mfa = AuthenticationBuilder::new(Principal::new("casuser"))
//!     .add_attribute("authenticationMethod", "otp")
//!     .build()?;
//!
//! builder.collect(primary).collect(mfa);
//! builder.collect_credential(Credential::UsernamePassword {
//!     username: "casuser".into(),
//!     password: "Mellon".into(),
//! });
//!
//! let result = builder
//!     .build(&DefaultPrincipalElectionStrategy)?
//!     .expect("two authentications were collected");
//! assert_eq!(result.authentication.principal.id, "casuser");
//! assert_eq!(
//!     result.authentication.attributes["authenticationMethod"].values(),
//!     ["ldap", "otp"]
//! );
//! assert!(result.credential_provided);
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
pub mod attributes;
pub mod authentication;
pub mod credential;
pub mod election;
pub mod error;
pub mod principal;
pub mod result;

// Re-export main types for convenience
pub use attributes::{AttributeValue, Attributes};
pub use authentication::{Authentication, AuthenticationBuilder, HandlerResult};
pub use credential::{Credential, CredentialMetaData};
pub use election::{DefaultPrincipalElectionStrategy, PrincipalElectionStrategy};
pub use error::{AuthenticationError, Result};
pub use principal::Principal;
pub use result::{AuthenticationResult, AuthenticationResultBuilder};
