//! Principal election.
//!
//! When several authentications happen in one login transaction (primary
//! login, then step-up), exactly one principal represents the outcome.
//! Strategies are passed in at build time; any closure with the right shape
//! works as well.

use crate::attributes::Attributes;
use crate::authentication::Authentication;
use crate::error::{AuthenticationError, Result};
use crate::principal::Principal;

/// Picks the principal that represents a chain of authentications.
pub trait PrincipalElectionStrategy: Send + Sync {
    /// Nominate the representative principal.
    ///
    /// `authentications` are in collection order. `principal_attributes` is
    /// the merged attribute map of every collected principal and should be
    /// applied to the nominee.
    ///
    /// # Errors
    ///
    /// Returns an error if no principal can be nominated.
    fn nominate(
        &self,
        authentications: &[Authentication],
        principal_attributes: &Attributes,
    ) -> Result<Principal>;
}

impl<F> PrincipalElectionStrategy for F
where
    F: Fn(&[Authentication], &Attributes) -> Result<Principal> + Send + Sync,
{
    fn nominate(
        &self,
        authentications: &[Authentication],
        principal_attributes: &Attributes,
    ) -> Result<Principal> {
        self(authentications, principal_attributes)
    }
}

/// Elects the first collected principal, carrying the merged attributes.
///
/// Principal ids are the same across one transaction, so taking the first is
/// sufficient.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPrincipalElectionStrategy;

impl PrincipalElectionStrategy for DefaultPrincipalElectionStrategy {
    fn nominate(
        &self,
        authentications: &[Authentication],
        principal_attributes: &Attributes,
    ) -> Result<Principal> {
        let first = authentications.first().ok_or(AuthenticationError::NoPrincipal)?;
        let principal = Principal::new(first.principal.id.clone())
            .with_attributes(principal_attributes.clone());

        tracing::debug!(
            principal_id = %principal.id,
            candidates = authentications.len(),
            "Nominated primary principal"
        );

        Ok(principal)
    }
}
