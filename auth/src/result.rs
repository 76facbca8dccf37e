//! Authentication result building.
//!
//! A login transaction may collect several authentications (a primary login
//! followed by one or more multi-factor steps). The
//! [`AuthenticationResultBuilder`] accumulates them and produces a single
//! composite [`AuthenticationResult`].
//!
//! ```text
//! collect(primary) ─┐
//! collect(mfa)     ─┼─► merge attributes ─► elect principal ─► AuthenticationResult
//! collect(cred)    ─┘
//! ```

use crate::attributes::{Attributes, merge_multivalued};
use crate::authentication::{Authentication, AuthenticationBuilder};
use crate::credential::Credential;
use crate::election::PrincipalElectionStrategy;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use ticketry_core::Service;
use ticketry_core::environment::{Clock, SystemClock};

/// The composite outcome of one login transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationResult {
    /// Composite authentication with the elected principal.
    pub authentication: Authentication,

    /// Service the login was initiated for, if any.
    pub service: Option<Service>,

    /// Whether the user presented at least one credential in this transaction.
    pub credential_provided: bool,
}

/// Accumulates authentications for one login transaction.
///
/// Both collections are append-only and guarded, so authentications can be
/// collected from more than one task (e.g., an asynchronous MFA callback).
/// The builder is consumed logically by [`build`](Self::build) and then
/// discarded by the caller.
pub struct AuthenticationResultBuilder {
    authentications: Mutex<Vec<Authentication>>,
    credentials: Mutex<Vec<Credential>>,
    clock: Arc<dyn Clock>,
}

impl AuthenticationResultBuilder {
    /// Create an empty builder stamping results with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty builder stamping results with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            authentications: Mutex::new(Vec::new()),
            credentials: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Collect an authentication.
    ///
    /// `None` is ignored, as is an authentication equal to one already
    /// collected. Insertion order is preserved.
    pub fn collect(&self, authentication: impl Into<Option<Authentication>>) -> &Self {
        if let Some(authentication) = authentication.into() {
            let mut authentications = lock(&self.authentications);
            if authentications.contains(&authentication) {
                tracing::trace!(
                    principal_id = %authentication.principal.id,
                    "Authentication already collected"
                );
            } else {
                authentications.push(authentication);
            }
        }
        self
    }

    /// Collect a presented credential. `None` is ignored.
    pub fn collect_credential(&self, credential: impl Into<Option<Credential>>) -> &Self {
        if let Some(credential) = credential.into() {
            lock(&self.credentials).push(credential);
        }
        self
    }

    /// The first collected authentication.
    ///
    /// An empty chain may be a legitimate pre-authentication probe, so it is
    /// only logged.
    #[must_use]
    pub fn initial_authentication(&self) -> Option<Authentication> {
        let authentications = lock(&self.authentications);
        if authentications.is_empty() {
            tracing::warn!("Authentication chain is empty as no authentications have been collected");
        }
        authentications.first().cloned()
    }

    /// Snapshot of the collected authentications, in collection order.
    #[must_use]
    pub fn authentications(&self) -> Vec<Authentication> {
        lock(&self.authentications).clone()
    }

    /// Snapshot of the collected credentials, in collection order.
    #[must_use]
    pub fn credentials(&self) -> Vec<Credential> {
        lock(&self.credentials).clone()
    }

    /// Returns `true` if no authentication was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.authentications).is_empty()
    }

    /// Build the composite result without a target service.
    ///
    /// # Errors
    ///
    /// Returns an error if the election strategy fails.
    pub fn build<S>(&self, strategy: &S) -> Result<Option<AuthenticationResult>>
    where
        S: PrincipalElectionStrategy + ?Sized,
    {
        self.build_result(strategy, None)
    }

    /// Build the composite result for `service`.
    ///
    /// # Errors
    ///
    /// Returns an error if the election strategy fails.
    pub fn build_for_service<S>(
        &self,
        strategy: &S,
        service: Service,
    ) -> Result<Option<AuthenticationResult>>
    where
        S: PrincipalElectionStrategy + ?Sized,
    {
        self.build_result(strategy, Some(service))
    }

    fn build_result<S>(
        &self,
        strategy: &S,
        service: Option<Service>,
    ) -> Result<Option<AuthenticationResult>>
    where
        S: PrincipalElectionStrategy + ?Sized,
    {
        let Some(authentication) = self.build_authentication(strategy)? else {
            tracing::info!(
                "Authentication result cannot be produced because no authentication is recorded in the chain"
            );
            return Ok(None);
        };

        let credential_provided = !lock(&self.credentials).is_empty();

        tracing::debug!(
            principal_id = %authentication.principal.id,
            service = ?service.as_ref().map(Service::id),
            credential_provided,
            "Built authentication result"
        );

        Ok(Some(AuthenticationResult {
            authentication,
            service,
            credential_provided,
        }))
    }

    fn build_authentication<S>(&self, strategy: &S) -> Result<Option<Authentication>>
    where
        S: PrincipalElectionStrategy + ?Sized,
    {
        let authentications = self.authentications();
        if authentications.is_empty() {
            tracing::warn!("No authentication event has been recorded; cannot finalize the authentication result");
            return Ok(None);
        }

        tracing::debug!(
            events = authentications.len(),
            "Collecting authentication history"
        );

        let mut principal_attributes = Attributes::new();
        let mut authentication_attributes = Attributes::new();
        let mut history = AuthenticationBuilder::default();

        for authentication in &authentications {
            principal_attributes =
                merge_multivalued(&principal_attributes, &authentication.principal.attributes);
            authentication_attributes =
                merge_multivalued(&authentication_attributes, &authentication.attributes);

            history = history
                .add_successes(authentication.successes.clone())
                .add_failures(authentication.failures.clone())
                .add_credentials(authentication.credentials.iter().cloned());
        }

        let principal = strategy.nominate(&authentications, &principal_attributes)?;
        tracing::debug!(principal_id = %principal.id, "Determined primary authentication principal");

        let authentication = history
            .with_principal(principal)
            .with_attributes(authentication_attributes)
            .with_authentication_date(self.clock.now())
            .build()?;

        Ok(Some(authentication))
    }
}

impl Default for AuthenticationResultBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuthenticationResultBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationResultBuilder")
            .field("authentications", &lock(&self.authentications).len())
            .field("credentials", &lock(&self.credentials).len())
            .finish_non_exhaustive()
    }
}

// Both collections are append-only, so a poisoned lock still holds whole entries.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::election::DefaultPrincipalElectionStrategy;
    use crate::principal::Principal;
    use chrono::{TimeZone, Utc};

    struct StoppedClock;

    impl Clock for StoppedClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        }
    }

    fn authentication(id: &str, mail: &str) -> Authentication {
        AuthenticationBuilder::new(Principal::new(id).with_attribute("mail", mail))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_builder_yields_nothing() {
        let builder = AuthenticationResultBuilder::new();

        assert!(builder.initial_authentication().is_none());
        assert_eq!(builder.build(&DefaultPrincipalElectionStrategy), Ok(None));
    }

    #[test]
    fn test_none_inputs_are_ignored() {
        let builder = AuthenticationResultBuilder::new();
        builder
            .collect(None::<Authentication>)
            .collect_credential(None::<Credential>);

        assert!(builder.is_empty());
        assert!(builder.credentials().is_empty());
    }

    #[test]
    fn test_duplicate_authentication_collected_once() {
        let builder = AuthenticationResultBuilder::new();
        let first = authentication("casuser", "a@x.com");

        builder.collect(first.clone()).collect(first.clone());

        assert_eq!(builder.authentications(), vec![first]);
    }

    #[test]
    fn test_authentication_date_comes_from_clock() {
        let builder = AuthenticationResultBuilder::with_clock(Arc::new(StoppedClock));
        builder.collect(authentication("casuser", "a@x.com"));

        let result = builder.build(&DefaultPrincipalElectionStrategy).unwrap().unwrap();

        assert_eq!(result.authentication.authentication_date, StoppedClock.now());
        assert!(!result.credential_provided);
        assert!(result.service.is_none());
    }

    #[test]
    fn test_principal_attributes_are_merged_in_collection_order() {
        let builder = AuthenticationResultBuilder::new();
        builder
            .collect(authentication("casuser", "a@x.com"))
            .collect(authentication("casuser", "b@x.com"));

        let result = builder.build(&DefaultPrincipalElectionStrategy).unwrap().unwrap();

        assert_eq!(
            result.authentication.principal.attributes["mail"],
            AttributeValue::Multi(vec!["a@x.com".to_string(), "b@x.com".to_string()])
        );
    }
}
