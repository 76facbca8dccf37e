//! Completed authentication events.

use crate::attributes::{AttributeValue, Attributes, merge_multivalued};
use crate::credential::CredentialMetaData;
use crate::error::{AuthenticationError, Result};
use crate::principal::Principal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one authentication handler that accepted a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResult {
    /// Name of the handler that produced this result.
    pub handler_name: String,

    /// Credential the handler authenticated.
    pub credential: CredentialMetaData,

    /// Principal resolved by the handler, if it resolved one.
    pub principal: Option<Principal>,

    /// Non-fatal warnings (e.g., password about to expire).
    pub warnings: Vec<String>,
}

impl HandlerResult {
    /// Create a handler result without principal or warnings.
    #[must_use]
    pub fn new(handler_name: impl Into<String>, credential: CredentialMetaData) -> Self {
        Self {
            handler_name: handler_name.into(),
            credential,
            principal: None,
            warnings: Vec::new(),
        }
    }

    /// Attach the resolved principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Add a warning.
    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// One completed authentication event.
///
/// Authentications compare by value; two identical events collected in the
/// same login transaction count once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    /// Authenticated principal.
    pub principal: Principal,

    /// Credentials presented, without secrets.
    pub credentials: Vec<CredentialMetaData>,

    /// Successful handler results keyed by handler name.
    pub successes: BTreeMap<String, HandlerResult>,

    /// Failure messages keyed by handler name.
    pub failures: BTreeMap<String, String>,

    /// Authentication-level attributes (method, MFA context, ...).
    pub attributes: Attributes,

    /// When the authentication completed.
    pub authentication_date: DateTime<Utc>,
}

impl Authentication {
    /// Start building an authentication for `principal`.
    #[must_use]
    pub fn builder(principal: Principal) -> AuthenticationBuilder {
        AuthenticationBuilder::new(principal)
    }

    /// Returns `true` if at least one handler succeeded.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        !self.successes.is_empty()
    }
}

/// Fluent builder for [`Authentication`].
///
/// # Examples
///
/// ```
/// use ticketry_auth::{Authentication, AuthenticationBuilder, CredentialMetaData, HandlerResult, Principal};
///
/// let credential = CredentialMetaData::new("casuser", "username_password");
/// let authentication = AuthenticationBuilder::new(Principal::new("casuser"))
///     .add_credential(credential.clone())
///     .add_success(HandlerResult::new("ldap", credential))
///     .add_attribute("authenticationMethod", "ldap")
///     .build()
///     .unwrap();
///
/// assert!(authentication.is_successful());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuthenticationBuilder {
    principal: Option<Principal>,
    credentials: Vec<CredentialMetaData>,
    successes: BTreeMap<String, HandlerResult>,
    failures: BTreeMap<String, String>,
    attributes: Attributes,
    authentication_date: Option<DateTime<Utc>>,
}

impl AuthenticationBuilder {
    /// Create a builder for `principal`.
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            ..Self::default()
        }
    }

    /// Create a builder pre-populated from an existing authentication.
    #[must_use]
    pub fn from_authentication(authentication: &Authentication) -> Self {
        Self {
            principal: Some(authentication.principal.clone()),
            credentials: authentication.credentials.clone(),
            successes: authentication.successes.clone(),
            failures: authentication.failures.clone(),
            attributes: authentication.attributes.clone(),
            authentication_date: Some(authentication.authentication_date),
        }
    }

    /// Set the principal.
    #[must_use]
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Record a presented credential.
    #[must_use]
    pub fn add_credential(mut self, credential: CredentialMetaData) -> Self {
        self.credentials.push(credential);
        self
    }

    /// Record several presented credentials.
    #[must_use]
    pub fn add_credentials(mut self, credentials: impl IntoIterator<Item = CredentialMetaData>) -> Self {
        self.credentials.extend(credentials);
        self
    }

    /// Record a handler success; a later result for the same handler wins.
    #[must_use]
    pub fn add_success(mut self, result: HandlerResult) -> Self {
        self.successes.insert(result.handler_name.clone(), result);
        self
    }

    /// Record several handler successes.
    #[must_use]
    pub fn add_successes(mut self, results: impl IntoIterator<Item = (String, HandlerResult)>) -> Self {
        self.successes.extend(results);
        self
    }

    /// Record a handler failure.
    #[must_use]
    pub fn add_failure(mut self, handler_name: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(handler_name.into(), message.into());
        self
    }

    /// Record several handler failures.
    #[must_use]
    pub fn add_failures(mut self, failures: impl IntoIterator<Item = (String, String)>) -> Self {
        self.failures.extend(failures);
        self
    }

    /// Set one authentication attribute, replacing any previous value.
    #[must_use]
    pub fn add_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Union `attributes` into the current attributes.
    #[must_use]
    pub fn merge_attributes(mut self, attributes: &Attributes) -> Self {
        self.attributes = merge_multivalued(&self.attributes, attributes);
        self
    }

    /// Replace the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the authentication date.
    #[must_use]
    pub const fn with_authentication_date(mut self, date: DateTime<Utc>) -> Self {
        self.authentication_date = Some(date);
        self
    }

    /// Returns `true` if an attribute named `name` has been set.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Successes recorded so far.
    #[must_use]
    pub const fn successes(&self) -> &BTreeMap<String, HandlerResult> {
        &self.successes
    }

    /// Failures recorded so far.
    #[must_use]
    pub const fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    /// Build the authentication.
    ///
    /// The authentication date defaults to now when none was set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::MissingPrincipal`] if no principal was set.
    pub fn build(self) -> Result<Authentication> {
        let principal = self.principal.ok_or(AuthenticationError::MissingPrincipal)?;

        Ok(Authentication {
            principal,
            credentials: self.credentials,
            successes: self.successes,
            failures: self.failures,
            attributes: self.attributes,
            authentication_date: self.authentication_date.unwrap_or_else(Utc::now),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_principal() {
        let result = AuthenticationBuilder::default().build();
        assert_eq!(result, Err(AuthenticationError::MissingPrincipal));
    }

    #[test]
    fn test_builder_tracks_handler_outcomes() {
        let credential = CredentialMetaData::new("casuser", "username_password");
        let builder = Authentication::builder(Principal::new("casuser"))
            .add_success(HandlerResult::new("ldap", credential))
            .add_failure("radius", "timed out");

        assert_eq!(builder.successes().len(), 1);
        assert!(builder.successes().contains_key("ldap"));
        assert_eq!(builder.failures()["radius"], "timed out");

        let authentication = builder.build().unwrap();
        assert!(authentication.is_successful());
        assert_eq!(authentication.principal.id, "casuser");
    }

    #[test]
    fn test_later_success_for_same_handler_wins() {
        let credential = CredentialMetaData::new("casuser", "username_password");
        let authentication = AuthenticationBuilder::new(Principal::new("casuser"))
            .add_success(HandlerResult::new("ldap", credential.clone()))
            .add_success(HandlerResult::new("ldap", credential).with_warning("password expires soon"))
            .build()
            .unwrap();

        assert_eq!(authentication.successes.len(), 1);
        assert_eq!(authentication.successes["ldap"].warnings, vec!["password expires soon"]);
    }

    #[test]
    fn test_from_authentication_round_trips() {
        let date = Utc::now();
        let original = AuthenticationBuilder::new(Principal::new("casuser"))
            .add_failure("radius", "timeout")
            .add_attribute("authenticationMethod", "ldap")
            .with_authentication_date(date)
            .build()
            .unwrap();

        let rebuilt = AuthenticationBuilder::from_authentication(&original).build().unwrap();

        assert_eq!(rebuilt, original);
        assert!(!rebuilt.is_successful());
    }

    #[test]
    fn test_merge_attributes_unions_values() {
        let mut extra = Attributes::new();
        extra.insert("authnContext".to_string(), "mfa-duo".into());

        let builder = AuthenticationBuilder::new(Principal::new("casuser"))
            .add_attribute("authnContext", "password")
            .merge_attributes(&extra);

        assert!(builder.has_attribute("authnContext"));
        let authentication = builder.build().unwrap();
        assert_eq!(authentication.attributes["authnContext"].values(), ["password", "mfa-duo"]);
    }

    #[test]
    fn test_authentication_survives_bincode() {
        let authentication = AuthenticationBuilder::new(
            Principal::new("casuser").with_attribute("memberOf", vec!["staff".to_string(), "admins".to_string()]),
        )
        .add_attribute("authenticationMethod", "ldap")
        .add_failure("RadiusAuthenticationHandler", "timeout")
        .build()
        .unwrap();

        let bytes = bincode::serialize(&authentication).unwrap();
        let decoded: Authentication = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, authentication);
    }
}
