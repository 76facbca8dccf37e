//! Credentials presented during a login transaction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credential type identifiers recorded in [`CredentialMetaData`].
pub mod credential_types {
    /// Username and password.
    pub const USERNAME_PASSWORD: &str = "username_password";

    /// One-time password (TOTP, HOTP, SMS code).
    pub const ONE_TIME_PASSWORD: &str = "one_time_password";

    /// Opaque bearer token (e.g., a delegated or remembered login).
    pub const TOKEN: &str = "token";
}

/// A credential as presented by the user.
///
/// Secrets are kept here only for the lifetime of the login transaction.
/// Authentications record [`CredentialMetaData`] instead.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credential {
    /// Username/password pair.
    UsernamePassword {
        /// Username.
        username: String,
        /// Password (never logged).
        password: String,
    },

    /// One-time password bound to an account identifier.
    OneTimePassword {
        /// Account the token was issued for.
        id: String,
        /// Token value (never logged).
        token: String,
    },

    /// Opaque token credential.
    Token {
        /// Token identifier.
        id: String,
        /// Token value (never logged).
        token: String,
    },
}

impl Credential {
    /// Identifier of the credential (username or account id).
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::UsernamePassword { username, .. } => username,
            Self::OneTimePassword { id, .. } | Self::Token { id, .. } => id,
        }
    }

    /// Type identifier, see [`credential_types`].
    #[must_use]
    pub const fn credential_type(&self) -> &'static str {
        match self {
            Self::UsernamePassword { .. } => credential_types::USERNAME_PASSWORD,
            Self::OneTimePassword { .. } => credential_types::ONE_TIME_PASSWORD,
            Self::Token { .. } => credential_types::TOKEN,
        }
    }

    /// Secret-free description of this credential.
    #[must_use]
    pub fn metadata(&self) -> CredentialMetaData {
        CredentialMetaData::new(self.id(), self.credential_type())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("type", &self.credential_type())
            .field("id", &self.id())
            .finish_non_exhaustive()
    }
}

/// What an authentication remembers about a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialMetaData {
    /// Credential identifier.
    pub id: String,

    /// Credential type identifier.
    pub credential_type: String,
}

impl CredentialMetaData {
    /// Create credential metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, credential_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            credential_type: credential_type.into(),
        }
    }
}

impl From<&Credential> for CredentialMetaData {
    fn from(credential: &Credential) -> Self {
        credential.metadata()
    }
}
