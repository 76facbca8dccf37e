//! Target services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An application that requested authentication.
///
/// Service tickets are issued for a service, proxy-granting tickets record
/// the proxying service, and an authentication result may carry the service
/// the login was started for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Service {
    /// Service identifier, usually the callback URL.
    pub id: String,
}

impl Service {
    /// Create a service from its identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Service identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for Service {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
