//! Authenticated principals.

use crate::attributes::{AttributeValue, Attributes};
use serde::{Deserialize, Serialize};

/// The identity an authentication resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier (e.g., the username).
    pub id: String,

    /// Attributes released for this principal.
    pub attributes: Attributes,
}

impl Principal {
    /// Create a principal with no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }

    /// Replace the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add a single attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}
