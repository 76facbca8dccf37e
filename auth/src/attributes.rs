//! Principal and authentication attributes.
//!
//! Attributes are kept in a `BTreeMap` so that merged output is
//! deterministic and the values stay bincode-friendly when a ticket carrying
//! them is encrypted at rest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map keyed by attribute name.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A single- or multi-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Exactly one value.
    Single(String),

    /// Any number of values, in insertion order.
    Multi(Vec<String>),
}

impl AttributeValue {
    /// Borrow the values as a slice, whatever the arity.
    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// Promote into a list of values.
    #[must_use]
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::Multi(values) => values,
        }
    }

    /// First value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

/// Merge two attribute maps as a multivalued union.
///
/// Every value on either side is promoted to a list. For keys present on both
/// sides the result holds the current values followed by the values to merge
/// that were not already present. Neither input is modified.
///
/// Only incoming values are checked for duplicates: repeated values already
/// held by `current` are kept as they are, while a value repeated within
/// `to_merge` is added once.
///
/// # Examples
///
/// ```
/// use ticketry_auth::attributes::{AttributeValue, Attributes, merge_multivalued};
///
/// let mut first = Attributes::new();
/// first.insert("mail".into(), "a@example.org".into());
/// let mut second = Attributes::new();
/// second.insert("mail".into(), "b@example.org".into());
///
/// let merged = merge_multivalued(&first, &second);
/// assert_eq!(
///     merged["mail"],
///     AttributeValue::Multi(vec!["a@example.org".into(), "b@example.org".into()])
/// );
/// ```
#[must_use]
pub fn merge_multivalued(current: &Attributes, to_merge: &Attributes) -> Attributes {
    let mut merged: BTreeMap<String, Vec<String>> = current
        .iter()
        .map(|(name, value)| (name.clone(), value.clone().into_values()))
        .collect();

    for (name, value) in to_merge {
        let values = merged.entry(name.clone()).or_default();
        for candidate in value.values() {
            if !values.contains(candidate) {
                values.push(candidate.clone());
            }
        }
    }

    merged
        .into_iter()
        .map(|(name, values)| (name, AttributeValue::Multi(values)))
        .collect()
}
