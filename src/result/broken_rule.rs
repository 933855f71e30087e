//! Broken rule type with structural equality semantics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single structured validation failure.
///
/// Two broken rules are equal when their message and relation match
/// structurally, which is what the aggregation decorators rely on to
/// deduplicate rules reported by independent validators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokenRule {
    /// The human-readable rule violation message. Never blank.
    message: String,

    /// The field or relation the rule applies to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<String>,
}

impl BrokenRule {
    /// Creates a new broken rule.
    ///
    /// # Panics
    ///
    /// Panics if `message` is blank; a rule without a message is a
    /// programming error in the reporting validator.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        assert!(
            !message.trim().is_empty(),
            "broken rule message must not be blank"
        );
        Self {
            message,
            relation: None,
        }
    }

    /// Sets the relation the rule applies to.
    #[must_use]
    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = Some(relation.into());
        self
    }

    /// Returns the rule message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the relation, if any.
    #[must_use]
    pub fn relation(&self) -> Option<&str> {
        self.relation.as_deref()
    }
}

impl fmt::Display for BrokenRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(relation) => write!(f, "{} ({relation})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
