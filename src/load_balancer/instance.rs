//! Worker instance identity.
//!
//! # Responsibilities
//! - Represent a single backend worker by its base URL
//! - Build request URLs for the worker API and health endpoints
//!
//! # Design Decisions
//! - An instance carries no state of its own; health lives in the tracker
//! - Equality and hashing are by identifier value
//! - Cheap to clone (`Arc<str>`), since every routing attempt hands one out

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A single backend worker, identified by its base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Instance(Arc<str>);

impl Instance {
    /// Create an instance from a base URL.
    ///
    /// Trailing slashes are stripped so that `{instance}{path}` never yields `//`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self(Arc::from(base_url.as_ref().trim_end_matches('/')))
    }

    /// The base URL identifying this instance.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join a path (e.g. `/process`) onto the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.0, path)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Instance {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Instance {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Instance {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Instance> for String {
    fn from(value: Instance) -> Self {
        value.0.to_string()
    }
}
