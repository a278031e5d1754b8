//! Application identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identity of an application that owns handler registrations.
///
/// Two ids are equal when both the numeric id and the name match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId {
    id: u16,
    name: Arc<str>,
}

impl ApplicationId {
    pub fn new(id: u16, name: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.name)
    }
}
