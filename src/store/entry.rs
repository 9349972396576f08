//! Store entry definitions

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A key/value pair owned by exactly one Store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique within the owning Store
    pub key: String,

    /// Stored verbatim
    pub value: Value,
}

impl Entry {
    pub(crate) fn new(key: String, value: Value) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Split into key and value
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }
}
