//! Schema definition configuration.

use serde::{Deserialize, Serialize};

/// Configuration of a schema definition being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Schema name (e.g. "IFC2X3").
    pub name: String,

    /// Whether type codes are dense `0..n`, enabling lookup by code.
    #[serde(default)]
    pub built_in: bool,
}

impl SchemaConfig {
    /// Create a configuration for a general schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            built_in: false,
        }
    }

    /// Create a configuration for a built-in schema.
    pub fn built_in(name: impl Into<String>) -> Self {
        Self::new(name).with_built_in(true)
    }

    /// Set the built-in flag.
    pub fn with_built_in(mut self, built_in: bool) -> Self {
        self.built_in = built_in;
        self
    }
}
