use serde::{Deserialize, Serialize};

/// Priority the in-memory backend is attached with by default. Higher
/// priorities are consulted first, so this puts it ahead of typical on-disk
/// backends.
pub const DEFAULT_MEMORY_PRIORITY: i32 = 999;

/// Configuration for the in-memory backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryBackendConfig {
    /// Priority used when attaching to an [`Odb`](crate::Odb).
    pub priority: i32,
    /// Number of entries to preallocate in the object table.
    pub initial_capacity: usize,
}

impl Default for MemoryBackendConfig {
    fn default() -> Self {
        Self {
            priority: DEFAULT_MEMORY_PRIORITY,
            initial_capacity: 0,
        }
    }
}

/// Configuration for an object database.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdbConfig {
    pub memory: MemoryBackendConfig,
}

impl OdbConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
