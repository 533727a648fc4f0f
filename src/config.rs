//! Persistent engine configuration model and defaults.

use crate::shuffle::ShuffleRestore;

/// Root configuration for one engine instance, persisted as TOML by the
/// host application.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EngineConfig {
    /// Capacity of the broadcast bus connecting engine components.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
    #[serde(default)]
    /// Shuffle behavior preferences.
    pub shuffle: ShuffleConfig,
}

/// Shuffle behavior preferences.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ShuffleConfig {
    /// Order recovery strategy when shuffle switches off.
    #[serde(default)]
    pub restore: ShuffleRestore,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bus_capacity: default_bus_capacity(),
            shuffle: ShuffleConfig::default(),
        }
    }
}

fn default_bus_capacity() -> usize {
    1024
}

impl EngineConfig {
    /// Parse a TOML document, falling back to defaults for missing fields.
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str::<Self>(content)
            .map(sanitize_config)
            .map_err(|err| format!("invalid engine config: {}", err))
    }
}

/// Clamp unusable values back to defaults.
pub fn sanitize_config(mut config: EngineConfig) -> EngineConfig {
    if config.bus_capacity == 0 {
        config.bus_capacity = default_bus_capacity();
    }
    config
}
