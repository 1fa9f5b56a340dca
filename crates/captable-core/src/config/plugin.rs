//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Names of the built-in plugins to load. `"*"` loads all of them.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
    /// Upper bound on the number of commands a single plugin may register.
    #[serde(default = "default_max_commands")]
    pub max_commands_per_plugin: usize,
}

impl PluginConfig {
    /// Returns whether the plugin with the given name should be loaded.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|n| n == "*" || n == name)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_commands_per_plugin: default_max_commands(),
        }
    }
}

fn default_enabled() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_commands() -> usize {
    256
}
