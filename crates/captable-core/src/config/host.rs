//! Host behavior configuration.

use serde::{Deserialize, Serialize};

/// Settings for the plugin host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Number of status bar messages retained by the in-memory status bar.
    #[serde(default = "default_status_history")]
    pub status_history: usize,
    /// Whether a failed command's message is also written to the status bar.
    #[serde(default = "default_true")]
    pub surface_command_errors: bool,
    /// Capacity of the request queue in front of the host runtime.
    #[serde(default = "default_request_queue")]
    pub request_queue: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            status_history: default_status_history(),
            surface_command_errors: true,
            request_queue: default_request_queue(),
        }
    }
}

fn default_status_history() -> usize {
    64
}

fn default_request_queue() -> usize {
    32
}

fn default_true() -> bool {
    true
}
