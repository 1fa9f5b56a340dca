//! Echo plugin state and lifecycle.

use tracing::{debug, info};

use captable_plugin_sdk::prelude::*;

use crate::commands::{Count, Echo, Fail};

/// Echo plugin state. Lives in the host as the plugin's user data.
#[derive(Debug, Default)]
pub struct EchoPlugin {
    /// Every text echoed so far.
    pub history: Vec<String>,
    /// Host events seen.
    pub events: u64,
}

impl Plugin for EchoPlugin {
    const NAME: &'static str = "echo";

    fn init(api: &PluginApi<'_>) -> Self {
        api.register_command::<Self, Echo>();
        api.register_command::<Self, Count>();
        api.register_command::<Self, Fail>();
        api.set_event_handler::<Self>();

        debug!(header = ?api.table().header, "Echo plugin initialized");
        Self::default()
    }

    fn on_event(&mut self, api: &PluginApi<'_>) {
        self.events += 1;
        api.info(&format!("echo: event #{}", self.events));
    }

    fn deinit(self) {
        info!(
            messages = self.history.len(),
            events = self.events,
            "Echo plugin unloaded"
        );
    }
}
