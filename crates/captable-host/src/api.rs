//! The host's capability table and the functions behind it.
//!
//! None of these functions can report failure to the plugin. Invalid input
//! is logged and ignored; registration outside the entry point is also
//! reported on the status bar. Nothing here may panic, since a panic would
//! have to unwind through plugin frames.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use tracing::{debug, warn};

use captable_abi::{
    ByteSlice, Capabilities, CapabilityTable, CommandFn, DeinitFn, EventHandlerFn, HostHandle,
    StatusLevel,
};

use crate::commands::CommandBinding;
use crate::scope::HostScope;
use crate::status::StatusMessage;

static HOST_TABLE: CapabilityTable = CapabilityTable::new(
    register_command,
    write_to_statusbar,
    set_deinit_fn,
    set_event_handler_fn,
);

/// The table handed to every plugin.
pub fn host_table() -> &'static CapabilityTable {
    &HOST_TABLE
}

static RESTRICTED_TABLES: LazyLock<Mutex<HashMap<Capabilities, &'static CapabilityTable>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A table advertising only `capabilities`, for exercising plugins against
/// hosts that offer less.
///
/// One table is allocated per distinct capability set and lives for the rest
/// of the process. Repeated calls with the same set return the same table.
pub fn restricted_table(capabilities: Capabilities) -> &'static CapabilityTable {
    let mut tables = RESTRICTED_TABLES.lock().unwrap_or_else(|e| e.into_inner());
    *tables
        .entry(capabilities)
        .or_insert_with(|| Box::leak(Box::new(HOST_TABLE.with_capabilities(capabilities))))
}

unsafe extern "C" fn register_command(host: HostHandle, name: ByteSlice, command_fn: CommandFn) {
    let Some(scope) = (unsafe { helper::scope(host, "register_command") }) else {
        return;
    };
    if !helper::check_registration(scope, "register_command") {
        return;
    }

    let name = match unsafe { name.as_str() } {
        Ok(name) => name,
        Err(e) => {
            warn!(plugin = %scope.plugin_name(), error = %e, "Ignoring command with invalid name");
            return;
        }
    };

    let plugin = scope.plugin;
    let registered = scope.state.commands.count_for(plugin);
    if registered >= scope.state.max_commands_per_plugin {
        warn!(
            plugin = %scope.plugin_name(),
            command = %name,
            limit = scope.state.max_commands_per_plugin,
            "Ignoring command, plugin reached its command limit"
        );
        return;
    }

    match scope
        .state
        .commands
        .register(name, CommandBinding { plugin, command_fn })
    {
        Ok(()) => debug!(plugin = %scope.plugin_name(), command = %name, "Command registered"),
        Err(e) => warn!(
            plugin = %scope.plugin_name(),
            command = %name,
            error = %e,
            "Ignoring command registration"
        ),
    }
}

unsafe extern "C" fn write_to_statusbar(host: HostHandle, level: u32, message: ByteSlice) {
    let Some(scope) = (unsafe { helper::scope(host, "write_to_statusbar") }) else {
        return;
    };

    let Some(level) = StatusLevel::from_raw(level) else {
        warn!(plugin = %scope.plugin_name(), level, "Ignoring status message with unknown level");
        return;
    };

    let text = match unsafe { message.as_str() } {
        Ok(text) => text,
        Err(e) => {
            warn!(plugin = %scope.plugin_name(), error = %e, "Ignoring invalid status message");
            return;
        }
    };

    let message = StatusMessage::new(level, Some(scope.plugin_name()), text);
    scope.state.status.write(message);
}

unsafe extern "C" fn set_deinit_fn(host: HostHandle, deinit_fn: DeinitFn) {
    let Some(scope) = (unsafe { helper::scope(host, "set_deinit_fn") }) else {
        return;
    };
    if !helper::check_registration(scope, "set_deinit_fn") {
        return;
    }
    let plugin = scope.plugin;
    if let Some(entry) = scope.state.plugins.get_mut(plugin) {
        if entry.deinit_fn.replace(deinit_fn).is_some() {
            debug!(plugin = %entry.name, "Deinit function replaced");
        }
    }
}

unsafe extern "C" fn set_event_handler_fn(host: HostHandle, handler: EventHandlerFn) {
    let Some(scope) = (unsafe { helper::scope(host, "set_event_handler_fn") }) else {
        return;
    };
    if !helper::check_registration(scope, "set_event_handler_fn") {
        return;
    }
    let plugin = scope.plugin;
    if let Some(entry) = scope.state.plugins.get_mut(plugin) {
        if entry.event_handler_fn.replace(handler).is_some() {
            debug!(plugin = %entry.name, "Event handler replaced");
        }
    }
}

mod helper {
    use super::*;

    /// Resolves `host`, logging calls made with an unusable handle.
    pub unsafe fn scope<'h>(host: HostHandle, op: &str) -> Option<&'h mut HostScope<'h>> {
        let scope = unsafe { HostScope::resolve(host) };
        if scope.is_none() {
            warn!(op = %op, handle = ?host, "Table call with invalid host handle");
        }
        scope
    }

    /// Registration is only accepted while the entry point runs.
    pub fn check_registration(scope: &mut HostScope<'_>, op: &str) -> bool {
        if scope.phase.allows_registration() {
            return true;
        }
        let plugin = scope.plugin_name().to_string();
        warn!(plugin = %plugin, op = %op, phase = %scope.phase, "Registration outside of init rejected");
        scope.state.status.write(StatusMessage::new(
            StatusLevel::Error,
            None,
            format!("plugin '{plugin}' called {op} after initialization"),
        ));
        false
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use captable_abi::{ABI_VERSION, Capability};

    use super::*;

    #[test]
    fn test_host_table_is_complete() {
        let table = host_table();
        assert_eq!(table.header.version, ABI_VERSION);
        assert_eq!(table.header.size as usize, size_of::<CapabilityTable>());
        assert!(Capability::ALL.iter().all(|c| table.supports(*c)));
    }

    #[test]
    fn test_restricted_tables_are_shared_per_capability_set() {
        let commands = Capabilities::NONE.with(Capability::Commands);
        let first = restricted_table(commands);
        assert!(std::ptr::eq(first, restricted_table(commands)));
        assert!(first.supports(Capability::Commands));
        assert!(!first.supports(Capability::Statusbar));

        let other = restricted_table(commands.with(Capability::Statusbar));
        assert!(!std::ptr::eq(first, other));
        assert!(other.supports(Capability::Statusbar));
    }

    #[test]
    fn test_calls_with_null_handle_are_ignored() {
        let table = host_table();
        unsafe {
            (table.write_to_statusbar)(HostHandle::null(), 0, ByteSlice::from_text("lost"));
        }
    }
}
