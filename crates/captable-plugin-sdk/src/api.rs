//! Typed view of the capability table for one call from the host.

use std::fmt;

use captable_abi::{ByteSlice, Capability, CapabilityTable, HostHandle, StatusLevel};

use crate::plugin::{Command, Plugin};
use crate::trampoline;

/// The host's table together with the handle for the current call.
///
/// Only valid for the duration of the call it was created for. Every method
/// checks [`CapabilityTable::supports`] first and returns `false` without
/// calling the host when the member is missing.
#[derive(Clone, Copy)]
pub struct PluginApi<'a> {
    table: &'a CapabilityTable,
    host: HostHandle,
}

impl<'a> PluginApi<'a> {
    /// Wraps the arguments of a call from the host.
    pub fn new(table: &'a CapabilityTable, host: HostHandle) -> Self {
        Self { table, host }
    }

    /// The raw table.
    pub fn table(&self) -> &'a CapabilityTable {
        self.table
    }

    /// Returns whether the host implements `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.table.supports(capability)
    }

    /// Registers command `C` of plugin `P`. Only accepted during init.
    pub fn register_command<P: Plugin, C: Command<P>>(&self) -> bool {
        if !self.supports(Capability::Commands) {
            return false;
        }
        unsafe {
            (self.table.register_command)(
                self.host,
                ByteSlice::from_text(C::NAME),
                trampoline::command::<P, C>,
            );
        }
        true
    }

    /// Writes `message` to the host's status bar.
    pub fn write_to_statusbar(&self, level: StatusLevel, message: &str) -> bool {
        if !self.supports(Capability::Statusbar) {
            return false;
        }
        unsafe {
            (self.table.write_to_statusbar)(
                self.host,
                level.as_raw(),
                ByteSlice::from_bytes(message.as_bytes()),
            );
        }
        true
    }

    /// Writes an info message.
    pub fn info(&self, message: &str) -> bool {
        self.write_to_statusbar(StatusLevel::Info, message)
    }

    /// Writes a warning.
    pub fn warning(&self, message: &str) -> bool {
        self.write_to_statusbar(StatusLevel::Warning, message)
    }

    /// Writes an error.
    pub fn error(&self, message: &str) -> bool {
        self.write_to_statusbar(StatusLevel::Error, message)
    }

    /// Routes deinit to [`Plugin::deinit`] and frees the plugin state.
    ///
    /// The init trampoline already does this; calling it again is harmless.
    pub fn set_deinit<P: Plugin>(&self) -> bool {
        if !self.supports(Capability::Deinit) {
            return false;
        }
        unsafe { (self.table.set_deinit_fn)(self.host, trampoline::deinit::<P>) };
        true
    }

    /// Routes host events to [`Plugin::on_event`].
    pub fn set_event_handler<P: Plugin>(&self) -> bool {
        if !self.supports(Capability::Events) {
            return false;
        }
        unsafe { (self.table.set_event_handler_fn)(self.host, trampoline::event::<P>) };
        true
    }
}

impl fmt::Debug for PluginApi<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginApi")
            .field("header", &self.table.header)
            .field("host", &self.host)
            .finish()
    }
}
