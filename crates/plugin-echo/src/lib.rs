//! Sample captable plugin.
//!
//! Registers `echo`, `count` and `fail`, reports every host event on the
//! status bar, and logs a summary when unloaded. Built as a `cdylib` it
//! exports `captable_plugin_init`; linked statically, use [`init_fn`].

pub mod commands;
pub mod plugin;

use captable_plugin_sdk::abi::PluginInitFn;

pub use plugin::EchoPlugin;

captable_plugin_sdk::plugin_entry!(EchoPlugin);

/// Entry point for hosts that link the plugin statically.
pub fn init_fn() -> PluginInitFn {
    captable_plugin_init
}
