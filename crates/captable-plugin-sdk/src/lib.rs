//! # captable-plugin-sdk
//!
//! Helpers for writing captable plugins in Rust.
//!
//! A plugin implements [`Plugin`] for its state type and [`Command`] for each
//! command, registers them from [`Plugin::init`] through [`PluginApi`], and
//! exports its entry point with [`plugin_entry!`]. The SDK boxes the state
//! as the plugin's user data and frees it on deinit.

pub mod api;
pub mod macros;
pub mod plugin;
pub mod prelude;
pub mod trampoline;

pub use captable_abi as abi;

pub use api::PluginApi;
pub use plugin::{Command, CommandArgs, Plugin};

/// Entry point for `P`, for hosts that link the plugin statically.
pub fn entry_point<P: Plugin>() -> abi::PluginInitFn {
    trampoline::init::<P>
}
