//! # captable-host
//!
//! Reference host for the captable capability table. Provides:
//!
//! - the static [`CapabilityTable`](captable_abi::CapabilityTable) handed to
//!   every plugin, and the `extern "C"` functions behind it
//! - the plugin collection and its lifecycle
//!   (Uninitialized, Registered, Active, Deinitialized)
//! - the command registry and the status bar
//! - [`PluginManager`] to load plugins and drive commands and events
//! - [`HostRuntime`] to serialize access from async code

pub mod api;
pub mod collection;
pub mod commands;
pub mod manager;
pub mod runtime;
pub mod scope;
pub mod status;

pub use api::{host_table, restricted_table};
pub use collection::{PluginCollection, PluginHandle, PluginInfo, PluginState};
pub use commands::{CommandBinding, CommandInfo, CommandLine, CommandRegistry};
pub use manager::{CommandOutcome, PluginManager};
pub use runtime::{HostClient, HostRuntime};
pub use status::{StatusBar, StatusMessage, StatusSink, TracingStatusSink};
