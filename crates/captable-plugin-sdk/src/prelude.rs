//! Prelude for convenient imports.

pub use captable_abi::{Capability, StatusLevel};

pub use crate::api::PluginApi;
pub use crate::plugin::{Command, CommandArgs, Plugin};

pub use crate::plugin_entry;
