//! # captable-abi
//!
//! The C-compatible interface between a captable host and its plugins.
//!
//! A host hands every plugin one [`CapabilityTable`] at load time. The table
//! is the plugin's entire view of the host: it registers commands, writes to
//! the status bar and installs its deinit and event callbacks through it.
//! Every call into the table carries the [`HostHandle`] the host gave the
//! plugin, so the host never relies on an ambient "current plugin".
//!
//! Everything in this crate is `#[repr(C)]` or `#[repr(transparent)]` and
//! its layout is part of the ABI.

pub mod handle;
pub mod level;
pub mod slice;
pub mod table;

pub use handle::{CommandContext, HostHandle, PluginUserData};
pub use level::StatusLevel;
pub use slice::{BorrowedSlice, ByteSlice, SliceError};
pub use table::{
    ABI_VERSION, Capabilities, Capability, CapabilityTable, CommandFn, DeinitFn, EventHandlerFn,
    PluginInitFn, RegisterCommandFn, SetDeinitFn, SetEventHandlerFn, TableHeader,
    WriteToStatusbarFn,
};
