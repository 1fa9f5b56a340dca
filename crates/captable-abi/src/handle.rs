//! Opaque tokens exchanged between host and plugin.

use std::os::raw::c_void;
use std::ptr;

use crate::slice::ByteSlice;

/// Opaque value a plugin supplies once and the host echoes back on every
/// callback.
///
/// The host stores it and never dereferences it. Once the plugin's deinit
/// function has run, the plugin treats it as released.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginUserData(pub *mut c_void);

impl PluginUserData {
    /// A user data value carrying nothing.
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    /// Returns `true` if no user data was supplied.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// The raw address, for logging and identity checks.
    pub fn addr(&self) -> usize {
        self.0 as usize
    }
}

impl Default for PluginUserData {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for PluginUserData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PluginUserData({:p})", self.0)
    }
}

/// Opaque token identifying the calling plugin to the host.
///
/// The host passes one to every plugin function it calls, and the plugin
/// passes it back unchanged on every table call made during that call. A
/// handle is only valid until the plugin function it was passed to returns.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HostHandle(pub *mut c_void);

impl HostHandle {
    /// A handle the host will reject.
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    /// Returns `true` for the null handle.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HostHandle({:p})", self.0)
    }
}

/// Host-owned context for a single command invocation.
///
/// Valid only while the command function runs; plugins must copy out
/// anything they want to keep.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandContext {
    /// Argument text following the command name. May be empty.
    pub args: ByteSlice,
    /// Whether the command was invoked with a trailing `!`.
    pub bang: bool,
}
