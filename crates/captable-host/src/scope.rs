//! Host scope — the state behind a [`HostHandle`] for one call into a plugin.
//!
//! Every time the host calls a plugin function it builds a `HostScope` on
//! its own stack and passes its address as the `HostHandle`. Table calls
//! made by the plugin during that call resolve the handle back to the scope,
//! which identifies the calling plugin and what it is allowed to do.

use std::fmt;
use std::os::raw::c_void;

use captable_abi::HostHandle;

use crate::collection::{PluginCollection, PluginHandle};
use crate::commands::CommandRegistry;
use crate::status::StatusBar;

/// Which plugin function the host is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    /// The plugin's entry point. Registration is allowed.
    Init,
    /// A command function.
    Command,
    /// The event handler.
    Event,
}

impl CallPhase {
    /// Returns whether table registration calls are accepted.
    pub fn allows_registration(self) -> bool {
        matches!(self, Self::Init)
    }
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Command => "command",
            Self::Event => "event",
        };
        f.write_str(s)
    }
}

/// Host state that table calls may touch.
#[derive(Debug)]
pub struct HostState {
    /// Loaded plugins.
    pub plugins: PluginCollection,
    /// Registered commands.
    pub commands: CommandRegistry,
    /// Status bar.
    pub status: StatusBar,
    /// Upper bound on commands per plugin.
    pub max_commands_per_plugin: usize,
}

const SCOPE_MAGIC: u64 = 0x6361_7074_6162_6c65;

/// Per-call context resolved from a [`HostHandle`].
pub struct HostScope<'a> {
    magic: u64,
    /// Plugin being called.
    pub plugin: PluginHandle,
    /// Function being called.
    pub phase: CallPhase,
    /// Mutable host state.
    pub state: &'a mut HostState,
}

impl<'a> HostScope<'a> {
    /// Opens a scope for a call into `plugin`.
    pub fn new(plugin: PluginHandle, phase: CallPhase, state: &'a mut HostState) -> Self {
        Self {
            magic: SCOPE_MAGIC,
            plugin,
            phase,
            state,
        }
    }

    /// The handle to pass to the plugin. Valid while `self` is alive and
    /// not otherwise borrowed.
    pub fn handle(&mut self) -> HostHandle {
        HostHandle(self as *mut Self as *mut c_void)
    }

    /// Name of the calling plugin.
    pub fn plugin_name(&self) -> &str {
        self.state.plugins.name(self.plugin)
    }

    /// Resolves a handle received from a plugin.
    ///
    /// Returns `None` for the null handle and for handles whose scope has
    /// already been closed (as far as that can be detected).
    ///
    /// # Safety
    ///
    /// A non-null `handle` must have been produced by [`HostScope::handle`]
    /// on a scope that is still on the stack.
    pub unsafe fn resolve<'h>(handle: HostHandle) -> Option<&'h mut HostScope<'h>> {
        if handle.is_null() {
            return None;
        }
        let scope = unsafe { &mut *(handle.0 as *mut HostScope<'h>) };
        (scope.magic == SCOPE_MAGIC).then_some(scope)
    }
}

impl Drop for HostScope<'_> {
    fn drop(&mut self) {
        self.magic = 0;
    }
}

impl fmt::Debug for HostScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostScope")
            .field("plugin", &self.plugin)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> HostState {
        HostState {
            plugins: PluginCollection::new(),
            commands: CommandRegistry::new(),
            status: StatusBar::new(4),
            max_commands_per_plugin: 8,
        }
    }

    #[test]
    fn test_handle_resolves_to_scope() {
        let mut state = state();
        let plugin = state.plugins.reserve("echo");
        let mut scope = HostScope::new(plugin, CallPhase::Command, &mut state);
        let handle = scope.handle();

        let resolved = unsafe { HostScope::resolve(handle) }.expect("live scope");
        assert_eq!(resolved.plugin, plugin);
        assert_eq!(resolved.phase, CallPhase::Command);
        assert_eq!(resolved.plugin_name(), "echo");
    }

    #[test]
    fn test_null_handle_rejected() {
        assert!(unsafe { HostScope::resolve(HostHandle::null()) }.is_none());
    }

    #[test]
    fn test_only_init_allows_registration() {
        assert!(CallPhase::Init.allows_registration());
        assert!(!CallPhase::Command.allows_registration());
        assert!(!CallPhase::Event.allows_registration());
    }
}
