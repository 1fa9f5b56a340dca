//! Plugin collection — per-plugin user data, callbacks and lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};

use captable_abi::{DeinitFn, EventHandlerFn, PluginUserData};

/// Index of a plugin in the collection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginHandle(u32);

impl PluginHandle {
    /// The raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a plugin's relationship to the table.
///
/// Transitions only move forward:
/// `Uninitialized -> Registered -> Active -> Deinitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Slot reserved, entry point not yet called.
    Uninitialized,
    /// Entry point running; registration calls are accepted.
    Registered,
    /// Entry point returned; commands and events may be delivered.
    Active,
    /// Deinit has run; nothing reaches the plugin any more.
    Deinitialized,
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Registered => "registered",
            Self::Active => "active",
            Self::Deinitialized => "deinitialized",
        };
        f.write_str(s)
    }
}

/// A loaded plugin.
#[derive(Debug)]
pub struct PluginEntry {
    /// Name the plugin was loaded under.
    pub name: String,
    /// Opaque user data returned by the entry point.
    pub userdata: PluginUserData,
    /// Current lifecycle state.
    pub state: PluginState,
    /// Deinit callback (last registration wins).
    pub deinit_fn: Option<DeinitFn>,
    /// Event callback (last registration wins).
    pub event_handler_fn: Option<EventHandlerFn>,
}

/// Serializable summary of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Collection index.
    pub handle: PluginHandle,
    /// Plugin name.
    pub name: String,
    /// Lifecycle state.
    pub state: PluginState,
    /// Number of commands currently registered by the plugin.
    pub commands: usize,
    /// Whether a deinit callback is installed.
    pub has_deinit: bool,
    /// Whether an event handler is installed.
    pub has_event_handler: bool,
}

/// All plugins ever loaded by a host, in load order.
///
/// Entries are never removed. A deinitialized plugin keeps its slot so its
/// handle is never handed to another plugin and it still shows up in
/// listings. Unloading and reloading a plugin therefore grows the collection
/// by one small entry per load; the plugin's own state is freed by its deinit
/// callback.
#[derive(Debug, Default)]
pub struct PluginCollection {
    plugins: Vec<PluginEntry>,
}

impl PluginCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot for a new plugin in the `Uninitialized` state.
    pub fn reserve(&mut self, name: &str) -> PluginHandle {
        let handle = PluginHandle(self.plugins.len() as u32);
        self.plugins.push(PluginEntry {
            name: name.to_string(),
            userdata: PluginUserData::null(),
            state: PluginState::Uninitialized,
            deinit_fn: None,
            event_handler_fn: None,
        });
        handle
    }

    /// Gets a plugin entry.
    pub fn get(&self, handle: PluginHandle) -> Option<&PluginEntry> {
        self.plugins.get(handle.0 as usize)
    }

    /// Gets a plugin entry mutably.
    pub fn get_mut(&mut self, handle: PluginHandle) -> Option<&mut PluginEntry> {
        self.plugins.get_mut(handle.0 as usize)
    }

    /// Finds a live (not deinitialized) plugin by name.
    pub fn find_live(&self, name: &str) -> Option<PluginHandle> {
        self.plugins
            .iter()
            .position(|p| p.name == name && p.state != PluginState::Deinitialized)
            .map(|i| PluginHandle(i as u32))
    }

    /// Name of a plugin, or `"?"` for an unknown handle.
    pub fn name(&self, handle: PluginHandle) -> &str {
        self.get(handle).map(|p| p.name.as_str()).unwrap_or("?")
    }

    /// Handles of all plugins in load order.
    pub fn handles(&self) -> impl DoubleEndedIterator<Item = PluginHandle> + use<> {
        (0..self.plugins.len() as u32).map(PluginHandle)
    }

    /// Handles of all plugins in the given state, in load order.
    pub fn handles_in(&self, state: PluginState) -> Vec<PluginHandle> {
        self.handles()
            .filter(|h| self.get(*h).is_some_and(|p| p.state == state))
            .collect()
    }

    /// Number of plugins ever loaded.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if nothing was ever loaded.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_sequential() {
        let mut plugins = PluginCollection::new();
        let a = plugins.reserve("a");
        let b = plugins.reserve("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(plugins.name(b), "b");
        assert_eq!(plugins.get(a).map(|p| p.state), Some(PluginState::Uninitialized));
    }

    #[test]
    fn test_find_live_skips_deinitialized() {
        let mut plugins = PluginCollection::new();
        let first = plugins.reserve("echo");
        assert_eq!(plugins.find_live("echo"), Some(first));

        if let Some(entry) = plugins.get_mut(first) {
            entry.state = PluginState::Deinitialized;
        }
        assert_eq!(plugins.find_live("echo"), None);

        let second = plugins.reserve("echo");
        assert_eq!(plugins.find_live("echo"), Some(second));
        assert_ne!(first, second);

        // The old entry is retained for listings.
        assert_eq!(plugins.len(), 2);
        assert_eq!(plugins.get(first).map(|p| p.state), Some(PluginState::Deinitialized));
    }

    #[test]
    fn test_handles_in_state() {
        let mut plugins = PluginCollection::new();
        let a = plugins.reserve("a");
        let _b = plugins.reserve("b");
        if let Some(entry) = plugins.get_mut(a) {
            entry.state = PluginState::Active;
        }
        assert_eq!(plugins.handles_in(PluginState::Active), vec![a]);
        assert_eq!(plugins.name(PluginHandle(9)), "?");
    }
}
