//! Traits implemented by plugin authors.

use crate::api::PluginApi;

/// A plugin's state and lifecycle.
///
/// `init` runs inside the entry point and is the only place where commands
/// and handlers can be registered. The returned value becomes the plugin's
/// user data and is dropped after `deinit`.
pub trait Plugin: Sized + 'static {
    /// Name used in SDK log messages.
    const NAME: &'static str;

    /// Builds the plugin state and registers its commands.
    fn init(api: &PluginApi<'_>) -> Self;

    /// Called for every host event once registered with
    /// [`PluginApi::set_event_handler`].
    fn on_event(&mut self, _api: &PluginApi<'_>) {}

    /// Called once when the host unloads the plugin.
    fn deinit(self) {}
}

/// A command owned by plugin `P`.
pub trait Command<P: Plugin> {
    /// Name the command is registered under.
    const NAME: &'static str;

    /// Runs the command. An `Err` message is reported to the host as the
    /// command's failure; an empty message counts as success.
    fn run(plugin: &mut P, api: &PluginApi<'_>, args: &CommandArgs<'_>) -> Result<(), String>;
}

/// Arguments of one command invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandArgs<'a> {
    /// Everything after the command name.
    pub args: &'a str,
    /// Whether the name was followed by `!`.
    pub bang: bool,
}

impl<'a> CommandArgs<'a> {
    /// Whitespace-separated words of `args`.
    pub fn words(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.args.split_whitespace()
    }

    /// Returns `true` when no arguments were given.
    pub fn is_empty(&self) -> bool {
        self.args.trim().is_empty()
    }
}
