//! Echo plugin commands.

use captable_plugin_sdk::prelude::*;

use crate::plugin::EchoPlugin;

/// `echo[!] <text>`: writes `text` to the status bar, as a warning with `!`.
#[derive(Debug)]
pub struct Echo;

impl Command<EchoPlugin> for Echo {
    const NAME: &'static str = "echo";

    fn run(
        plugin: &mut EchoPlugin,
        api: &PluginApi<'_>,
        args: &CommandArgs<'_>,
    ) -> Result<(), String> {
        if args.is_empty() {
            return Err("echo: nothing to echo".to_string());
        }
        let level = if args.bang {
            StatusLevel::Warning
        } else {
            StatusLevel::Info
        };
        api.write_to_statusbar(level, args.args);
        plugin.history.push(args.args.to_string());
        Ok(())
    }
}

/// `count`: reports how many texts and events the plugin has seen.
#[derive(Debug)]
pub struct Count;

impl Command<EchoPlugin> for Count {
    const NAME: &'static str = "count";

    fn run(
        plugin: &mut EchoPlugin,
        api: &PluginApi<'_>,
        _args: &CommandArgs<'_>,
    ) -> Result<(), String> {
        api.info(&format!(
            "echo: {} messages, {} events",
            plugin.history.len(),
            plugin.events
        ));
        Ok(())
    }
}

/// `fail [message]`: always fails, with `message` if given.
#[derive(Debug)]
pub struct Fail;

impl Command<EchoPlugin> for Fail {
    const NAME: &'static str = "fail";

    fn run(_: &mut EchoPlugin, _: &PluginApi<'_>, args: &CommandArgs<'_>) -> Result<(), String> {
        if args.is_empty() {
            Err("echo: failure requested".to_string())
        } else {
            Err(args.args.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use captable_host::PluginManager;

    use super::*;

    fn manager() -> PluginManager {
        let mut manager = PluginManager::new();
        manager.load("echo", crate::init_fn()).expect("load");
        manager
    }

    #[test]
    fn test_echo_writes_status() {
        let mut manager = manager();
        assert!(manager.run_line("echo hello world").unwrap().is_success());

        let latest = manager.status().latest().expect("status");
        assert_eq!(latest.level, StatusLevel::Info);
        assert_eq!(latest.source.as_deref(), Some("echo"));
        assert_eq!(latest.text, "hello world");

        manager.run_line("echo! careful").unwrap();
        assert_eq!(manager.status().latest().unwrap().level, StatusLevel::Warning);
    }

    #[test]
    fn test_echo_without_text_fails() {
        let mut manager = manager();
        let outcome = manager.run_line("echo").unwrap();
        assert_eq!(outcome.failure(), Some("echo: nothing to echo"));
    }

    #[test]
    fn test_count_includes_events() {
        let mut manager = manager();
        manager.run_line("echo a").unwrap();
        manager.run_line("echo b").unwrap();
        assert_eq!(manager.fire_event(), 1);
        assert_eq!(manager.status().latest().unwrap().text, "echo: event #1");

        manager.run_line("count").unwrap();
        assert_eq!(
            manager.status().latest().unwrap().text,
            "echo: 2 messages, 1 events"
        );
    }

    #[test]
    fn test_fail_returns_message() {
        let mut manager = manager();
        let outcome = manager.run_line("fail disk is full").unwrap();
        assert_eq!(outcome.failure(), Some("disk is full"));

        let outcome = manager.run_line("fail").unwrap();
        assert_eq!(outcome.failure(), Some("echo: failure requested"));
    }
}
