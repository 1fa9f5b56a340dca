//! End-to-end tests driving the echo plugin through the host.

use captable_abi::StatusLevel;
use captable_core::config::AppConfig;
use captable_core::error::ErrorKind;
use captable_host::{CommandOutcome, HostRuntime, PluginManager, PluginState};

/// Builds a manager from TOML overrides with the echo plugin loaded.
fn echo_host(toml: &str) -> PluginManager {
    let config = AppConfig::from_toml_str(toml).expect("Failed to parse test config");
    let mut manager = PluginManager::from_config(&config);
    manager
        .load("echo", plugin_echo::init_fn())
        .expect("Failed to load echo plugin");
    manager
}

#[test]
fn test_echo_lifecycle() {
    let mut manager = echo_host("");

    let info = manager.plugins();
    assert_eq!(info.len(), 1);
    assert_eq!(info[0].name, "echo");
    assert_eq!(info[0].state, PluginState::Active);
    assert_eq!(info[0].commands, 3);
    assert!(info[0].has_deinit);
    assert!(info[0].has_event_handler);

    let names: Vec<_> = manager.commands().into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["count", "echo", "fail"]);

    let handle = manager.find("echo").expect("echo is loaded");
    manager.unload(handle).expect("unload");

    let err = manager.run_line("echo hi").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(manager.fire_event(), 0);
    assert_eq!(manager.plugins()[0].state, PluginState::Deinitialized);
}

#[test]
fn test_failure_surfaced_to_status_bar() {
    let mut manager = echo_host("");
    let outcome = manager.run_line("fail out of paper").unwrap();
    assert_eq!(
        outcome,
        CommandOutcome::Failed {
            plugin: "echo".to_string(),
            message: "out of paper".to_string(),
        }
    );

    let latest = manager.status().latest().expect("status");
    assert_eq!(latest.level, StatusLevel::Error);
    assert!(latest.text.contains("out of paper"));

    let json = serde_json::to_value(&outcome).expect("serialize outcome");
    assert_eq!(json["outcome"], "failed");
    assert_eq!(json["message"], "out of paper");
}

#[test]
fn test_failure_not_surfaced_when_disabled() {
    let mut manager = echo_host("[host]\nsurface_command_errors = false\n");
    manager.run_line("fail quietly").unwrap();
    assert!(manager.status().is_empty());
}

#[test]
fn test_status_history_is_bounded() {
    let mut manager = echo_host("[host]\nstatus_history = 2\n");
    for word in ["one", "two", "three"] {
        manager.run_line(&format!("echo {word}")).unwrap();
    }
    let texts: Vec<_> = manager.status().messages().map(|m| m.text.clone()).collect();
    assert_eq!(texts, ["two", "three"]);
}

#[test]
fn test_plugin_can_be_reloaded_after_unload() {
    let mut manager = echo_host("");
    manager.run_line("echo before").unwrap();
    let first = manager.find("echo").unwrap();
    manager.unload(first).unwrap();

    let second = manager.load("echo", plugin_echo::init_fn()).expect("reload");
    assert_ne!(first, second);

    manager.run_line("count").unwrap();
    assert_eq!(
        manager.status().latest().unwrap().text,
        "echo: 0 messages, 0 events"
    );
}

#[tokio::test]
async fn test_runtime_serves_echo() {
    let (runtime, client) = HostRuntime::new(echo_host(""), 8);

    let work = async {
        let outcome = client.run("echo from a task").await.expect("run");
        assert!(outcome.is_success());
        assert_eq!(client.fire_event().await.expect("event"), 1);

        let status = client.status().await.expect("status");
        let texts: Vec<_> = status.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["from a task", "echo: event #1"]);

        let err = client.run("missing").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        client.shutdown().await.expect("shutdown");
    };

    let (manager, ()) = tokio::join!(runtime.run(), work);
    assert!(
        manager
            .plugins()
            .iter()
            .all(|p| p.state == PluginState::Deinitialized)
    );
}
