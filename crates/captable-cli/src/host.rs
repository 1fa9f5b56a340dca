//! Host setup shared by the CLI commands.

use std::future::Future;

use tracing::{info, warn};

use captable_abi::PluginInitFn;
use captable_core::config::AppConfig;
use captable_core::result::AppResult;
use captable_host::{HostClient, HostRuntime, PluginManager, TracingStatusSink};

/// Plugins linked into this binary.
pub fn builtin_plugins() -> Vec<(&'static str, PluginInitFn)> {
    vec![("echo", plugin_echo::init_fn())]
}

/// Builds a manager with every enabled built-in plugin loaded.
pub fn load_manager(config: &AppConfig) -> AppResult<PluginManager> {
    let mut manager = PluginManager::from_config(config);
    manager.add_status_sink(Box::new(TracingStatusSink));

    for (name, init_fn) in builtin_plugins() {
        if !config.plugins.is_enabled(name) {
            info!(plugin = %name, "Plugin disabled by configuration");
            continue;
        }
        manager.load(name, init_fn)?;
    }

    if manager.plugins().is_empty() {
        warn!("No plugins loaded");
    }
    Ok(manager)
}

/// Runs `work` against a freshly loaded host, then shuts the host down.
pub async fn with_host<F, Fut, T>(config: &AppConfig, work: F) -> AppResult<T>
where
    F: FnOnce(HostClient) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let manager = load_manager(config)?;
    let (runtime, client) = HostRuntime::new(manager, config.host.request_queue);
    let control = client.clone();

    let work = async move {
        let result = work(client).await;
        if let Err(e) = control.shutdown().await {
            warn!(error = %e, "Host shutdown failed");
        }
        result
    };

    let (_, result) = tokio::join!(runtime.run(), work);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_plugins_are_skipped() {
        let config = AppConfig::from_toml_str("[plugins]\nenabled = []\n").expect("config");
        let manager = load_manager(&config).expect("manager");
        assert!(manager.plugins().is_empty());
    }

    #[tokio::test]
    async fn test_with_host_runs_echo() {
        let config = AppConfig::default();
        let outcome = with_host(&config, |client| async move { client.run("echo hi").await })
            .await
            .expect("run");
        assert!(outcome.is_success());
    }
}
