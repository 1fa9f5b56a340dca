//! Host runtime — serializes requests from async code onto the single task
//! that owns the [`PluginManager`].
//!
//! Plugins are not thread-safe and the manager is not `Send`. Any number of
//! [`HostClient`]s can submit requests concurrently; they queue on a bounded
//! channel and are handled one at a time by [`HostRuntime::run`], which the
//! owner drives on its own task (for example inside `tokio::join!` or a
//! `LocalSet`).

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use captable_core::error::AppError;
use captable_core::result::AppResult;

use crate::collection::PluginInfo;
use crate::commands::CommandInfo;
use crate::manager::{CommandOutcome, PluginManager};
use crate::status::StatusMessage;

/// A request to the runtime.
#[derive(Debug)]
pub enum HostRequest {
    /// Run a command line.
    Invoke {
        /// `name[!] [args]`.
        line: String,
        /// Reply channel.
        reply: oneshot::Sender<AppResult<CommandOutcome>>,
    },
    /// Fire an event at every active plugin.
    FireEvent {
        /// Reply channel with the number of handlers run.
        reply: oneshot::Sender<usize>,
    },
    /// List plugins.
    ListPlugins {
        /// Reply channel.
        reply: oneshot::Sender<Vec<PluginInfo>>,
    },
    /// List commands.
    ListCommands {
        /// Reply channel.
        reply: oneshot::Sender<Vec<CommandInfo>>,
    },
    /// Snapshot the status bar.
    StatusLines {
        /// Reply channel.
        reply: oneshot::Sender<Vec<StatusMessage>>,
    },
    /// Unload every plugin and stop.
    Shutdown {
        /// Reply channel.
        reply: oneshot::Sender<()>,
    },
}

/// The serving side. Owns the manager.
#[derive(Debug)]
pub struct HostRuntime {
    manager: PluginManager,
    requests: mpsc::Receiver<HostRequest>,
}

/// The requesting side. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HostClient {
    requests: mpsc::Sender<HostRequest>,
}

impl HostRuntime {
    /// Wraps `manager` behind a request queue of `capacity` entries.
    pub fn new(manager: PluginManager, capacity: usize) -> (Self, HostClient) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                manager,
                requests: rx,
            },
            HostClient { requests: tx },
        )
    }

    /// Serves requests until a shutdown request arrives or every client is
    /// dropped. Remaining plugins are unloaded before returning the manager.
    pub async fn run(mut self) -> PluginManager {
        info!("Host runtime started");

        while let Some(request) = self.requests.recv().await {
            match request {
                HostRequest::Invoke { line, reply } => {
                    let _ = reply.send(self.manager.run_line(&line));
                }
                HostRequest::FireEvent { reply } => {
                    let _ = reply.send(self.manager.fire_event());
                }
                HostRequest::ListPlugins { reply } => {
                    let _ = reply.send(self.manager.plugins());
                }
                HostRequest::ListCommands { reply } => {
                    let _ = reply.send(self.manager.commands());
                }
                HostRequest::StatusLines { reply } => {
                    let _ = reply.send(self.manager.status().messages().cloned().collect());
                }
                HostRequest::Shutdown { reply } => {
                    debug!("Shutdown requested");
                    self.manager.unload_all();
                    let _ = reply.send(());
                    break;
                }
            }
        }

        self.manager.unload_all();
        info!("Host runtime stopped");
        self.manager
    }
}

impl HostClient {
    /// Runs a command line.
    pub async fn run(&self, line: impl Into<String>) -> AppResult<CommandOutcome> {
        let line = line.into();
        self.request(|reply| HostRequest::Invoke { line, reply }).await?
    }

    /// Fires an event. Returns how many handlers ran.
    pub async fn fire_event(&self) -> AppResult<usize> {
        self.request(|reply| HostRequest::FireEvent { reply }).await
    }

    /// Lists plugins.
    pub async fn plugins(&self) -> AppResult<Vec<PluginInfo>> {
        self.request(|reply| HostRequest::ListPlugins { reply }).await
    }

    /// Lists commands.
    pub async fn commands(&self) -> AppResult<Vec<CommandInfo>> {
        self.request(|reply| HostRequest::ListCommands { reply }).await
    }

    /// Snapshots the status bar, oldest message first.
    pub async fn status(&self) -> AppResult<Vec<StatusMessage>> {
        self.request(|reply| HostRequest::StatusLines { reply }).await
    }

    /// Unloads every plugin and stops the runtime.
    pub async fn shutdown(&self) -> AppResult<()> {
        self.request(|reply| HostRequest::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HostRequest,
    ) -> AppResult<T> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(build(tx))
            .await
            .map_err(|_| AppError::internal("Host runtime has stopped"))?;
        rx.await
            .map_err(|_| AppError::internal("Host runtime dropped the request"))
    }
}
