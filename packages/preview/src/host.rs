// ABOUTME: Contracts for the host-side collaborators of the lifecycle coordinator
// ABOUTME: The coordinator drives these traits; the host wires their events back in

use std::sync::Arc;

use async_trait::async_trait;

use crate::settings::SettingsStore;
use crate::types::{LooseFileChoice, ServerStartedStatus, ViewColumn};

/// The embedded HTTP server process.
///
/// `start` requests startup and reports whether the request was accepted;
/// `is_running` flips to true once the server has actually come up. The host
/// wires the implementation's connected event (see
/// [`ServerEvent`](crate::types::ServerEvent)) to
/// [`LifecycleCoordinator::handle_server_connected`](crate::coordinator::LifecycleCoordinator::handle_server_connected).
#[async_trait]
pub trait ServerProcess: Send + Sync {
    async fn start(&self, port: u16) -> bool;
    async fn stop(&self);
    async fn is_running(&self) -> bool;
}

/// The host-visible task that surfaces server status in the UI.
///
/// When the "run as task" configuration is on, the task owns the server
/// process from the user's point of view; open/close requests it raises are
/// delivered to the coordinator's `handle_task_*` handlers.
#[async_trait]
pub trait TaskBridge: Send + Sync {
    async fn is_running(&self) -> bool;
    /// Run the external-preview flow as a host task.
    async fn ext_run_task(&self, verbose_logging: bool);
    /// Surface the server URI and how it came up.
    async fn server_started(&self, uri: &str, status: ServerStartedStatus);
    /// Tear down the task's own bookkeeping. `force` also ends the task itself.
    async fn server_stop(&self, force: bool);
}

/// One webview panel chrome instance. Disposal must be idempotent.
#[async_trait]
pub trait PreviewPanel: Send + Sync {
    fn column(&self) -> ViewColumn;
    async fn reveal(&self, column: ViewColumn);
    async fn navigate(&self, uri: &str);
    async fn dispose(&self);
}

/// Creates fresh panels when no restorable panel was handed in.
pub trait PanelFactory: Send + Sync {
    fn create_panel(&self, column: ViewColumn) -> Box<dyn PreviewPanel>;
}

/// Opens a URI in the user's external browser.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn open(&self, uri: &str);
}

/// Shows the "file outside workspace" advisory and reports the user's choice.
#[async_trait]
pub trait LooseFileNotifier: Send + Sync {
    async fn notify(&self, path: &str) -> LooseFileChoice;
}

/// The full set of collaborators the coordinator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub server: Arc<dyn ServerProcess>,
    pub task_bridge: Arc<dyn TaskBridge>,
    pub panels: Arc<dyn PanelFactory>,
    pub browser: Arc<dyn BrowserLauncher>,
    pub notifier: Arc<dyn LooseFileNotifier>,
    pub settings_store: Arc<dyn SettingsStore>,
}
