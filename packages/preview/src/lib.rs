//! Glance Preview - Local preview session lifecycle orchestration
//!
//! This crate coordinates an embedded preview server, an in-editor preview
//! panel and an external task runner under overlapping asynchronous
//! triggers: user commands, task open/close requests, configuration changes
//! and panel disposal. The host integrates by driving the
//! [`LifecycleCoordinator`] operations and wiring its collaborators' events
//! back into the coordinator's inbound handlers.

pub mod connection;
pub mod coordinator;
pub mod endpoint;
pub mod host;
pub mod session;
pub mod settings;
pub mod static_server;
pub mod types;
pub mod workspace;

// Re-export key types for easier use
pub use connection::ConnectionManager;
pub use coordinator::LifecycleCoordinator;
pub use endpoint::EndpointManager;
pub use host::{
    BrowserLauncher, Collaborators, LooseFileNotifier, PanelFactory, PreviewPanel, ServerProcess,
    TaskBridge,
};
pub use session::PreviewSession;
pub use settings::{FileSettingsStore, PreviewSettings, SettingsStore};
pub use static_server::StaticPreviewServer;
pub use types::{
    LooseFileChoice, PendingLaunch, PreviewError, PreviewResult, PreviewTarget, ServerEvent,
    ServerStartedStatus, ViewColumn,
};
pub use workspace::WorkspaceManager;

/// Version information for the preview crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
