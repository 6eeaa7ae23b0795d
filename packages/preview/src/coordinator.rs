// ABOUTME: The lifecycle state machine tying server, panel and task together
// ABOUTME: Decides when the server starts, which surface opens, and when to tear down

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::connection::ConnectionManager;
use crate::endpoint::EndpointManager;
use crate::host::{Collaborators, PreviewPanel};
use crate::session::PreviewSession;
use crate::settings::PreviewSettings;
use crate::types::{
    LooseFileChoice, PendingLaunch, PreviewTarget, ServerStartedStatus, ViewColumn,
};
use crate::workspace::WorkspaceManager;

/// Everything the coordinator mutates, funneled through one struct so no
/// free-floating flags exist. All transitions complete inside a single lock
/// acquisition before control returns to the host.
struct CoordinatorState {
    connection: ConnectionManager,
    endpoints: EndpointManager,
    session: Option<PreviewSession>,
    pending_launch: Option<PendingLaunch>,
    shutdown_timer: Option<JoinHandle<()>>,
    shutdown_epoch: u64,
    notified_loose_file: bool,
    settings: PreviewSettings,
}

/// Coordinates the preview server, the embedded panel and the host task
/// under overlapping asynchronous triggers.
///
/// The coordinator owns no event loop; the host delivers every external
/// trigger (commands, task requests, panel disposal, the server's connected
/// event, configuration changes) as a call into one of the `handle_*` or
/// operation methods, and each call runs its transitions to completion.
#[derive(Clone)]
pub struct LifecycleCoordinator {
    state: Arc<RwLock<CoordinatorState>>,
    collab: Collaborators,
    workspace: Arc<WorkspaceManager>,
}

impl LifecycleCoordinator {
    pub fn new(
        collab: Collaborators,
        workspace: Arc<WorkspaceManager>,
        settings: PreviewSettings,
    ) -> Self {
        let connection = ConnectionManager::new("127.0.0.1", settings.port);
        Self {
            state: Arc::new(RwLock::new(CoordinatorState {
                connection,
                endpoints: EndpointManager::new(),
                session: None,
                pending_launch: None,
                shutdown_timer: None,
                shutdown_epoch: 0,
                notified_loose_file: false,
                settings,
            })),
            collab,
            workspace,
        }
    }

    /// Open (or reveal) the embedded preview for `path`.
    ///
    /// While the server is still coming up the request is stored as the
    /// single pending launch; repeated calls replace it without issuing a
    /// second start request. Once the server is up this is an idempotent
    /// reveal of the one live session.
    pub async fn create_or_show_embedded_preview(
        &self,
        panel: Option<Box<dyn PreviewPanel>>,
        path: &str,
        is_relative: bool,
    ) {
        let mut st = self.state.write().await;
        self.cancel_shutdown(&mut st);

        if !self.collab.server.is_running().await {
            let start_already_requested = st.pending_launch.is_some();
            st.pending_launch = Some(PendingLaunch {
                target: PreviewTarget::Embedded,
                file_path: path.to_string(),
                is_relative,
                panel,
            });
            if !start_already_requested && !self.open_server_locked(&mut st, false).await {
                warn!("preview server failed to start; dropping launch for {}", path);
                st.pending_launch = None;
            }
            return;
        }

        self.launch_embedded(&mut st, panel, path, is_relative).await;
    }

    /// Open the preview for `path` in the external browser.
    ///
    /// Returns false only when a direct server start was needed and failed;
    /// in that case the request is abandoned entirely.
    pub async fn show_preview_in_browser(&self, path: &str, is_relative: bool) -> bool {
        let mut st = self.state.write().await;

        if self.collab.task_bridge.is_running().await {
            self.launch_external(&mut st, path, is_relative).await;
            return true;
        }

        if !self.collab.server.is_running().await {
            let start_already_requested = st.pending_launch.is_some();
            st.pending_launch = Some(PendingLaunch {
                target: PreviewTarget::External,
                file_path: path.to_string(),
                is_relative,
                panel: None,
            });

            if start_already_requested {
                return true;
            }

            if self.workspace.workspace().is_some() && st.settings.run_as_task {
                // The host-visible task owns the server process in this mode.
                let verbose = st.settings.task_verbose;
                self.collab.task_bridge.ext_run_task(verbose).await;
                return true;
            }

            if !self.open_server_locked(&mut st, false).await {
                st.pending_launch = None;
                return false;
            }
            return true;
        }

        self.launch_external(&mut st, path, is_relative).await;
        true
    }

    /// Start the server if it is not running. When it is already running and
    /// the request came from the task, re-announce the URI to the task with
    /// `StartedByEmbeddedPreview`.
    pub async fn open_server(&self, from_task: bool) -> bool {
        let mut st = self.state.write().await;
        self.open_server_locked(&mut st, from_task).await
    }

    /// Stop the server, the live session and the task bookkeeping.
    ///
    /// Callers are responsible for making sure no consumer still needs the
    /// server. Returns false (with no side effects) when nothing was running.
    pub async fn close_server(&self) -> bool {
        let mut st = self.state.write().await;
        self.close_server_locked(&mut st).await
    }

    /// The server finished starting; fired once per successful start.
    pub async fn handle_server_connected(&self, uri: &str) {
        let mut st = self.state.write().await;
        st.connection.connected(uri.to_string());
        self.collab
            .task_bridge
            .server_started(uri, ServerStartedStatus::JustStarted)
            .await;

        // Honor the launch that was queued before the server existed.
        // Exactly once: the slot is consumed here and only here.
        if let Some(intent) = st.pending_launch.take() {
            debug!(
                "dispatching pending {} launch for {}",
                intent.target.as_str(),
                intent.file_path
            );
            match intent.target {
                PreviewTarget::Embedded => {
                    self.launch_embedded(&mut st, intent.panel, &intent.file_path, intent.is_relative)
                        .await;
                }
                PreviewTarget::External => {
                    self.launch_external(&mut st, &intent.file_path, intent.is_relative)
                        .await;
                }
            }
        }
    }

    /// The user closed the embedded preview panel. Schedules the debounced
    /// server shutdown instead of stopping immediately, so quickly reopening
    /// the preview never thrashes the server.
    pub async fn handle_panel_disposed(&self) {
        let mut st = self.state.write().await;
        st.session = None;
        let delay = Duration::from_secs(st.settings.keep_alive_minutes * 60);
        self.schedule_shutdown(&mut st, delay);
    }

    /// The task asked for the server.
    pub async fn handle_task_open_request(&self) -> bool {
        self.open_server(true).await
    }

    /// The task asked to close. If an embedded preview is still active the
    /// server must stay up, so only the task's own bookkeeping stops.
    pub async fn handle_task_close_request(&self) {
        let mut st = self.state.write().await;
        if st.session.is_some() {
            self.collab.task_bridge.server_stop(false).await;
        } else if !self.close_server_locked(&mut st).await {
            // Nothing was running; still let the task clear its bookkeeping.
            self.collab.task_bridge.server_stop(false).await;
        }
    }

    /// Re-read configuration. A changed port takes effect on the next server
    /// start, not retroactively.
    pub async fn handle_config_changed(&self) {
        let settings = self.collab.settings_store.load().await;
        let mut st = self.state.write().await;
        st.connection.set_pending_port(settings.port);
        st.settings = settings;
    }

    /// True iff an embedded preview session is currently live.
    pub async fn has_active_preview(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    /// True while a launch is queued waiting for the server to come up.
    pub async fn has_pending_launch(&self) -> bool {
        self.state.read().await.pending_launch.is_some()
    }

    pub async fn encode_endpoint(&self, path: &Path) -> String {
        self.state
            .write()
            .await
            .endpoints
            .encode_loose_file_endpoint(path)
    }

    pub async fn decode_endpoint(&self, endpoint: &str) -> Option<PathBuf> {
        self.state
            .read()
            .await
            .endpoints
            .decode_loose_file_endpoint(endpoint)
    }

    pub fn in_server_workspace(&self, path: &Path) -> bool {
        self.workspace.abs_path_in_default_workspace(path)
    }

    pub fn path_exists_relative_to_workspace(&self, relative: &str) -> bool {
        self.workspace.path_exists_relative_to_default_workspace(relative)
    }

    async fn open_server_locked(&self, st: &mut CoordinatorState, from_task: bool) -> bool {
        if !self.collab.server.is_running().await {
            let port = st.connection.promote_pending_port();
            info!("starting preview server on port {}", port);
            return self.collab.server.start(port).await;
        }

        if from_task {
            // The task wants the server, but an embedded preview already
            // brought it up; just announce the URI.
            match st.connection.resolve_external_uri() {
                Ok(uri) => {
                    self.collab
                        .task_bridge
                        .server_started(&uri, ServerStartedStatus::StartedByEmbeddedPreview)
                        .await;
                }
                Err(e) => warn!("server running but no external URI resolved: {}", e),
            }
        }
        true
    }

    async fn close_server_locked(&self, st: &mut CoordinatorState) -> bool {
        if !self.collab.server.is_running().await {
            return false;
        }

        info!("closing preview server");
        self.collab.server.stop().await;
        if let Some(mut session) = st.session.take() {
            session.close().await;
        }
        if self.collab.task_bridge.is_running().await {
            self.collab.task_bridge.server_stop(true).await;
        }
        st.connection.disconnected();
        true
    }

    async fn launch_embedded(
        &self,
        st: &mut CoordinatorState,
        panel: Option<Box<dyn PreviewPanel>>,
        path: &str,
        is_relative: bool,
    ) {
        let resolved = self.transform_non_relative_file(st, path, is_relative).await;
        let uri = st.connection.uri_for_path(&resolved);

        if let Some(session) = st.session.as_mut() {
            let column = session.column();
            session.reveal(column, &resolved, &uri).await;
            return;
        }

        let (panel, column) = match panel {
            Some(panel) => {
                let column = panel.column();
                (panel, column)
            }
            None => {
                let column = ViewColumn::Two;
                (self.collab.panels.create_panel(column), column)
            }
        };
        st.session = Some(PreviewSession::open(panel, resolved, &uri, column).await);
    }

    async fn launch_external(&self, st: &mut CoordinatorState, path: &str, is_relative: bool) {
        let resolved = self.transform_non_relative_file(st, path, is_relative).await;
        let uri = match st.connection.resolve_external_uri() {
            Ok(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                resolved.replace('\\', "/").trim_start_matches('/')
            ),
            Err(_) => st.connection.uri_for_path(&resolved),
        };
        info!("opening external browser at {}", uri);
        self.collab.browser.open(&uri).await;
    }

    /// Resolve a launch path into the server-relative form.
    ///
    /// Relative paths pass through untouched. Absolute paths inside the
    /// default workspace are rewritten workspace-relative; everything else is
    /// a loose file and gets an opaque endpoint plus the one-shot advisory.
    async fn transform_non_relative_file(
        &self,
        st: &mut CoordinatorState,
        path: &str,
        is_relative: bool,
    ) -> String {
        if is_relative {
            return path.to_string();
        }

        let absolute = Path::new(path);
        if self.workspace.abs_path_in_default_workspace(absolute) {
            return self
                .workspace
                .get_file_relative_to_default_workspace(absolute)
                .unwrap_or_else(|| path.to_string());
        }

        if self.workspace.abs_path_in_any_workspace(absolute) {
            debug!(
                "{} belongs to a non-default workspace; serving as loose file",
                path
            );
        }

        // Idempotent per path, so re-previewing a known loose file never
        // mints a second endpoint.
        let endpoint = st.endpoints.encode_loose_file_endpoint(absolute);
        self.notify_loose_file(st, path).await;
        endpoint
    }

    async fn notify_loose_file(&self, st: &mut CoordinatorState, path: &str) {
        // The log event fires every time; the user-visible prompt at most
        // once per coordinator lifetime.
        warn!("previewing loose file outside the workspace: {}", path);

        if !st.settings.notify_on_loose_files || st.notified_loose_file {
            return;
        }
        st.notified_loose_file = true;

        if self.collab.notifier.notify(path).await == LooseFileChoice::DontShowAgain {
            st.settings.notify_on_loose_files = false;
            if let Err(e) = self
                .collab
                .settings_store
                .set_notify_on_loose_files(false)
                .await
            {
                warn!("failed to persist loose-file notification preference: {}", e);
            }
        }
    }

    fn schedule_shutdown(&self, st: &mut CoordinatorState, delay: Duration) {
        self.cancel_shutdown(st);
        let epoch = st.shutdown_epoch;
        let coordinator = self.clone();
        debug!("scheduling preview server shutdown in {:?}", delay);
        st.shutdown_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            coordinator.fire_shutdown(epoch).await;
        }));
    }

    /// Invalidate any pending shutdown. Bumping the epoch also defuses a
    /// timer whose sleep already elapsed but which has not taken the lock yet.
    fn cancel_shutdown(&self, st: &mut CoordinatorState) {
        st.shutdown_epoch = st.shutdown_epoch.wrapping_add(1);
        if let Some(handle) = st.shutdown_timer.take() {
            handle.abort();
        }
    }

    async fn fire_shutdown(&self, epoch: u64) {
        let mut st = self.state.write().await;
        if st.shutdown_epoch != epoch {
            // Canceled or replaced after this timer was scheduled.
            return;
        }
        st.shutdown_timer = None;

        if self.collab.server.is_running().await
            && !self.collab.task_bridge.is_running().await
            && self.workspace.workspace().is_some()
            && st.settings.run_as_task
        {
            info!("keep-alive window elapsed with no preview consumers; closing server");
            self.close_server_locked(&mut st).await;
        }
        st.session = None;
    }
}
