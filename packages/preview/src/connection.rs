// ABOUTME: Connection state for the embedded preview server
// ABOUTME: Owns the active and pending ports and the externally reachable URI

use tracing::debug;

use crate::types::{PreviewError, PreviewResult};

/// Tracks which port the server is (or will be) on and whether a connection
/// has been established. Port changes land in `pending_port` and take effect
/// on the next server start, not retroactively.
#[derive(Debug)]
pub struct ConnectionManager {
    host: String,
    http_port: u16,
    pending_port: u16,
    connected_uri: Option<String>,
}

impl ConnectionManager {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            http_port: port,
            pending_port: port,
            connected_uri: None,
        }
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn pending_port(&self) -> u16 {
        self.pending_port
    }

    pub fn set_pending_port(&mut self, port: u16) {
        if port != self.pending_port {
            debug!("preview port will change to {} on next server start", port);
        }
        self.pending_port = port;
    }

    /// Make the pending port current. Called right before a server start.
    pub fn promote_pending_port(&mut self) -> u16 {
        self.http_port = self.pending_port;
        self.http_port
    }

    pub fn connected(&mut self, uri: String) {
        self.connected_uri = Some(uri);
    }

    pub fn disconnected(&mut self) {
        self.connected_uri = None;
    }

    pub fn is_connected(&self) -> bool {
        self.connected_uri.is_some()
    }

    /// The externally reachable base URI reported by the connected event.
    pub fn resolve_external_uri(&self) -> PreviewResult<String> {
        self.connected_uri
            .clone()
            .ok_or(PreviewError::NotConnected)
    }

    /// Build a server URI for a server-relative path, normalizing Windows
    /// path separators to forward slashes.
    pub fn uri_for_path(&self, path: &str) -> String {
        let normalized = path.replace('\\', "/");
        let relative = normalized.trim_start_matches('/');
        format!("http://{}:{}/{}", self.host, self.http_port, relative)
    }
}
