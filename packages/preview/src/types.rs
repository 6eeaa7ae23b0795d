use serde::{Deserialize, Serialize};

use crate::host::PreviewPanel;

/// Which surface a preview launch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewTarget {
    Embedded,
    External,
}

impl PreviewTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewTarget::Embedded => "embedded",
            PreviewTarget::External => "external",
        }
    }
}

/// Status reported to the task bridge when the server comes up.
///
/// `JustStarted` is reserved for the connection-established callback after a
/// fresh start; `StartedByEmbeddedPreview` is used when a task asks for the
/// server but it was already running on behalf of a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStartedStatus {
    JustStarted,
    StartedByEmbeddedPreview,
}

impl ServerStartedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStartedStatus::JustStarted => "just_started",
            ServerStartedStatus::StartedByEmbeddedPreview => "started_by_embedded_preview",
        }
    }
}

/// The two primary editor columns a preview panel can occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewColumn {
    One,
    Two,
}

impl ViewColumn {
    /// The side-by-side placement rule: alternate between the two primary
    /// columns, never stack a second panel on top of an occupied one.
    pub fn other(&self) -> ViewColumn {
        match self {
            ViewColumn::One => ViewColumn::Two,
            ViewColumn::Two => ViewColumn::One,
        }
    }
}

/// User response to the loose-file notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LooseFileChoice {
    Dismissed,
    DontShowAgain,
}

/// A launch request stored while the server is still coming up.
///
/// At most one of these exists at a time; a second request issued before the
/// server connects replaces the first (last-request-wins). The slot is
/// consumed exactly once, by the connected handler.
pub struct PendingLaunch {
    pub target: PreviewTarget,
    pub file_path: String,
    pub is_relative: bool,
    /// Panel to adopt for an embedded launch (e.g. a restored panel).
    pub panel: Option<Box<dyn PreviewPanel>>,
}

impl std::fmt::Debug for PendingLaunch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLaunch")
            .field("target", &self.target)
            .field("file_path", &self.file_path)
            .field("is_relative", &self.is_relative)
            .field("panel", &self.panel.is_some())
            .finish()
    }
}

/// Events emitted by a concrete server process implementation.
///
/// The host wires these to the coordinator's inbound handlers; the
/// coordinator itself never subscribes to anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The server finished starting and is reachable at the given URI.
    Connected(String),
}

/// Error types for preview operations
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("preview server is not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type for preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_column_alternates() {
        assert_eq!(ViewColumn::One.other(), ViewColumn::Two);
        assert_eq!(ViewColumn::Two.other(), ViewColumn::One);
        assert_eq!(ViewColumn::One.other().other(), ViewColumn::One);
    }

    #[test]
    fn test_started_status_strings() {
        assert_eq!(ServerStartedStatus::JustStarted.as_str(), "just_started");
        assert_eq!(
            ServerStartedStatus::StartedByEmbeddedPreview.as_str(),
            "started_by_embedded_preview"
        );
    }
}
