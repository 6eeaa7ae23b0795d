// ABOUTME: One live embedded-preview panel bound to a file path
// ABOUTME: Owns reveal/navigate and idempotent disposal

use tracing::debug;
use uuid::Uuid;

use crate::host::PreviewPanel;
use crate::types::ViewColumn;

/// The single active embedded preview. The coordinator reuses and reveals
/// this instead of creating a second panel.
pub struct PreviewSession {
    id: Uuid,
    file_path: String,
    panel: Box<dyn PreviewPanel>,
    disposed: bool,
}

impl PreviewSession {
    /// Create the session and bring its panel up showing `uri`.
    pub async fn open(
        panel: Box<dyn PreviewPanel>,
        file_path: String,
        uri: &str,
        column: ViewColumn,
    ) -> Self {
        panel.reveal(column).await;
        panel.navigate(uri).await;
        debug!("opened preview session for {}", file_path);
        Self {
            id: Uuid::new_v4(),
            file_path,
            panel,
            disposed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn column(&self) -> ViewColumn {
        self.panel.column()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Bring the panel to front, navigating only when the shown path changes.
    pub async fn reveal(&mut self, column: ViewColumn, file_path: &str, uri: &str) {
        if self.disposed {
            return;
        }
        self.panel.reveal(column).await;
        if self.file_path != file_path {
            self.file_path = file_path.to_string();
            self.panel.navigate(uri).await;
        }
    }

    /// Dispose the panel. Safe to call more than once.
    pub async fn close(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.panel.dispose().await;
    }
}
