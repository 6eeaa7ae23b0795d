// ABOUTME: Stable server-relative endpoints for files outside the workspace
// ABOUTME: Maps absolute paths to opaque endpoints and back

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const LOOSE_FILE_PREFIX: &str = "/endpoint_unsaved";

/// Bidirectional map between absolute file paths and the opaque endpoints
/// the server exposes them under. Encoding the same path twice yields the
/// same endpoint.
#[derive(Debug, Default)]
pub struct EndpointManager {
    by_path: HashMap<PathBuf, String>,
    by_endpoint: HashMap<String, PathBuf>,
}

impl EndpointManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a loose file into a server endpoint. The parent directory is
    /// hashed so files with the same name in different directories stay
    /// distinct while the file name itself remains readable in the URI.
    pub fn encode_loose_file_endpoint(&mut self, path: &Path) -> String {
        if let Some(existing) = self.by_path.get(path) {
            return existing.clone();
        }

        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        let mut hasher = DefaultHasher::new();
        parent.to_string_lossy().replace('\\', "/").hash(&mut hasher);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index.html".to_string());

        let endpoint = format!("{}/{:016x}/{}", LOOSE_FILE_PREFIX, hasher.finish(), file_name);
        self.by_path.insert(path.to_path_buf(), endpoint.clone());
        self.by_endpoint.insert(endpoint.clone(), path.to_path_buf());
        endpoint
    }

    /// Resolve an endpoint back to the absolute path it was encoded from.
    pub fn decode_loose_file_endpoint(&self, endpoint: &str) -> Option<PathBuf> {
        self.by_endpoint.get(endpoint).cloned()
    }
}
