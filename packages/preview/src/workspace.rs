// ABOUTME: Workspace root bookkeeping and path relativization
// ABOUTME: Decides whether an absolute path can be served workspace-relative

use std::path::{Path, PathBuf};

/// Knows the default workspace root (the one the server serves from) plus any
/// additional workspace roots the host has open. `None` default root means no
/// workspace is open at all.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceManager {
    default_root: Option<PathBuf>,
    other_roots: Vec<PathBuf>,
}

impl WorkspaceManager {
    pub fn new(default_root: Option<PathBuf>, other_roots: Vec<PathBuf>) -> Self {
        Self {
            default_root,
            other_roots,
        }
    }

    /// The default workspace root, or `None` when no workspace is open.
    pub fn workspace(&self) -> Option<&Path> {
        self.default_root.as_deref()
    }

    pub fn abs_path_in_default_workspace(&self, path: &Path) -> bool {
        self.default_root
            .as_deref()
            .is_some_and(|root| path.starts_with(root))
    }

    pub fn abs_path_in_any_workspace(&self, path: &Path) -> bool {
        self.abs_path_in_default_workspace(path)
            || self.other_roots.iter().any(|root| path.starts_with(root))
    }

    /// Rewrite an absolute path inside the default workspace to its
    /// workspace-relative form with forward slashes.
    pub fn get_file_relative_to_default_workspace(&self, path: &Path) -> Option<String> {
        let root = self.default_root.as_deref()?;
        let relative = path.strip_prefix(root).ok()?;
        Some(relative.to_string_lossy().replace('\\', "/"))
    }

    pub fn path_exists_relative_to_default_workspace(&self, relative: &str) -> bool {
        self.default_root
            .as_deref()
            .is_some_and(|root| root.join(relative).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> WorkspaceManager {
        WorkspaceManager::new(
            Some(PathBuf::from("/home/user/site")),
            vec![PathBuf::from("/home/user/docs")],
        )
    }

    #[test]
    fn test_default_workspace_containment() {
        let ws = manager();
        assert!(ws.abs_path_in_default_workspace(Path::new("/home/user/site/sub/page.html")));
        assert!(!ws.abs_path_in_default_workspace(Path::new("/home/user/docs/page.html")));
        assert!(!ws.abs_path_in_default_workspace(Path::new("/tmp/loose.html")));
    }

    #[test]
    fn test_any_workspace_covers_other_roots() {
        let ws = manager();
        assert!(ws.abs_path_in_any_workspace(Path::new("/home/user/docs/page.html")));
        assert!(!ws.abs_path_in_any_workspace(Path::new("/tmp/loose.html")));
    }

    #[test]
    fn test_relativize_normalizes_separators() {
        let ws = manager();
        let relative = ws
            .get_file_relative_to_default_workspace(Path::new("/home/user/site/sub/page.html"))
            .unwrap();
        assert_eq!(relative, "sub/page.html");
        assert!(ws
            .get_file_relative_to_default_workspace(Path::new("/tmp/loose.html"))
            .is_none());
    }

    #[test]
    fn test_no_workspace_open() {
        let ws = WorkspaceManager::new(None, Vec::new());
        assert!(ws.workspace().is_none());
        assert!(!ws.abs_path_in_default_workspace(Path::new("/anything")));
        assert!(!ws.path_exists_relative_to_default_workspace("index.html"));
    }
}
