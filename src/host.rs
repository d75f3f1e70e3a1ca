//! Access to the resources referenced by annotations

use crate::error::{InlineError, Result};
use std::future::Future;
use std::path::Path;

/// Supplies file contents to the resolvers.
///
/// Reads may suspend; the style resolver drives all reads of one annotation together.
pub trait ResourceHost {
    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String>>;
}

/// Reads resources from the local file system with blocking calls
#[derive(Debug, Clone, Copy, Default)]
pub struct FsHost;

impl ResourceHost for FsHost {
    async fn read_file(&self, path: &Path) -> Result<String> {
        log::trace!("Reading resource {}", path.display());
        std::fs::read_to_string(path).map_err(|e| InlineError::file_not_found(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use tempfile::TempDir;

    #[test]
    fn test_fs_host_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.css");
        std::fs::write(&path, "a { color: red; }").unwrap();

        let content = block_on(FsHost.read_file(&path)).unwrap();
        assert_eq!(content, "a { color: red; }");
    }

    #[test]
    fn test_fs_host_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = block_on(FsHost.read_file(&temp_dir.path().join("missing.css")));

        match result {
            Err(InlineError::FileNotFound { path }) => assert!(path.contains("missing.css")),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }
}
