//! File probe: a single stat
//!
//! Returns the file's byte size so the poller can run the stability
//! window over successive observations. A failed stat (missing file,
//! permission error, dangling symlink) is "absent".

use std::path::Path;

use tracing::trace;

/// Stat the path and report its size, `None` when the stat fails
pub async fn stat_size(path: &Path) -> Option<u64> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Some(meta.len()),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "file probe: stat failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Test that an existing file reports its exact size
    #[tokio::test]
    async fn test_existing_file_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"data1")
            .unwrap();

        assert_eq!(stat_size(&path).await, Some(5));
    }

    /// Test that a missing file reports absence
    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never-created");
        assert_eq!(stat_size(&path).await, None);
    }

    /// Test that an empty file is present with size zero, distinct from
    /// absent
    #[tokio::test]
    async fn test_empty_file_is_present() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        std::fs::File::create(&path).unwrap();

        assert_eq!(stat_size(&path).await, Some(0));
    }
}
