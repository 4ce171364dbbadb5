//! Filesystem abstractions used for loading inputs.

use std::path::Path;

use crate::error::Result;

/// Abstraction over filesystem access for testability.
#[cfg_attr(test, mockall::automock)]
pub trait FileSystem {
    /// Read a file into a string.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Create a new standard filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::StdFileSystem;
    use crate::error::MetricScopeError;
    use crate::fs::FileSystem;
    use std::path::PathBuf;

    #[test]
    fn std_filesystem_reads_files() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create temp dir");
        let file_path = root.join("metrics.json");
        std::fs::write(&file_path, "{}").expect("write test file");

        let fs = StdFileSystem::new();
        let contents = fs.read_to_string(&file_path).expect("read file");
        assert_eq!(contents, "{}");

        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    #[test]
    fn std_filesystem_maps_missing_file_to_io_error() {
        let missing = std::env::temp_dir()
            .join(unique_dir_name())
            .join("absent.json");
        let error = StdFileSystem::new()
            .read_to_string(&missing)
            .expect_err("missing file");
        assert!(matches!(error, MetricScopeError::Io(_)));
    }

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        PathBuf::from(format!("metricscope_core_test_{nanos}"))
    }
}
